//! docrag-segment
//!
//! Document loading and text segmentation: interchangeable strategies behind
//! `SegmentationStrategy`, plus a directory loader with per-document
//! partial-failure semantics.

pub mod loader;
pub mod strategy;

pub use loader::{DocumentLoader, IngestSummary, PlainTextExtractor};
pub use strategy::{is_section_header, FixedWindowSegmenter, StructuralSegmenter};
