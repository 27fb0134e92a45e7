//! docrag-retrieve
//!
//! Query-time side of the pipeline: the metadata catalog and enricher, the
//! similarity + metadata re-ranking retriever, and the offline metadata
//! generator that produces the catalog.

pub mod enrich;
pub mod metadata_gen;
pub mod retriever;

pub use enrich::{enrich, ChunkWeight, MetadataCatalog, DOMAIN_TERM_BOOST, SECTION_BOOST};
pub use metadata_gen::MetadataGenerator;
pub use retriever::{Retriever, OVERSAMPLE};
