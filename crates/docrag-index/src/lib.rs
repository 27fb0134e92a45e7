//! docrag-index
//!
//! Exact L2 nearest-neighbor index over chunk embeddings plus the persistence
//! of the index and its parallel id/text arrays. See `flat` and `store`.

pub mod flat;
pub mod store;

pub use flat::FlatIndex;
pub use store::{load_all, save_all, IndexArtifacts};
