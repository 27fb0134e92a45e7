use std::path::Path;

use crate::error::Result;
use crate::types::Chunk;

/// Maps text to fixed-length dense vectors.
///
/// The same instance must serve both ingestion and query embedding; a
/// model mismatch between the two silently degrades retrieval quality.
pub trait Embedder: Send + Sync {
    fn dim(&self) -> usize;
    fn max_len(&self) -> usize;
    /// Batch order is preserved: `out[i]` embeds `texts[i]`.
    /// Fails with `Error::EmptyInput` when `texts` is empty.
    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;
}

/// Splits raw document text into chunks. Implementations are interchangeable
/// so alternate segmenters can be swapped in without touching the retriever.
pub trait SegmentationStrategy: Send + Sync {
    fn segment(&self, text: &str, doc_id: &str) -> Result<Vec<Chunk>>;
}

/// Seam for the external text-extraction service. Its only contract with the
/// pipeline is "give me raw text for this path".
pub trait TextExtractor: Send + Sync {
    fn extract(&self, path: &Path) -> Result<String>;
}

impl<T: SegmentationStrategy + ?Sized> SegmentationStrategy for Box<T> {
    fn segment(&self, text: &str, doc_id: &str) -> Result<Vec<Chunk>> {
        (**self).segment(text, doc_id)
    }
}

impl<T: TextExtractor + ?Sized> TextExtractor for Box<T> {
    fn extract(&self, path: &Path) -> Result<String> {
        (**self).extract(path)
    }
}
