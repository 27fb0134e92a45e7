use std::fs;
use std::path::{Path, PathBuf};

use tracing::warn;

use docrag_core::error::{Error, Result};
use docrag_core::traits::{SegmentationStrategy, TextExtractor};
use docrag_core::types::Chunk;

/// Reads `.txt` sources directly. This is the stand-in for the external
/// text-extraction service; PDF extraction plugs in through the same trait.
#[derive(Debug, Default)]
pub struct PlainTextExtractor;

impl TextExtractor for PlainTextExtractor {
    fn extract(&self, path: &Path) -> Result<String> {
        let bytes = fs::read(path).map_err(|e| Error::Extraction {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        let text = match String::from_utf8(bytes) {
            Ok(text) => text,
            Err(e) => String::from_utf8_lossy(e.as_bytes()).into_owned(),
        };
        Ok(text.replace('\r', "\n"))
    }
}

/// Outcome of a batch ingestion pass. One broken document never aborts the
/// batch; it is counted and named here instead.
#[derive(Debug, Default)]
pub struct IngestSummary {
    pub processed: usize,
    pub skipped: usize,
    pub skipped_docs: Vec<String>,
}

/// Walks a corpus directory and turns every document into chunks via the
/// configured extractor and segmentation strategy.
pub struct DocumentLoader {
    extractor: Box<dyn TextExtractor>,
    strategy: Box<dyn SegmentationStrategy>,
}

impl DocumentLoader {
    pub fn new(extractor: Box<dyn TextExtractor>, strategy: Box<dyn SegmentationStrategy>) -> Self {
        Self { extractor, strategy }
    }

    /// Loads and segments every `.txt` file under `data_dir` (sorted, so
    /// chunk ordinals are stable across runs). Extraction or segmentation
    /// failures skip that document and the batch continues.
    ///
    /// Fails with `Error::EmptyInput` when the directory has no documents or
    /// no document yields a single valid chunk.
    pub fn load_directory(&self, data_dir: &Path) -> Result<(Vec<Chunk>, IngestSummary)> {
        let files = list_text_files(data_dir);
        if files.is_empty() {
            return Err(Error::EmptyInput(format!(
                "no .txt files under {}",
                data_dir.display()
            )));
        }

        let mut all_chunks = Vec::new();
        let mut summary = IngestSummary::default();
        for path in &files {
            let doc_id = document_id(path);
            match self.load_document(path, &doc_id) {
                Ok(chunks) if chunks.is_empty() => {
                    warn!(doc = %doc_id, "document yielded no valid chunks, skipping");
                    summary.skipped += 1;
                    summary.skipped_docs.push(doc_id);
                }
                Ok(chunks) => {
                    all_chunks.extend(chunks);
                    summary.processed += 1;
                }
                Err(e) => {
                    warn!(doc = %doc_id, error = %e, "failed to process document, skipping");
                    summary.skipped += 1;
                    summary.skipped_docs.push(doc_id);
                }
            }
        }

        if all_chunks.is_empty() {
            return Err(Error::EmptyInput(
                "no document produced a valid chunk".to_string(),
            ));
        }
        Ok((all_chunks, summary))
    }

    fn load_document(&self, path: &Path, doc_id: &str) -> Result<Vec<Chunk>> {
        let text = self.extractor.extract(path)?;
        self.strategy.segment(&text, doc_id)
    }
}

/// The document id is the filename including its extension, matching the keys
/// of the metadata catalog.
fn document_id(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn list_text_files(root: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = walkdir::WalkDir::new(root)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.path().to_path_buf())
        .filter(|p| p.extension().and_then(|s| s.to_str()) == Some("txt"))
        .collect();
    files.sort();
    files
}
