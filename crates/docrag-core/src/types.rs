//! Domain types shared by the segmentation, indexing and retrieval crates.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub type ChunkId = String;

/// Separator between the source document name and the section ordinal in a
/// chunk id. The id is the sole join key used for provenance display.
pub const CHUNK_ID_SEPARATOR: &str = " | section ";

/// A bounded fragment of a source document, the unit of indexing and retrieval.
///
/// - `id`: `"{source_doc} | section {ordinal}"`, unique within a document
/// - `source_doc`: document filename the fragment came from
/// - `ordinal`: 1-based position of the fragment within its document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    pub id: ChunkId,
    pub text: String,
    pub source_doc: String,
    pub ordinal: usize,
}

impl Chunk {
    pub fn new(source_doc: &str, ordinal: usize, text: String) -> Self {
        Self {
            id: format!("{}{}{}", source_doc, CHUNK_ID_SEPARATOR, ordinal),
            text,
            source_doc: source_doc.to_string(),
            ordinal,
        }
    }

    /// Valid chunks are non-blank and contain at least one alphabetic
    /// character. Anything else is index noise and is dropped before embedding.
    pub fn is_valid(&self) -> bool {
        !self.text.trim().is_empty() && self.text.chars().any(char::is_alphabetic)
    }

    /// Recovers the source document name from a chunk id.
    pub fn source_from_id(id: &str) -> &str {
        id.split(CHUNK_ID_SEPARATOR).next().unwrap_or(id)
    }
}

/// Per-document attributes produced by the offline metadata generator and
/// consumed read-only at query time. Every field defaults so partial catalogs
/// still load; a document absent from the catalog degrades to unweighted
/// retrieval.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DocumentMetadata {
    pub title: String,
    pub keywords: Vec<String>,
    pub domain_terms_present: Vec<String>,
    pub domain_term_frequencies: HashMap<String, usize>,
    pub main_sections: Vec<String>,
    pub word_count: usize,
    pub paragraph_count: usize,
    pub generated_at: String,
}

/// A chunk joined against its document's metadata record.
///
/// `relevance_score` is always >= 1.0 and multiplies into the similarity
/// score at query time.
#[derive(Debug, Clone)]
pub struct EnrichedChunk {
    pub chunk: Chunk,
    pub contains_domain_term: bool,
    pub in_important_section: bool,
    pub relevance_score: f32,
}

/// One ranked answer fragment. Produced fresh per query, never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalResult {
    pub chunk_id: ChunkId,
    pub text: String,
    pub distance: f32,
    pub final_score: f32,
}
