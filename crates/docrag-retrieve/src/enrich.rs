use std::collections::HashMap;
use std::fs;
use std::path::Path;

use tracing::warn;

use docrag_core::error::Result;
use docrag_core::types::{Chunk, DocumentMetadata, EnrichedChunk};

/// Multiplier for fragments mentioning a domain term. Fixed design constant:
/// a prior that domain vocabulary signals topical relevance.
pub const DOMAIN_TERM_BOOST: f32 = 1.5;

/// Multiplier for fragments lying inside a document's flagged key sections.
/// Multiplicative with the term boost so the two priors compound independently.
pub const SECTION_BOOST: f32 = 1.3;

/// Relevance signals derived for one fragment of text.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChunkWeight {
    pub contains_domain_term: bool,
    pub in_important_section: bool,
    pub relevance_score: f32,
}

impl ChunkWeight {
    /// The unweighted fallback when no metadata record exists.
    pub fn neutral() -> Self {
        Self {
            contains_domain_term: false,
            in_important_section: false,
            relevance_score: 1.0,
        }
    }
}

/// Read-only map from document filename to its offline-generated record,
/// loaded once and consulted per candidate at query time.
#[derive(Debug, Default)]
pub struct MetadataCatalog {
    records: HashMap<String, DocumentMetadata>,
}

impl MetadataCatalog {
    pub fn from_records(records: HashMap<String, DocumentMetadata>) -> Self {
        Self { records }
    }

    pub fn load(path: &Path) -> Result<Self> {
        let records: HashMap<String, DocumentMetadata> =
            serde_json::from_str(&fs::read_to_string(path)?)?;
        Ok(Self { records })
    }

    /// An absent or unreadable catalog degrades to unweighted retrieval
    /// instead of failing the query path.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(catalog) => catalog,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "metadata catalog unavailable, retrieval is unweighted");
                Self::default()
            }
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, doc: &str) -> Option<&DocumentMetadata> {
        self.records.get(doc)
    }

    /// Relevance signals for a fragment of `doc`. Documents missing from the
    /// catalog weigh in at a neutral 1.0.
    pub fn weight_for(&self, doc: &str, text: &str) -> ChunkWeight {
        match self.records.get(doc) {
            Some(meta) => weigh(text, meta),
            None => ChunkWeight::neutral(),
        }
    }

    pub fn enrich(&self, chunk: &Chunk) -> EnrichedChunk {
        let weight = self.weight_for(&chunk.source_doc, &chunk.text);
        EnrichedChunk {
            chunk: chunk.clone(),
            contains_domain_term: weight.contains_domain_term,
            in_important_section: weight.in_important_section,
            relevance_score: weight.relevance_score,
        }
    }
}

/// Joins a chunk against its document's metadata record.
pub fn enrich(chunk: &Chunk, meta: &DocumentMetadata) -> EnrichedChunk {
    let weight = weigh(&chunk.text, meta);
    EnrichedChunk {
        chunk: chunk.clone(),
        contains_domain_term: weight.contains_domain_term,
        in_important_section: weight.in_important_section,
        relevance_score: weight.relevance_score,
    }
}

/// Domain terms match case-insensitively against the fragment; section
/// markers match verbatim, since headers are stored as they appear.
fn weigh(text: &str, meta: &DocumentMetadata) -> ChunkWeight {
    let lowered = text.to_lowercase();
    let contains_domain_term = meta
        .domain_terms_present
        .iter()
        .any(|term| !term.is_empty() && lowered.contains(&term.to_lowercase()));
    let in_important_section = meta
        .main_sections
        .iter()
        .any(|section| !section.is_empty() && text.contains(section.as_str()));

    let mut relevance_score = 1.0;
    if contains_domain_term {
        relevance_score *= DOMAIN_TERM_BOOST;
    }
    if in_important_section {
        relevance_score *= SECTION_BOOST;
    }
    ChunkWeight {
        contains_domain_term,
        in_important_section,
        relevance_score,
    }
}
