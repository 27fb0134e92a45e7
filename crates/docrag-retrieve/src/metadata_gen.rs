//! Offline metadata generation: the step that produces the catalog the
//! enricher consumes. Runs over raw document text, never over chunks.

use std::collections::HashMap;
use std::path::Path;

use chrono::Utc;
use tracing::warn;

use docrag_core::error::{Error, Result};
use docrag_core::traits::TextExtractor;
use docrag_core::types::DocumentMetadata;
use docrag_segment::is_section_header;

/// Default domain vocabulary: Spanish insurance terminology.
pub const DEFAULT_DOMAIN_TERMS: &[&str] = &[
    "póliza",
    "prima",
    "deducible",
    "cobertura",
    "exclusiones",
    "beneficiario",
    "asegurado",
    "aseguradora",
    "siniestro",
    "indemnización",
    "reclamación",
    "vigencia",
    "renovación",
    "antigüedad",
    "cargas",
    "franquicia",
    "cláusulas",
];

const MAX_KEYWORDS: usize = 10;
const MAX_SECTIONS: usize = 10;
const MIN_KEYWORD_CHARS: usize = 4;
const MIN_TITLE_CHARS: usize = 10;
const MAX_TITLE_CHARS: usize = 100;

pub struct MetadataGenerator {
    domain_terms: Vec<String>,
}

impl Default for MetadataGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl MetadataGenerator {
    pub fn new() -> Self {
        Self::with_terms(DEFAULT_DOMAIN_TERMS.iter().map(|t| (*t).to_string()).collect())
    }

    pub fn with_terms(domain_terms: Vec<String>) -> Self {
        Self { domain_terms }
    }

    /// Builds the metadata record for one document from its raw text.
    pub fn generate(&self, doc_id: &str, text: &str) -> DocumentMetadata {
        let paragraphs: Vec<&str> = text
            .split("\n\n")
            .map(str::trim)
            .filter(|p| !p.is_empty() && p.split_whitespace().count() > 1)
            .collect();

        let title = paragraphs
            .first()
            .and_then(|p| title_from(p))
            .unwrap_or_else(|| doc_id.to_string());

        let lowered = text.to_lowercase();
        let words: Vec<&str> = lowered
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| w.chars().count() >= MIN_KEYWORD_CHARS && !w.chars().all(|c| c.is_ascii_digit()))
            .collect();
        let mut frequencies: HashMap<&str, usize> = HashMap::new();
        for word in &words {
            *frequencies.entry(word).or_default() += 1;
        }

        // Top keywords by count; alphabetical among equals for determinism
        let mut ranked: Vec<(&str, usize)> = frequencies.iter().map(|(w, c)| (*w, *c)).collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(b.0)));
        let keywords: Vec<String> = ranked
            .iter()
            .take(MAX_KEYWORDS)
            .map(|(w, _)| (*w).to_string())
            .collect();

        let mut domain_term_frequencies: HashMap<String, usize> = HashMap::new();
        for term in &self.domain_terms {
            let count = words.iter().filter(|w| *w == term).count();
            if count > 0 {
                domain_term_frequencies.insert(term.clone(), count);
            }
        }
        let mut domain_terms_present: Vec<String> =
            domain_term_frequencies.keys().cloned().collect();
        domain_terms_present.sort();

        let main_sections: Vec<String> = text
            .lines()
            .filter(|line| is_section_header(line))
            .take(MAX_SECTIONS)
            .map(|line| line.trim().to_string())
            .collect();

        DocumentMetadata {
            title,
            keywords,
            domain_terms_present,
            domain_term_frequencies,
            main_sections,
            word_count: words.len(),
            paragraph_count: paragraphs.len(),
            generated_at: Utc::now().to_rfc3339(),
        }
    }

    /// Generates records for every `.txt` document under `data_dir`,
    /// skipping (with a warning) documents the extractor cannot read.
    pub fn generate_catalog(
        &self,
        data_dir: &Path,
        extractor: &dyn TextExtractor,
    ) -> Result<HashMap<String, DocumentMetadata>> {
        let mut files: Vec<_> = walkdir_txt(data_dir);
        files.sort();
        if files.is_empty() {
            return Err(Error::EmptyInput(format!(
                "no .txt files under {}",
                data_dir.display()
            )));
        }

        let mut catalog = HashMap::new();
        for path in files {
            let doc_id = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string());
            match extractor.extract(&path) {
                Ok(text) => {
                    catalog.insert(doc_id.clone(), self.generate(&doc_id, &text));
                }
                Err(e) => {
                    warn!(doc = %doc_id, error = %e, "metadata generation skipped document");
                }
            }
        }
        Ok(catalog)
    }
}

/// Title guess: the first line of the first real paragraph, when it is long
/// enough to be a title, clipped to a sane length.
fn title_from(paragraph: &str) -> Option<String> {
    let first_line = paragraph.lines().next()?.trim();
    if first_line.chars().count() < MIN_TITLE_CHARS {
        return None;
    }
    Some(first_line.chars().take(MAX_TITLE_CHARS).collect())
}

fn walkdir_txt(root: &Path) -> Vec<std::path::PathBuf> {
    walkdir::WalkDir::new(root)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.path().to_path_buf())
        .filter(|p| p.extension().and_then(|s| s.to_str()) == Some("txt"))
        .collect()
}
