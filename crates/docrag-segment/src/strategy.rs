use docrag_core::error::{Error, Result};
use docrag_core::traits::SegmentationStrategy;
use docrag_core::types::Chunk;

/// Minimum length of a whitespace-normalized section chunk. Anything at or
/// below this adds index noise without retrieval value.
const MIN_SECTION_CHARS: usize = 50;

/// Minimum length for a line to qualify as an uppercase section header.
const MIN_HEADER_CHARS: usize = 10;

/// Slides a window of `chunk_size` words across the document with a stride of
/// `chunk_size * (1 - overlap_fraction)` words. Guarantees full coverage and
/// bounded chunk sizes; sentences may be cut at window edges, which the
/// downstream embedding step tolerates.
#[derive(Debug, Clone)]
pub struct FixedWindowSegmenter {
    chunk_size: usize,
    stride: usize,
}

impl FixedWindowSegmenter {
    pub fn new(chunk_size: usize, overlap_fraction: f32) -> Result<Self> {
        if chunk_size == 0 {
            return Err(Error::InvalidConfig("chunk_size must be positive".to_string()));
        }
        if !(0.0..1.0).contains(&overlap_fraction) {
            return Err(Error::InvalidConfig(format!(
                "overlap_fraction {} outside [0, 1)",
                overlap_fraction
            )));
        }
        let stride = (chunk_size as f32 * (1.0 - overlap_fraction)).round() as usize;
        if stride < 1 {
            return Err(Error::InvalidConfig(format!(
                "chunk_size {} with overlap_fraction {} gives a non-advancing window",
                chunk_size, overlap_fraction
            )));
        }
        Ok(Self { chunk_size, stride })
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    pub fn stride(&self) -> usize {
        self.stride
    }
}

impl SegmentationStrategy for FixedWindowSegmenter {
    fn segment(&self, text: &str, doc_id: &str) -> Result<Vec<Chunk>> {
        let words: Vec<&str> = text.split_whitespace().collect();
        let mut chunks = Vec::new();
        let mut ordinal = 1;
        let mut start = 0;
        while start < words.len() {
            let end = (start + self.chunk_size).min(words.len());
            let chunk = Chunk::new(doc_id, ordinal, words[start..end].join(" "));
            if chunk.is_valid() {
                chunks.push(chunk);
                ordinal += 1;
            }
            if end >= words.len() {
                break;
            }
            start += self.stride;
        }
        Ok(chunks)
    }
}

/// Heuristic section-based segmentation: an uppercase line longer than ten
/// characters starts a new section; text between headers forms one chunk.
/// Documents without any detected header fall back to blank-line paragraph
/// splitting. Short or non-alphabetic fragments are filtered out.
#[derive(Debug, Clone, Default)]
pub struct StructuralSegmenter;

impl StructuralSegmenter {
    pub fn new() -> Self {
        Self
    }
}

impl SegmentationStrategy for StructuralSegmenter {
    fn segment(&self, text: &str, doc_id: &str) -> Result<Vec<Chunk>> {
        let text = text.replace('\r', "\n");

        let mut sections: Vec<String> = Vec::new();
        let mut current: Vec<&str> = Vec::new();
        let mut saw_header = false;
        for line in text.lines() {
            if is_section_header(line) {
                saw_header = true;
                if !current.is_empty() {
                    sections.push(current.join("\n"));
                }
                current = vec![line];
            } else {
                current.push(line);
            }
        }
        if !current.is_empty() {
            sections.push(current.join("\n"));
        }
        if !saw_header {
            sections = text.split("\n\n").map(str::to_string).collect();
        }

        // Ordinals number every detected section, filtered ones included, so
        // the id points at the real position of the section in the document.
        let mut chunks = Vec::new();
        for (i, section) in sections.iter().enumerate() {
            let normalized = section.split_whitespace().collect::<Vec<_>>().join(" ");
            if normalized.chars().count() > MIN_SECTION_CHARS
                && normalized.chars().any(char::is_alphabetic)
            {
                chunks.push(Chunk::new(doc_id, i + 1, normalized));
            }
        }
        Ok(chunks)
    }
}

/// A probable section title: longer than ten characters, has letters, and
/// none of them lowercase.
pub fn is_section_header(line: &str) -> bool {
    let line = line.trim_end();
    line.chars().count() > MIN_HEADER_CHARS
        && line.chars().any(char::is_alphabetic)
        && !line.chars().any(char::is_lowercase)
}
