use std::path::Path;

use docrag_core::error::{Error, Result};
use docrag_core::traits::Embedder;
use docrag_core::types::{Chunk, RetrievalResult};
use docrag_index::store::{load_all, IndexArtifacts};

use crate::enrich::MetadataCatalog;

/// How many candidates are pulled from the vector index per requested result
/// before re-ranking. Raw distance alone does not account for metadata
/// relevance, so the re-rank needs a wider pool than `k` to choose from.
/// Constant by design; it does not scale with `k` or corpus size.
pub const OVERSAMPLE: usize = 2;

/// Two-stage retrieval: the flat index does coarse geometric recall, then a
/// cheap, explainable linear re-rank injects document metadata.
///
/// Owns the embedder so the query path is guaranteed to embed with the same
/// model that produced the indexed vectors.
pub struct Retriever {
    embedder: Box<dyn Embedder>,
    artifacts: IndexArtifacts,
    catalog: MetadataCatalog,
}

impl std::fmt::Debug for Retriever {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Retriever").finish_non_exhaustive()
    }
}

impl Retriever {
    pub fn new(
        embedder: Box<dyn Embedder>,
        artifacts: IndexArtifacts,
        catalog: MetadataCatalog,
    ) -> Result<Self> {
        if embedder.dim() != artifacts.index.dim() {
            return Err(Error::InvalidConfig(format!(
                "embedder dimension {} does not match index dimension {}; \
                 the index was built with a different model",
                embedder.dim(),
                artifacts.index.dim()
            )));
        }
        Ok(Self { embedder, artifacts, catalog })
    }

    /// Loads persisted artifacts from `index_dir` and wires them to the given
    /// embedder and catalog.
    pub fn open(
        embedder: Box<dyn Embedder>,
        index_dir: &Path,
        catalog: MetadataCatalog,
    ) -> Result<Self> {
        let artifacts = load_all(index_dir)?;
        Self::new(embedder, artifacts, catalog)
    }

    pub fn indexed_fragments(&self) -> usize {
        self.artifacts.ids.len()
    }

    /// The `k` fragments best matching `query`, ranked by
    /// `final_score = 1/(1 + distance) * relevance_score`, ties broken by
    /// ascending distance then chunk id so repeated calls return identical
    /// results.
    pub fn retrieve(&self, query: &str, k: usize) -> Result<Vec<RetrievalResult>> {
        if k == 0 {
            return Err(Error::InvalidArgument("k must be positive".to_string()));
        }
        if self.artifacts.index.is_empty() {
            return Err(Error::IndexNotReady("no fragments have been indexed".to_string()));
        }

        let mut rows = self.embedder.embed_batch(&[query.to_string()])?;
        let query_vector = rows
            .pop()
            .ok_or_else(|| Error::Embedding("embedder returned no vector for the query".to_string()))?;

        let candidates = self
            .artifacts
            .index
            .search(&query_vector, k.saturating_mul(OVERSAMPLE))?;

        let mut ranked: Vec<RetrievalResult> = candidates
            .into_iter()
            .map(|(row, distance)| {
                let chunk_id = self.artifacts.ids[row].clone();
                let text = self.artifacts.texts[row].clone();
                let weight = self
                    .catalog
                    .weight_for(Chunk::source_from_id(&chunk_id), &text);
                let base_score = 1.0 / (1.0 + distance);
                RetrievalResult {
                    chunk_id,
                    text,
                    distance,
                    final_score: base_score * weight.relevance_score,
                }
            })
            .collect();

        ranked.sort_by(|a, b| {
            b.final_score
                .total_cmp(&a.final_score)
                .then(a.distance.total_cmp(&b.distance))
                .then_with(|| a.chunk_id.cmp(&b.chunk_id))
        });
        ranked.truncate(k);
        Ok(ranked)
    }

    /// Newline-joined top-`k` texts: the context string handed to the
    /// external answer-generation service.
    pub fn context_for(&self, query: &str, k: usize) -> Result<String> {
        let results = self.retrieve(query, k)?;
        Ok(results
            .iter()
            .map(|r| r.text.as_str())
            .collect::<Vec<_>>()
            .join("\n"))
    }
}
