use serde::{Deserialize, Serialize};

use docrag_core::error::{Error, Result};

/// Exact nearest-neighbor index over fixed-dimension vectors, Euclidean (L2)
/// distance, brute force. Corpora here are small enough that exactness beats
/// any approximate-search recall tradeoff.
///
/// Treated as immutable once built: a rebuild produces a new instance that
/// replaces the old one rather than mutating an index in-flight queries may
/// still hold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlatIndex {
    dim: usize,
    /// Row-major storage, `len == dim * rows`.
    data: Vec<f32>,
}

impl FlatIndex {
    pub fn new(dim: usize) -> Result<Self> {
        if dim == 0 {
            return Err(Error::InvalidArgument("index dimension must be positive".to_string()));
        }
        Ok(Self { dim, data: Vec::new() })
    }

    /// One-shot construction from a complete vector set.
    pub fn build(dim: usize, vectors: &[Vec<f32>]) -> Result<Self> {
        let mut index = Self::new(dim)?;
        index.add(vectors)?;
        Ok(index)
    }

    pub fn add(&mut self, vectors: &[Vec<f32>]) -> Result<()> {
        for v in vectors {
            if v.len() != self.dim {
                return Err(Error::InvalidArgument(format!(
                    "vector dimension {} does not match index dimension {}",
                    v.len(),
                    self.dim
                )));
            }
            self.data.extend_from_slice(v);
        }
        Ok(())
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    pub fn len(&self) -> usize {
        self.data.len() / self.dim
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Up to `k` nearest rows, ascending by distance; `k` beyond the index
    /// size is clamped. Equal distances resolve to the lower row so results
    /// are fully deterministic.
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<(usize, f32)>> {
        if query.len() != self.dim {
            return Err(Error::InvalidArgument(format!(
                "query dimension {} does not match index dimension {}",
                query.len(),
                self.dim
            )));
        }
        let mut hits: Vec<(usize, f32)> = self
            .data
            .chunks_exact(self.dim)
            .enumerate()
            .map(|(row, v)| (row, l2_distance(query, v)))
            .collect();
        hits.sort_by(|a, b| a.1.total_cmp(&b.1).then(a.0.cmp(&b.0)));
        hits.truncate(k.min(self.len()));
        Ok(hits)
    }
}

fn l2_distance(a: &[f32], b: &[f32]) -> f32 {
    a.iter()
        .zip(b)
        .map(|(x, y)| (x - y) * (x - y))
        .sum::<f32>()
        .sqrt()
}
