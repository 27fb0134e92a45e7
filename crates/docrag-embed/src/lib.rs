//! docrag-embed
//!
//! Sentence embedding for the ingestion and query paths. The real model is a
//! MiniLM-class BERT loaded through candle from local files; a deterministic
//! hash-based embedder of the same dimensionality stands in for it in tests
//! (`APP_USE_FAKE_EMBEDDINGS=1`). Whichever is chosen, the same instance must
//! embed both the corpus and the queries.

pub mod device;
pub mod pool;
pub mod tokenize;

use std::path::{Path, PathBuf};

use anyhow::{anyhow, Result};
use candle_core::{DType, Device, Tensor};
use candle_nn::VarBuilder;
use candle_transformers::models::bert::{BertModel, Config as BertConfig};
use tokenizers::Tokenizer;
use tracing::info;

use docrag_core::error::Error;
use docrag_core::traits::Embedder;

use crate::device::select_device;
use crate::pool::masked_mean_l2;
use crate::tokenize::tokenize_padded;

/// Output dimensionality of the MiniLM sentence model. The persisted index is
/// only valid for vectors of this width.
pub const EMBEDDING_DIM: usize = 384;

/// Fixed padded sequence length per input.
pub const MAX_SEQ_LEN: usize = 256;

/// Texts embedded per forward pass. Purely a throughput knob; output order
/// always matches input order.
const FORWARD_BATCH: usize = 32;

const PAD_TOKEN_ID: u32 = 0;

pub struct SentenceEmbedder {
    model: BertModel,
    tokenizer: Tokenizer,
    device: Device,
}

impl SentenceEmbedder {
    /// Loads the model from the conventional locations (`APP_MODEL_DIR`,
    /// `MODEL_DIR`, then `models/all-MiniLM-L6-v2` relative paths).
    pub fn new() -> Result<Self> {
        Self::from_dir(&resolve_model_dir()?)
    }

    pub fn from_dir(model_dir: &Path) -> Result<Self> {
        let device = select_device();
        info!(dir = %model_dir.display(), "loading sentence-embedding model");

        let tokenizer_path = model_dir.join("tokenizer.json");
        let tokenizer = Tokenizer::from_file(&tokenizer_path)
            .map_err(|e| anyhow!("Failed to load tokenizer from {}: {}", tokenizer_path.display(), e))?;

        let config_path = model_dir.join("config.json");
        let config: BertConfig = serde_json::from_str(&std::fs::read_to_string(&config_path)?)?;

        let weights_path = model_dir.join("pytorch_model.bin");
        let weights = candle_core::pickle::read_all(&weights_path)?;
        let weights_map: std::collections::HashMap<String, Tensor> = weights.into_iter().collect();
        let vb = VarBuilder::from_tensors(weights_map, DType::F32, &device);
        let model = BertModel::load(vb, &config)?;

        info!("sentence-embedding model ready");
        Ok(Self { model, tokenizer, device })
    }

    fn encode_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let mut out = Vec::with_capacity(texts.len());
        for batch in texts.chunks(FORWARD_BATCH) {
            out.extend(self.encode(batch)?);
        }
        Ok(out)
    }

    fn encode(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let batch = texts.len();
        let mut id_rows = Vec::with_capacity(batch);
        let mut mask_rows = Vec::with_capacity(batch);
        for text in texts {
            let (ids, mask) = tokenize_padded(&self.tokenizer, text, MAX_SEQ_LEN, PAD_TOKEN_ID)?;
            id_rows.push(ids);
            mask_rows.push(mask);
        }

        let input_ids = Tensor::from_iter(id_rows.into_iter().flatten(), &self.device)?
            .reshape((batch, MAX_SEQ_LEN))?;
        let attention_mask = Tensor::from_iter(mask_rows.into_iter().flatten(), &self.device)?
            .reshape((batch, MAX_SEQ_LEN))?;
        let token_type_ids = input_ids.zeros_like()?;

        let hidden = self
            .model
            .forward(&input_ids, &token_type_ids, Some(&attention_mask))?;
        let pooled = masked_mean_l2(&hidden, &attention_mask)?;
        let rows: Vec<Vec<f32>> = pooled
            .to_device(&Device::Cpu)?
            .to_dtype(DType::F32)?
            .to_vec2()?;
        for row in &rows {
            assert_eq!(row.len(), EMBEDDING_DIM);
        }
        Ok(rows)
    }
}

impl Embedder for SentenceEmbedder {
    fn dim(&self) -> usize {
        EMBEDDING_DIM
    }

    fn max_len(&self) -> usize {
        MAX_SEQ_LEN
    }

    fn embed_batch(&self, texts: &[String]) -> docrag_core::Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Err(Error::EmptyInput("embed_batch called with no texts".to_string()));
        }
        self.encode_batch(texts)
            .map_err(|e| Error::Embedding(e.to_string()))
    }
}

/// Deterministic stand-in used by tests: a normalized bag-of-hashed-words.
/// Texts sharing tokens land close together, which is all the retrieval
/// tests need.
pub struct FakeEmbedder {
    dim: usize,
}

impl FakeEmbedder {
    pub fn new(dim: usize) -> Self {
        Self { dim }
    }

    fn embed_one(&self, text: &str) -> Vec<f32> {
        use std::hash::{Hash, Hasher};
        use twox_hash::XxHash64;

        let mut v = vec![0f32; self.dim];
        for token in text.split_whitespace() {
            let token: String = token
                .trim_matches(|c: char| !c.is_alphanumeric())
                .to_lowercase();
            if token.is_empty() {
                continue;
            }
            let mut hasher = XxHash64::with_seed(0);
            token.hash(&mut hasher);
            let h = hasher.finish();
            let idx = (h as usize) % self.dim;
            v[idx] += (((h >> 32) as u32) as f32) / (u32::MAX as f32) + 0.5;
        }
        let norm = v.iter().map(|x| x * x).sum::<f32>().sqrt().max(1e-6);
        for x in &mut v {
            *x /= norm;
        }
        v
    }
}

impl Embedder for FakeEmbedder {
    fn dim(&self) -> usize {
        self.dim
    }

    fn max_len(&self) -> usize {
        MAX_SEQ_LEN
    }

    fn embed_batch(&self, texts: &[String]) -> docrag_core::Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Err(Error::EmptyInput("embed_batch called with no texts".to_string()));
        }
        Ok(texts.iter().map(|t| self.embed_one(t)).collect())
    }
}

/// Composition-root constructor: the returned embedder is passed down to the
/// ingestion pipeline and the retriever, never stashed in a global.
pub fn get_default_embedder() -> Result<Box<dyn Embedder>> {
    let use_fake = std::env::var("APP_USE_FAKE_EMBEDDINGS")
        .ok()
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
        .unwrap_or(false);
    if use_fake {
        info!("using FakeEmbedder (APP_USE_FAKE_EMBEDDINGS)");
        return Ok(Box::new(FakeEmbedder::new(EMBEDDING_DIM)));
    }
    Ok(Box::new(SentenceEmbedder::new()?))
}

fn resolve_model_dir() -> Result<PathBuf> {
    for var in ["APP_MODEL_DIR", "MODEL_DIR"] {
        if let Ok(dir) = std::env::var(var) {
            let p = PathBuf::from(&dir);
            if p.exists() {
                info!(var, dir = %p.display(), "using model dir from environment");
                return Ok(p);
            }
        }
    }
    for candidate in ["models/all-MiniLM-L6-v2", "../models/all-MiniLM-L6-v2"] {
        let p = Path::new(candidate);
        if p.exists() {
            info!(dir = %p.display(), "using model dir");
            return Ok(p.to_path_buf());
        }
    }
    Err(anyhow!("Could not locate the sentence-embedding model directory"))
}
