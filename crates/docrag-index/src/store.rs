//! Durable layout of a built index:
//!
//! - `vector_index.json`: dimension + row-major vectors, exact-search capable
//! - `chunk_ids.json`: chunk identifiers, index-aligned with the vectors
//! - `chunk_texts.json`: original chunk text, same alignment
//!
//! The three artifacts share one lifecycle: they are staged to temporary
//! names and renamed together, and `load_all` refuses to proceed when their
//! lengths disagree.

use std::fs;
use std::path::Path;

use tracing::info;

use docrag_core::error::{Error, Result};

use crate::flat::FlatIndex;

pub const INDEX_FILE: &str = "vector_index.json";
pub const IDS_FILE: &str = "chunk_ids.json";
pub const TEXTS_FILE: &str = "chunk_texts.json";

/// A vector index together with its parallel arrays. Constructing one checks
/// the alignment invariant, so a value of this type is always consistent.
#[derive(Debug)]
pub struct IndexArtifacts {
    pub index: FlatIndex,
    pub ids: Vec<String>,
    pub texts: Vec<String>,
}

impl IndexArtifacts {
    pub fn new(index: FlatIndex, ids: Vec<String>, texts: Vec<String>) -> Result<Self> {
        if index.len() != ids.len() || ids.len() != texts.len() {
            return Err(Error::InvalidArgument(format!(
                "misaligned artifacts: {} vectors, {} ids, {} texts",
                index.len(),
                ids.len(),
                texts.len()
            )));
        }
        Ok(Self { index, ids, texts })
    }
}

/// Writes the index and both parallel arrays under `dir`. All three are
/// staged as `*.tmp` first and renamed only once every write succeeded, so a
/// failed write never clobbers an existing index.
///
/// The three renames themselves are not one atomic step: a crash between
/// them over an existing index can leave a mixed old/new set, and when both
/// runs indexed the same number of fragments the length check in `load_all`
/// cannot tell. Rebuilding the index clears the state.
pub fn save_all(artifacts: &IndexArtifacts, dir: &Path) -> Result<()> {
    fs::create_dir_all(dir)?;

    let staged = [
        (INDEX_FILE, serde_json::to_vec(&artifacts.index)?),
        (IDS_FILE, serde_json::to_vec(&artifacts.ids)?),
        (TEXTS_FILE, serde_json::to_vec(&artifacts.texts)?),
    ];
    for (name, bytes) in &staged {
        fs::write(dir.join(format!("{}.tmp", name)), bytes)?;
    }
    for (name, _) in &staged {
        fs::rename(dir.join(format!("{}.tmp", name)), dir.join(name))?;
    }

    info!(dir = %dir.display(), fragments = artifacts.ids.len(), "persisted vector index");
    Ok(())
}

/// Loads the three artifacts back. A directory holding none of them means no
/// index was ever built there (`IndexNotReady`); a partial or misaligned set
/// is corruption and is never silently truncated into shape.
pub fn load_all(dir: &Path) -> Result<IndexArtifacts> {
    let paths = [dir.join(INDEX_FILE), dir.join(IDS_FILE), dir.join(TEXTS_FILE)];
    let present = paths.iter().filter(|p| p.exists()).count();
    if present == 0 {
        return Err(Error::IndexNotReady(format!(
            "no persisted index under {}",
            dir.display()
        )));
    }
    if present < paths.len() {
        return Err(Error::CorruptState(format!(
            "only {} of 3 index artifacts present under {}",
            present,
            dir.display()
        )));
    }

    let index: FlatIndex = serde_json::from_str(&fs::read_to_string(&paths[0])?)?;
    let ids: Vec<String> = serde_json::from_str(&fs::read_to_string(&paths[1])?)?;
    let texts: Vec<String> = serde_json::from_str(&fs::read_to_string(&paths[2])?)?;

    if index.len() != ids.len() || ids.len() != texts.len() {
        return Err(Error::CorruptState(format!(
            "misaligned artifacts under {}: {} vectors, {} ids, {} texts",
            dir.display(),
            index.len(),
            ids.len(),
            texts.len()
        )));
    }
    Ok(IndexArtifacts { index, ids, texts })
}
