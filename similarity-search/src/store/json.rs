use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use super::{VectorStore, index_path, write_atomic};
use crate::error::Result;
use crate::item::IndexItem;

/// Stores the index as one JSON array of items.
///
/// Human-readable and bit-exact for `f32` embeddings, at roughly three times
/// the size of [`BinaryStore`](super::BinaryStore).
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonStore;

impl VectorStore for JsonStore {
    fn extension(&self) -> &'static str {
        "json"
    }

    fn save_index(&self, items: &[IndexItem], dir: &Path, name: &str) -> Result<PathBuf> {
        let path = index_path(dir, name, self.extension());
        let bytes = serde_json::to_vec(items)?;
        write_atomic(&path, &bytes)?;
        debug!(path = %path.display(), items = items.len(), bytes = bytes.len(), "wrote json index");
        Ok(path)
    }

    fn load_index(&self, path: &Path) -> Result<Vec<IndexItem>> {
        let bytes = fs::read(path)?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}
