use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use super::{VectorStore, index_path, write_atomic};
use crate::error::{Result, SearchError};
use crate::item::IndexItem;

const BACKEND: &str = "binary";
const LENGTH_PREFIX: usize = size_of::<u32>();

/// Stores the index as an LZMA-compressed stream of records.
///
/// Each record is a little-endian `u32` byte length followed by one
/// JSON-encoded [`IndexItem`].
#[derive(Debug, Clone, Copy, Default)]
pub struct BinaryStore;

fn encode_records(items: &[IndexItem]) -> Result<Vec<u8>> {
    let mut raw = Vec::new();
    for item in items {
        let record = serde_json::to_vec(item)?;
        let len = u32::try_from(record.len()).map_err(|_| {
            SearchError::store(BACKEND, format!("item '{}' is too large to encode", item.id))
        })?;
        raw.extend_from_slice(&len.to_le_bytes());
        raw.extend_from_slice(&record);
    }
    Ok(raw)
}

fn decode_records(raw: &[u8]) -> Result<Vec<IndexItem>> {
    let mut items = Vec::new();
    let mut rest = raw;

    while !rest.is_empty() {
        let Some((prefix, tail)) = rest.split_first_chunk::<LENGTH_PREFIX>() else {
            return Err(SearchError::store(BACKEND, "truncated record length"));
        };
        let len = u32::from_le_bytes(*prefix) as usize;
        if tail.len() < len {
            return Err(SearchError::store(
                BACKEND,
                format!("truncated record: {len} bytes announced, {} left", tail.len()),
            ));
        }
        let (record, tail) = tail.split_at(len);
        items.push(serde_json::from_slice(record)?);
        rest = tail;
    }

    Ok(items)
}

impl VectorStore for BinaryStore {
    fn extension(&self) -> &'static str {
        "dat"
    }

    fn save_index(&self, items: &[IndexItem], dir: &Path, name: &str) -> Result<PathBuf> {
        let path = index_path(dir, name, self.extension());
        let raw = encode_records(items)?;

        let mut compressed = Vec::new();
        lzma_rs::lzma_compress(&mut raw.as_slice(), &mut compressed)?;

        write_atomic(&path, &compressed)?;
        debug!(
            path = %path.display(),
            items = items.len(),
            raw_bytes = raw.len(),
            bytes = compressed.len(),
            "wrote binary index"
        );
        Ok(path)
    }

    fn load_index(&self, path: &Path) -> Result<Vec<IndexItem>> {
        let compressed = fs::read(path)?;

        // The stream does not record its decompressed size.
        let mut raw = Vec::with_capacity(compressed.len().saturating_mul(5));
        lzma_rs::lzma_decompress(&mut compressed.as_slice(), &mut raw)
            .map_err(|e| SearchError::store(BACKEND, e.to_string()))?;

        decode_records(&raw)
    }
}
