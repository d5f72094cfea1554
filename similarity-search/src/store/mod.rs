//! On-disk persistence for index items.
//!
//! This module provides the [`VectorStore`] trait and its file formats:
//!
//! - [`JsonStore`]: a JSON array of items, `<name>.json`
//! - [`BinaryStore`]: LZMA-compressed length-prefixed JSON records, `<name>.dat`
//!
//! plus a one-way [`PineconeExport`] for bulk upload to a hosted vector
//! database. All writes go through a temporary file in the target directory
//! that is renamed into place.

mod binary;
mod export;
mod json;

pub use binary::BinaryStore;
pub use export::{PineconeExport, PineconeMetadata, PineconeVector, write_pinecone_export};
pub use json::JsonStore;

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use crate::error::Result;
use crate::item::IndexItem;

/// A file format for saving and loading index items.
///
/// Stores are stateless and synchronous; the directory to read or write is
/// passed to every call.
///
/// # Example
///
/// ```rust,ignore
/// use similarity_search::{JsonStore, VectorStore};
///
/// let path = JsonStore.save_index(index.items(), dir, "notes")?;
/// let items = JsonStore.load_index(&path)?;
/// ```
pub trait VectorStore: Send + Sync {
    /// File extension, without the dot.
    fn extension(&self) -> &'static str;

    /// Write `items` to `<dir>/<name>.<extension>`, replacing any existing
    /// file, and return the path written.
    fn save_index(&self, items: &[IndexItem], dir: &Path, name: &str) -> Result<PathBuf>;

    /// Read every item from a file written by [`save_index`](Self::save_index).
    fn load_index(&self, path: &Path) -> Result<Vec<IndexItem>>;

    /// Files in `dir` with this store's extension, sorted by path. A missing
    /// directory has no indexes.
    fn list_indexes(&self, dir: &Path) -> Result<Vec<PathBuf>> {
        if !dir.is_dir() {
            return Ok(Vec::new());
        }

        let mut paths = Vec::new();
        for entry in fs::read_dir(dir)? {
            let path = entry?.path();
            if path.is_file() && path.extension().is_some_and(|ext| ext == self.extension()) {
                paths.push(path);
            }
        }
        paths.sort();
        Ok(paths)
    }
}

pub(crate) fn index_path(dir: &Path, name: &str, extension: &str) -> PathBuf {
    dir.join(format!("{name}.{extension}"))
}

/// Replace `path` with `bytes` via a temporary file in the same directory.
pub(crate) fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir)?;

    let mut file = NamedTempFile::new_in(dir)?;
    file.write_all(bytes)?;
    file.as_file().sync_all()?;
    file.persist(path).map_err(|e| e.error)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_atomic_creates_and_replaces() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("file.txt");

        write_atomic(&path, b"first").unwrap();
        write_atomic(&path, b"second").unwrap();

        assert_eq!(fs::read(&path).unwrap(), b"second");
        assert_eq!(fs::read_dir(path.parent().unwrap()).unwrap().count(), 1);
    }

    #[test]
    fn list_indexes_filters_by_extension_and_sorts() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["b.json", "a.json", "c.dat", "notes.txt"] {
            fs::write(dir.path().join(name), b"[]").unwrap();
        }
        fs::create_dir(dir.path().join("folder.json")).unwrap();

        let found = JsonStore.list_indexes(dir.path()).unwrap();
        assert_eq!(found, vec![dir.path().join("a.json"), dir.path().join("b.json")]);

        let found = BinaryStore.list_indexes(dir.path()).unwrap();
        assert_eq!(found, vec![dir.path().join("c.dat")]);
    }

    #[test]
    fn list_indexes_of_missing_dir_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        assert!(JsonStore.list_indexes(&dir.path().join("absent")).unwrap().is_empty());
    }
}
