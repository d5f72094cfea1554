use std::path::Path;

use serde::{Deserialize, Serialize};

use super::write_atomic;
use crate::error::Result;
use crate::item::IndexItem;

/// Bulk-upsert payload in the shape Pinecone's `/vectors/upsert` expects.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PineconeExport {
    pub vectors: Vec<PineconeVector>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PineconeVector {
    pub id: String,
    pub metadata: PineconeMetadata,
    pub values: Vec<f32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PineconeMetadata {
    pub text: String,
    /// The item's `source` metadata entry, or empty.
    pub source: String,
}

impl PineconeExport {
    pub fn from_items(items: &[IndexItem]) -> Self {
        let vectors = items
            .iter()
            .map(|item| PineconeVector {
                id: item.id.clone(),
                metadata: PineconeMetadata {
                    text: item.text.clone(),
                    source: item.metadata.get("source").cloned().unwrap_or_default(),
                },
                values: item.embedding.clone(),
            })
            .collect();
        Self { vectors }
    }
}

/// Write `items` as a pretty-printed [`PineconeExport`] to `path`.
pub fn write_pinecone_export(items: &[IndexItem], path: &Path) -> Result<()> {
    let bytes = serde_json::to_vec_pretty(&PineconeExport::from_items(items))?;
    write_atomic(path, &bytes)
}
