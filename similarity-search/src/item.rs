//! Data types for indexed items and search results.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Free-form caller annotations attached to an item.
pub type Metadata = HashMap<String, String>;

/// One indexed unit: a piece of text, its embedding, and its metadata.
///
/// This is also the on-disk record for both vector store formats, so field
/// names are part of the persistence format.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IndexItem {
    /// Caller-chosen identifier. Uniqueness is not enforced.
    pub id: String,
    /// The text content of the item.
    pub text: String,
    /// The embedding vector; its length equals the owning index's dimension.
    pub embedding: Vec<f32>,
    /// Key-value metadata supplied by the caller.
    pub metadata: Metadata,
}

impl IndexItem {
    /// Create a new item.
    pub fn new(
        id: impl Into<String>,
        text: impl Into<String>,
        embedding: Vec<f32>,
        metadata: Metadata,
    ) -> Self {
        Self { id: id.into(), text: text.into(), embedding, metadata }
    }
}

/// A ranked view of an [`IndexItem`] returned by a search.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SearchResult {
    /// The id of the matched item.
    pub id: String,
    /// The metric score. Higher is better for dot product and cosine;
    /// lower is better for Euclidean distance.
    pub score: f32,
    /// The text of the matched item.
    pub text: String,
    /// The metadata of the matched item.
    pub metadata: Metadata,
}

impl SearchResult {
    pub(crate) fn from_item(item: &IndexItem, score: f32) -> Self {
        Self {
            id: item.id.clone(),
            score,
            text: item.text.clone(),
            metadata: item.metadata.clone(),
        }
    }
}
