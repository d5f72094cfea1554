//! Configuration for a similarity index.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SearchError};
use crate::metric::MetricKind;

/// Configuration parameters for a [`SimilarityIndex`](crate::SimilarityIndex).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct IndexConfig {
    /// Index name, also the default file stem when saving.
    pub name: String,
    /// Metric used when a search does not supply its own.
    pub metric: MetricKind,
    /// Number of results returned when a search does not ask for a count.
    pub default_top_k: usize,
    /// Upper bound on embedder calls in flight during a batch add.
    pub max_concurrent_encodes: usize,
    /// Text encoded once at construction to discover the embedding dimension.
    pub probe_text: String,
    /// Directory for saved indexes. Falls back to the platform data directory.
    pub storage_dir: Option<PathBuf>,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            name: "similarity-index".to_string(),
            metric: MetricKind::Cosine,
            default_top_k: 5,
            max_concurrent_encodes: 8,
            probe_text: "Test sentence".to_string(),
            storage_dir: None,
        }
    }
}

impl IndexConfig {
    /// Create a new builder for constructing an [`IndexConfig`].
    pub fn builder() -> IndexConfigBuilder {
        IndexConfigBuilder::default()
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(SearchError::Config("name must not be empty".to_string()));
        }
        if self.default_top_k == 0 {
            return Err(SearchError::Config("default_top_k must be greater than zero".to_string()));
        }
        if self.max_concurrent_encodes == 0 {
            return Err(SearchError::Config(
                "max_concurrent_encodes must be greater than zero".to_string(),
            ));
        }
        if self.probe_text.trim().is_empty() {
            return Err(SearchError::Config("probe_text must not be empty".to_string()));
        }
        Ok(())
    }
}

/// Builder for constructing a validated [`IndexConfig`].
#[derive(Debug, Clone, Default)]
pub struct IndexConfigBuilder {
    config: IndexConfig,
}

impl IndexConfigBuilder {
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.config.name = name.into();
        self
    }

    pub fn metric(mut self, metric: MetricKind) -> Self {
        self.config.metric = metric;
        self
    }

    /// Set the number of results a search returns by default.
    pub fn default_top_k(mut self, k: usize) -> Self {
        self.config.default_top_k = k;
        self
    }

    /// Set how many items a batch add may encode concurrently.
    pub fn max_concurrent_encodes(mut self, limit: usize) -> Self {
        self.config.max_concurrent_encodes = limit;
        self
    }

    pub fn probe_text(mut self, text: impl Into<String>) -> Self {
        self.config.probe_text = text.into();
        self
    }

    pub fn storage_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.storage_dir = Some(dir.into());
        self
    }

    /// Build the [`IndexConfig`], validating its parameters.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Config`] if:
    /// - `name` is empty
    /// - `default_top_k == 0`
    /// - `max_concurrent_encodes == 0`
    /// - `probe_text` is empty
    pub fn build(self) -> Result<IndexConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}
