//! The in-memory similarity index.
//!
//! A [`SimilarityIndex`] composes an [`Embedder`], a [`DistanceMetric`] and a
//! [`VectorStore`] around a flat list of [`IndexItem`]s. Search is exhaustive:
//! every query is scored against every item.
//!
//! # Example
//!
//! ```rust,ignore
//! use similarity_search::{IndexConfig, SimilarityIndex};
//!
//! let mut index = SimilarityIndex::builder()
//!     .config(IndexConfig::builder().name("notes").build()?)
//!     .embedder(Arc::new(my_embedder))
//!     .build()
//!     .await?;
//!
//! index.add_item("1", "Rust is a systems language", Metadata::new(), None).await;
//! let results = index.search("systems programming", None, None).await;
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

use crate::config::IndexConfig;
use crate::embedding::Embedder;
use crate::error::{Result, SearchError};
use crate::item::{IndexItem, Metadata, SearchResult};
use crate::metric::DistanceMetric;
use crate::store::{JsonStore, VectorStore, write_pinecone_export};

const STORAGE_SUBDIR: &str = "similarity-search";

/// Encode `text`, or fall back to a zero vector if the embedder fails or
/// returns a vector of the wrong length or with NaN/infinite values.
async fn encode_or_zero(embedder: &dyn Embedder, dimension: usize, id: &str, text: &str) -> Vec<f32> {
    match embedder.embed(text).await {
        Ok(embedding) if embedding.len() == dimension && embedding.iter().all(|x| x.is_finite()) => {
            embedding
        }
        Ok(embedding) if embedding.len() == dimension => {
            warn!(item.id = id, embedder = embedder.name(), "embedding has non-finite values, storing zero vector");
            vec![0.0; dimension]
        }
        Ok(embedding) => {
            warn!(
                item.id = id,
                embedder = embedder.name(),
                expected = dimension,
                actual = embedding.len(),
                "embedding has the wrong dimension, storing zero vector"
            );
            vec![0.0; dimension]
        }
        Err(e) => {
            warn!(item.id = id, embedder = embedder.name(), error = %e, "encode failed, storing zero vector");
            vec![0.0; dimension]
        }
    }
}

/// A searchable collection of embedded text items.
///
/// An index only exists once its embedding dimension is known; construct
/// one with [`SimilarityIndex::builder()`], which encodes a probe sentence
/// to discover it. Every stored embedding has exactly that dimension.
///
/// Mutating methods take `&mut self`. Share an index across tasks behind a
/// lock of your choice.
pub struct SimilarityIndex {
    config: IndexConfig,
    dimension: usize,
    items: Vec<IndexItem>,
    embedder: Arc<dyn Embedder>,
    metric: Arc<dyn DistanceMetric>,
    vector_store: Arc<dyn VectorStore>,
}

impl std::fmt::Debug for SimilarityIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SimilarityIndex")
            .field("name", &self.config.name)
            .field("dimension", &self.dimension)
            .field("items", &self.items.len())
            .field("embedder", &self.embedder.name())
            .field("metric", &self.metric.name())
            .field("store", &self.vector_store.extension())
            .finish()
    }
}

impl SimilarityIndex {
    /// Create a new [`SimilarityIndexBuilder`].
    pub fn builder() -> SimilarityIndexBuilder {
        SimilarityIndexBuilder::default()
    }

    pub fn name(&self) -> &str {
        &self.config.name
    }

    /// Length of every embedding in this index.
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn config(&self) -> &IndexConfig {
        &self.config
    }

    pub fn metric(&self) -> &dyn DistanceMetric {
        self.metric.as_ref()
    }

    /// Replace the metric used by searches that do not supply their own.
    pub fn set_metric(&mut self, metric: Arc<dyn DistanceMetric>) {
        self.metric = metric;
    }

    pub fn items(&self) -> &[IndexItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// The first item with this id.
    pub fn get_item(&self, id: &str) -> Option<&IndexItem> {
        self.items.iter().find(|item| item.id == id)
    }

    /// The first `n` items, in insertion order.
    pub fn sample(&self, n: usize) -> &[IndexItem] {
        &self.items[..n.min(self.items.len())]
    }

    /// Add one item, encoding `text` unless a correctly sized embedding is
    /// supplied. Encode failures are logged and stored as a zero vector.
    pub async fn add_item(
        &mut self,
        id: impl Into<String>,
        text: impl Into<String>,
        metadata: Metadata,
        embedding: Option<Vec<f32>>,
    ) {
        let id = id.into();
        let text = text.into();
        let embedding = match embedding {
            Some(embedding) if embedding.len() == self.dimension => embedding,
            _ => encode_or_zero(self.embedder.as_ref(), self.dimension, &id, &text).await,
        };
        self.items.push(IndexItem::new(id, text, embedding, metadata));
    }

    /// Add a batch of items. See [`add_items_with_progress`](Self::add_items_with_progress).
    pub async fn add_items(
        &mut self,
        ids: Vec<String>,
        texts: Vec<String>,
        metadata: Vec<Metadata>,
        embeddings: Option<Vec<Vec<f32>>>,
    ) -> Result<()> {
        self.add_items_with_progress(ids, texts, metadata, embeddings, |_| {}).await
    }

    /// Add a batch of items, encoding them concurrently.
    ///
    /// Items without a correctly sized precomputed embedding are encoded in
    /// separate tasks, at most `max_concurrent_encodes` at a time.
    /// `on_progress` receives each item's id as its embedding becomes
    /// available. Items are appended in input order once every task has
    /// finished; failed encodes are stored as zero vectors.
    ///
    /// Must be called from within a Tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::LengthMismatch`] if `texts`, `metadata` or
    /// `embeddings` differ in length from `ids`. Nothing is added.
    pub async fn add_items_with_progress(
        &mut self,
        ids: Vec<String>,
        texts: Vec<String>,
        metadata: Vec<Metadata>,
        embeddings: Option<Vec<Vec<f32>>>,
        mut on_progress: impl FnMut(&str) + Send,
    ) -> Result<()> {
        let expected = ids.len();
        let mut lengths = vec![("texts", texts.len()), ("metadata", metadata.len())];
        if let Some(embeddings) = &embeddings {
            lengths.push(("embeddings", embeddings.len()));
        }
        if let Some(&(what, actual)) = lengths.iter().find(|(_, len)| *len != expected) {
            return Err(SearchError::LengthMismatch { what, expected, actual });
        }

        let mut resolved: Vec<Option<Vec<f32>>> = match embeddings {
            Some(embeddings) => embeddings
                .into_iter()
                .map(|embedding| (embedding.len() == self.dimension).then_some(embedding))
                .collect(),
            None => vec![None; expected],
        };

        let semaphore = Arc::new(Semaphore::new(self.config.max_concurrent_encodes));
        let mut tasks = JoinSet::new();
        for (position, slot) in resolved.iter().enumerate() {
            if slot.is_some() {
                on_progress(&ids[position]);
                continue;
            }
            let embedder = Arc::clone(&self.embedder);
            let semaphore = Arc::clone(&semaphore);
            let id = ids[position].clone();
            let text = texts[position].clone();
            let dimension = self.dimension;
            tasks.spawn(async move {
                // The semaphore is never closed.
                let _permit = semaphore.acquire_owned().await.ok();
                (position, encode_or_zero(embedder.as_ref(), dimension, &id, &text).await)
            });
        }

        let mut failed_tasks = 0usize;
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((position, embedding)) => {
                    on_progress(&ids[position]);
                    resolved[position] = Some(embedding);
                }
                Err(e) => {
                    failed_tasks += 1;
                    warn!(error = %e, "encode task did not complete");
                }
            }
        }

        let added = ids.len();
        for (((id, text), metadata), embedding) in ids.into_iter().zip(texts).zip(metadata).zip(resolved) {
            let embedding = embedding.unwrap_or_else(|| vec![0.0; self.dimension]);
            self.items.push(IndexItem::new(id, text, embedding, metadata));
        }

        info!(index = %self.config.name, added, failed_tasks, total = self.items.len(), "added items");
        Ok(())
    }

    /// Add whole items, re-encoding any whose embedding has the wrong
    /// dimension.
    pub async fn add_index_items(&mut self, items: Vec<IndexItem>) -> Result<()> {
        let count = items.len();
        let mut ids = Vec::with_capacity(count);
        let mut texts = Vec::with_capacity(count);
        let mut metadata = Vec::with_capacity(count);
        let mut embeddings = Vec::with_capacity(count);
        for item in items {
            ids.push(item.id);
            texts.push(item.text);
            metadata.push(item.metadata);
            embeddings.push(item.embedding);
        }
        self.add_items(ids, texts, metadata, Some(embeddings)).await
    }

    /// Rank every item against `query` and return the best `top_k`
    /// (default `config.default_top_k`), best first.
    ///
    /// `metric` overrides the index metric for this call only. If the query
    /// cannot be encoded the failure is logged and no results are returned.
    pub async fn search(
        &self,
        query: &str,
        top_k: Option<usize>,
        metric: Option<&dyn DistanceMetric>,
    ) -> Vec<SearchResult> {
        let query_embedding = match self.embedder.embed(query).await {
            Ok(embedding) if embedding.len() == self.dimension => embedding,
            Ok(embedding) => {
                warn!(
                    index = %self.config.name,
                    expected = self.dimension,
                    actual = embedding.len(),
                    "query embedding has the wrong dimension"
                );
                return Vec::new();
            }
            Err(e) => {
                warn!(index = %self.config.name, error = %e, "query encode failed");
                return Vec::new();
            }
        };

        let metric = metric.unwrap_or(self.metric.as_ref());
        let top_k = top_k.unwrap_or(self.config.default_top_k);
        let candidates: Vec<&[f32]> = self.items.iter().map(|item| item.embedding.as_slice()).collect();

        let nearest = metric.find_nearest(&query_embedding, &candidates, top_k);
        debug!(
            index = %self.config.name,
            metric = metric.name(),
            candidates = candidates.len(),
            top_k,
            returned = nearest.len(),
            "search complete"
        );

        nearest
            .into_iter()
            .map(|(score, position)| SearchResult::from_item(&self.items[position], score))
            .collect()
    }

    /// Overwrite fields of the first item with this id. Returns `Ok(false)`
    /// if there is no such item. The embedding is not recomputed when only
    /// the text changes.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::DimensionMismatch`] if `embedding` has the
    /// wrong length. Nothing is changed.
    pub fn update_item(
        &mut self,
        id: &str,
        text: Option<String>,
        embedding: Option<Vec<f32>>,
        metadata: Option<Metadata>,
    ) -> Result<bool> {
        if let Some(actual) = embedding.as_ref().map(Vec::len).filter(|&len| len != self.dimension) {
            return Err(SearchError::DimensionMismatch { expected: self.dimension, actual });
        }

        let Some(item) = self.items.iter_mut().find(|item| item.id == id) else {
            return Ok(false);
        };
        if let Some(text) = text {
            item.text = text;
        }
        if let Some(embedding) = embedding {
            item.embedding = embedding;
        }
        if let Some(metadata) = metadata {
            item.metadata = metadata;
        }
        Ok(true)
    }

    /// Remove every item with this id and return how many were removed.
    pub fn remove_item(&mut self, id: &str) -> usize {
        let before = self.items.len();
        self.items.retain(|item| item.id != id);
        before - self.items.len()
    }

    pub fn remove_all(&mut self) {
        self.items.clear();
    }

    /// Directory used for persistence: `dir`, else `config.storage_dir`,
    /// else `<platform data dir>/similarity-search`. Created if missing.
    fn resolve_storage_dir(&self, dir: Option<&Path>) -> Result<PathBuf> {
        let dir = match (dir, &self.config.storage_dir) {
            (Some(dir), _) => dir.to_path_buf(),
            (None, Some(dir)) => dir.clone(),
            (None, None) => dirs::data_dir()
                .map(|data| data.join(STORAGE_SUBDIR))
                .ok_or_else(|| SearchError::Config("no platform data directory available".to_string()))?,
        };
        std::fs::create_dir_all(&dir)?;
        Ok(dir)
    }

    /// Save every item through the vector store and return the file path.
    /// `name` defaults to the index name.
    pub fn save_index(&self, dir: Option<&Path>, name: Option<&str>) -> Result<PathBuf> {
        let name = name.unwrap_or(&self.config.name);
        let dir = self.resolve_storage_dir(dir)?;

        match self.vector_store.save_index(&self.items, &dir, name) {
            Ok(path) => {
                info!(index = name, path = %path.display(), items = self.items.len(), "saved index");
                Ok(path)
            }
            Err(e) => {
                error!(index = name, dir = %dir.display(), error = %e, "failed to save index");
                Err(e)
            }
        }
    }

    /// Load the saved index whose file stem equals `name` (default: the
    /// index name) and append its items to this index.
    ///
    /// Returns `Ok(None)` if there is no such file. Loaded items with the
    /// wrong dimension are re-encoded.
    pub async fn load_index(
        &mut self,
        dir: Option<&Path>,
        name: Option<&str>,
    ) -> Result<Option<Vec<IndexItem>>> {
        let name = name.unwrap_or(&self.config.name).to_string();
        let dir = self.resolve_storage_dir(dir)?;

        let found = self
            .vector_store
            .list_indexes(&dir)?
            .into_iter()
            .find(|path| path.file_stem().is_some_and(|stem| stem == name.as_str()));
        let Some(path) = found else {
            info!(index = %name, dir = %dir.display(), "no saved index found");
            return Ok(None);
        };

        let items = self.vector_store.load_index(&path).map_err(|e| {
            error!(index = %name, path = %path.display(), error = %e, "failed to load index");
            e
        })?;
        info!(index = %name, path = %path.display(), items = items.len(), "loaded index");

        self.add_index_items(items.clone()).await?;
        Ok(Some(items))
    }

    /// Rough memory footprint of the stored items.
    pub fn estimated_size_in_bytes(&self) -> usize {
        self.items
            .iter()
            .map(|item| {
                let metadata: usize = item.metadata.iter().map(|(k, v)| k.len() + v.len()).sum();
                item.id.len() + item.text.len() + metadata + size_of::<f32>() * item.embedding.len()
            })
            .sum()
    }

    /// Write every item as a Pinecone bulk-upsert payload.
    pub fn export_pinecone(&self, path: &Path) -> Result<()> {
        write_pinecone_export(&self.items, path)?;
        info!(index = %self.config.name, path = %path.display(), items = self.items.len(), "exported index");
        Ok(())
    }
}

/// Builder for a [`SimilarityIndex`]. The embedder is required.
#[derive(Default)]
pub struct SimilarityIndexBuilder {
    name: Option<String>,
    config: Option<IndexConfig>,
    embedder: Option<Arc<dyn Embedder>>,
    metric: Option<Arc<dyn DistanceMetric>>,
    vector_store: Option<Arc<dyn VectorStore>>,
}

impl SimilarityIndexBuilder {
    /// Override the name from the config.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn config(mut self, config: IndexConfig) -> Self {
        self.config = Some(config);
        self
    }

    pub fn embedder(mut self, embedder: Arc<dyn Embedder>) -> Self {
        self.embedder = Some(embedder);
        self
    }

    /// Override the metric selected by the config.
    pub fn metric(mut self, metric: Arc<dyn DistanceMetric>) -> Self {
        self.metric = Some(metric);
        self
    }

    /// Set the persistence format. Defaults to [`JsonStore`].
    pub fn vector_store(mut self, store: Arc<dyn VectorStore>) -> Self {
        self.vector_store = Some(store);
        self
    }

    /// Discover the embedding dimension and build the index.
    ///
    /// # Errors
    ///
    /// - [`SearchError::Config`] if no embedder was set or the config is
    ///   invalid (see [`IndexConfigBuilder::build`](crate::IndexConfigBuilder::build))
    /// - [`SearchError::DimensionDiscovery`] if the probe encode fails or
    ///   returns an empty vector
    pub async fn build(self) -> Result<SimilarityIndex> {
        let embedder = self
            .embedder
            .ok_or_else(|| SearchError::Config("embedder is required".to_string()))?;

        let mut config = self.config.unwrap_or_default();
        if let Some(name) = self.name {
            config.name = name;
        }
        config.validate()?;

        let probe = embedder.embed(&config.probe_text).await.map_err(|e| {
            error!(embedder = embedder.name(), error = %e, "probe encode failed");
            SearchError::DimensionDiscovery(format!("probe encode with '{}' failed: {e}", embedder.name()))
        })?;
        if probe.is_empty() {
            return Err(SearchError::DimensionDiscovery(format!(
                "'{}' returned an empty probe vector",
                embedder.name()
            )));
        }

        let metric = self.metric.unwrap_or_else(|| config.metric.build());
        let vector_store = self.vector_store.unwrap_or_else(|| Arc::new(JsonStore));
        info!(
            index = %config.name,
            embedder = embedder.name(),
            dimension = probe.len(),
            metric = metric.name(),
            "index ready"
        );

        Ok(SimilarityIndex {
            config,
            dimension: probe.len(),
            items: Vec::new(),
            embedder,
            metric,
            vector_store,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;

    use super::*;
    use crate::metric::{DotProduct, EuclideanDistance, MetricKind};
    use crate::store::BinaryStore;

    /// Encodes text as `[byte length, 1, 0]`. Some inputs misbehave on purpose.
    #[derive(Default)]
    struct MockEmbedder {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl Embedder for MockEmbedder {
        async fn embed(&self, text: &str) -> Result<Vec<f32>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match text {
                "fail" => Err(SearchError::Embedding {
                    embedder: "mock".to_string(),
                    message: "refused".to_string(),
                }),
                "short" => Ok(vec![1.0]),
                "nan" => Ok(vec![f32::NAN, 1.0, 0.0]),
                "panic" => panic!("embedder crashed"),
                _ => Ok(vec![text.len() as f32, 1.0, 0.0]),
            }
        }

        fn name(&self) -> &str {
            "mock"
        }
    }

    struct BrokenEmbedder(Vec<f32>);

    #[async_trait]
    impl Embedder for BrokenEmbedder {
        async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
            if self.0.is_empty() {
                Ok(Vec::new())
            } else {
                Err(SearchError::Embedding { embedder: "broken".into(), message: "offline".into() })
            }
        }
    }

    async fn index() -> SimilarityIndex {
        SimilarityIndex::builder().embedder(Arc::new(MockEmbedder::default())).build().await.unwrap()
    }

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[tokio::test]
    async fn build_discovers_dimension() {
        let index = index().await;
        assert_eq!(index.dimension(), 3);
        assert_eq!(index.name(), "similarity-index");
        assert_eq!(index.metric().name(), "cosine");
        assert!(index.is_empty());
    }

    #[tokio::test]
    async fn build_failures_are_fatal() {
        let err = SimilarityIndex::builder().build().await.unwrap_err();
        assert!(matches!(err, SearchError::Config(_)));

        for embedder in [BrokenEmbedder(Vec::new()), BrokenEmbedder(vec![1.0])] {
            let err =
                SimilarityIndex::builder().embedder(Arc::new(embedder)).build().await.unwrap_err();
            assert!(matches!(err, SearchError::DimensionDiscovery(_)));
            assert!(err.is_fatal());
        }
    }

    #[tokio::test]
    async fn build_validates_deserialized_config() {
        let config: IndexConfig = serde_json::from_str(r#"{"max_concurrent_encodes": 0}"#).unwrap();
        let err = SimilarityIndex::builder()
            .config(config)
            .embedder(Arc::new(MockEmbedder::default()))
            .build()
            .await
            .unwrap_err();
        assert!(matches!(err, SearchError::Config(_)));

        let err = SimilarityIndex::builder()
            .name("  ")
            .embedder(Arc::new(MockEmbedder::default()))
            .build()
            .await
            .unwrap_err();
        assert!(matches!(err, SearchError::Config(_)));
    }

    #[tokio::test]
    async fn builder_overrides_config() {
        let config = IndexConfig::builder().name("docs").metric(MetricKind::Euclidean).build().unwrap();
        let index = SimilarityIndex::builder()
            .config(config)
            .name("renamed")
            .embedder(Arc::new(MockEmbedder::default()))
            .metric(Arc::new(DotProduct))
            .build()
            .await
            .unwrap();
        assert_eq!(index.name(), "renamed");
        assert_eq!(index.metric().name(), "dot_product");
    }

    #[tokio::test]
    async fn add_item_uses_supplied_embedding_or_encodes() {
        let mut index = index().await;
        index.add_item("a", "abcd", Metadata::new(), Some(vec![9.0, 9.0, 9.0])).await;
        index.add_item("b", "abcd", Metadata::new(), Some(vec![9.0])).await;
        index.add_item("c", "abcd", Metadata::new(), None).await;

        assert_eq!(index.get_item("a").unwrap().embedding, vec![9.0, 9.0, 9.0]);
        assert_eq!(index.get_item("b").unwrap().embedding, vec![4.0, 1.0, 0.0]);
        assert_eq!(index.get_item("c").unwrap().embedding, vec![4.0, 1.0, 0.0]);
    }

    #[tokio::test]
    async fn failed_encodes_store_zero_vectors() {
        let mut index = index().await;
        index.add_item("a", "fail", Metadata::new(), None).await;
        index.add_item("b", "short", Metadata::new(), None).await;
        index.add_item("c", "nan", Metadata::new(), None).await;
        assert!(index.items().iter().all(|item| item.embedding == vec![0.0; 3]));

        let dir = tempfile::tempdir().unwrap();
        index.save_index(Some(dir.path()), Some("zeros")).unwrap();
        let loaded = index.load_index(Some(dir.path()), Some("zeros")).await.unwrap().unwrap();
        assert_eq!(loaded.len(), 3);
    }

    #[tokio::test]
    async fn add_items_keeps_input_order_and_reports_progress() {
        let mut index = index().await;
        let ids = strings(&["a", "b", "c", "d", "e"]);
        let texts = strings(&["one", "fail", "three", "panic", "five"]);
        let mut seen = Vec::new();

        index
            .add_items_with_progress(
                ids.clone(),
                texts,
                vec![Metadata::new(); 5],
                None,
                |id| seen.push(id.to_string()),
            )
            .await
            .unwrap();

        let stored: Vec<&str> = index.items().iter().map(|item| item.id.as_str()).collect();
        assert_eq!(stored, vec!["a", "b", "c", "d", "e"]);
        assert_eq!(index.items()[0].embedding, vec![3.0, 1.0, 0.0]);
        assert_eq!(index.items()[1].embedding, vec![0.0; 3]);
        assert_eq!(index.items()[3].embedding, vec![0.0; 3]);

        // The panicked task cannot report progress.
        seen.sort();
        assert_eq!(seen, strings(&["a", "b", "c", "e"]));
    }

    #[tokio::test]
    async fn add_items_skips_encoding_for_precomputed_embeddings() {
        let embedder = Arc::new(MockEmbedder::default());
        let mut index = SimilarityIndex::builder().embedder(embedder.clone()).build().await.unwrap();
        let probe_calls = embedder.calls.load(Ordering::SeqCst);

        index
            .add_items(
                strings(&["a", "b"]),
                strings(&["xx", "yyy"]),
                vec![Metadata::new(); 2],
                Some(vec![vec![1.0, 2.0, 3.0], vec![1.0]]),
            )
            .await
            .unwrap();

        assert_eq!(embedder.calls.load(Ordering::SeqCst) - probe_calls, 1);
        assert_eq!(index.items()[0].embedding, vec![1.0, 2.0, 3.0]);
        assert_eq!(index.items()[1].embedding, vec![3.0, 1.0, 0.0]);
    }

    #[tokio::test]
    async fn add_items_length_mismatch_adds_nothing() {
        let mut index = index().await;
        let err = index
            .add_items(strings(&["a", "b"]), strings(&["x"]), vec![Metadata::new(); 2], None)
            .await
            .unwrap_err();
        assert!(matches!(err, SearchError::LengthMismatch { what: "texts", expected: 2, actual: 1 }));

        let err = index
            .add_items(strings(&["a"]), strings(&["x"]), vec![Metadata::new()], Some(Vec::new()))
            .await
            .unwrap_err();
        assert!(matches!(err, SearchError::LengthMismatch { what: "embeddings", .. }));
        assert!(index.is_empty());
    }

    #[tokio::test]
    async fn search_ranks_and_maps_by_position() {
        let mut index = index().await;
        index.set_metric(Arc::new(EuclideanDistance));
        for (id, text) in [("dup", "a"), ("dup", "abcdef"), ("x", "abc")] {
            index.add_item(id, text, Metadata::new(), None).await;
        }

        let results = index.search("abcde", Some(2), None).await;
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].text, "abcdef");
        assert_eq!(results[1].text, "abc");
        assert!(results[0].score <= results[1].score);

        assert_eq!(index.search("abcde", None, None).await.len(), 3);
        assert!(index.search("fail", None, None).await.is_empty());
    }

    #[tokio::test]
    async fn metric_override_does_not_persist() {
        let mut index = index().await;
        index.add_item("a", "abc", Metadata::new(), None).await;

        let results = index.search("ab", Some(1), Some(&DotProduct as &dyn DistanceMetric)).await;
        assert_eq!(results[0].score, 7.0);
        assert_eq!(index.metric().name(), "cosine");
    }

    #[tokio::test]
    async fn update_and_remove() {
        let mut index = index().await;
        for id in ["a", "b", "a"] {
            index.add_item(id, "text", Metadata::new(), None).await;
        }

        let err = index.update_item("a", None, Some(vec![1.0]), None).unwrap_err();
        assert!(matches!(err, SearchError::DimensionMismatch { expected: 3, actual: 1 }));
        assert_eq!(index.get_item("a").unwrap().embedding, vec![4.0, 1.0, 0.0]);

        let metadata = Metadata::from([("k".to_string(), "v".to_string())]);
        assert!(index.update_item("a", Some("new".into()), None, Some(metadata.clone())).unwrap());
        assert_eq!(index.items()[0].text, "new");
        assert_eq!(index.items()[0].metadata, metadata);
        assert_eq!(index.items()[2].text, "text");
        assert!(!index.update_item("zzz", Some("x".into()), None, None).unwrap());

        assert_eq!(index.remove_item("a"), 2);
        assert_eq!(index.remove_item("a"), 0);
        assert_eq!(index.len(), 1);
        index.remove_all();
        assert!(index.is_empty());
    }

    #[tokio::test]
    async fn sample_and_size() {
        let mut index = index().await;
        let metadata = Metadata::from([("src".to_string(), "ab".to_string())]);
        index.add_item("id", "text", metadata, None).await;
        index.add_item("i2", "more", Metadata::new(), None).await;

        assert_eq!(index.sample(1).len(), 1);
        assert_eq!(index.sample(10).len(), 2);
        // (2 + 4 + 5 + 12) + (2 + 4 + 12)
        assert_eq!(index.estimated_size_in_bytes(), 41);
    }

    #[tokio::test]
    async fn save_then_load_appends_items() {
        let dir = tempfile::tempdir().unwrap();
        let stores: [Arc<dyn VectorStore>; 2] = [Arc::new(JsonStore), Arc::new(BinaryStore)];
        for store in stores {
            let mut index = SimilarityIndex::builder()
                .embedder(Arc::new(MockEmbedder::default()))
                .vector_store(store.clone())
                .build()
                .await
                .unwrap();
            index.add_item("a", "hello", Metadata::new(), None).await;
            let path = index.save_index(Some(dir.path()), Some("saved")).unwrap();
            assert_eq!(path.extension().unwrap(), store.extension());

            let loaded = index.load_index(Some(dir.path()), Some("saved")).await.unwrap().unwrap();
            assert_eq!(loaded.len(), 1);
            assert_eq!(index.len(), 2);
            assert_eq!(index.items()[1], index.items()[0]);

            assert!(index.load_index(Some(dir.path()), Some("sav")).await.unwrap().is_none());
        }
    }

    #[tokio::test]
    async fn storage_dir_comes_from_config() {
        let dir = tempfile::tempdir().unwrap();
        let storage = dir.path().join("indexes");
        let config = IndexConfig::builder().name("cfg").storage_dir(&storage).build().unwrap();
        let mut index = SimilarityIndex::builder()
            .config(config)
            .embedder(Arc::new(MockEmbedder::default()))
            .build()
            .await
            .unwrap();
        index.add_item("a", "hello", Metadata::new(), None).await;

        let path = index.save_index(None, None).unwrap();
        assert_eq!(path, storage.join("cfg.json"));
    }
}
