//! Embeddable semantic search.
//!
//! This crate provides:
//! - [`SimilarityIndex`], an in-memory index with exhaustive nearest-neighbour search
//! - pluggable [`Embedder`]s and [`DistanceMetric`]s (dot product, cosine, Euclidean)
//! - text splitters for cutting documents into embeddable chunks
//! - a WordPiece [`BertTokenizer`] for BERT-style encoders
//! - JSON and LZMA-compressed binary index files, plus a Pinecone export
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use similarity_search::{IndexConfig, Metadata, SimilarityIndex};
//!
//! let mut index = SimilarityIndex::builder()
//!     .config(IndexConfig::builder().name("notes").default_top_k(3).build()?)
//!     .embedder(Arc::new(my_embedder))
//!     .build()
//!     .await?;
//!
//! index.add_item("1", "The cat sat on the mat", Metadata::new(), None).await;
//! for result in index.search("where did the cat sit?", None, None).await {
//!     println!("{:.3} {}", result.score, result.text);
//! }
//! index.save_index(None, None)?;
//! ```

pub mod config;
pub mod embedding;
pub mod error;
pub mod index;
pub mod item;
pub mod metric;
pub mod prompt;
pub mod splitter;
pub mod store;
pub mod tokenizer;
pub mod topk;

pub use config::{IndexConfig, IndexConfigBuilder};
pub use embedding::Embedder;
pub use error::{Result, SearchError};
pub use index::{SimilarityIndex, SimilarityIndexBuilder};
pub use item::{IndexItem, Metadata, SearchResult};
pub use metric::{CosineSimilarity, DistanceMetric, DotProduct, EuclideanDistance, MetricKind};
pub use prompt::{combined_results_string, export_llm_prompt};
pub use splitter::{
    CharacterSplitter, Chunk, MAX_CHUNK_TOKENS, RecursiveCharacterSplitter,
    RecursiveTokenSplitter, SplitOutput, TextSplitter, TokenSplitter, chunk_text,
};
pub use store::{
    BinaryStore, JsonStore, PineconeExport, PineconeMetadata, PineconeVector, VectorStore,
    write_pinecone_export,
};
pub use tokenizer::{
    BasicTokenizer, BertTokenizer, MAX_SEQUENCE_LEN, ModelInputs, Tokenizer, Vocabulary,
    WordTokenizer, WordpieceTokenizer,
};
pub use topk::top_k_by;
