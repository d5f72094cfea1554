//! Embedder trait for turning text into vectors.

use async_trait::async_trait;

use crate::error::Result;

/// A model that encodes one piece of text into one embedding vector.
///
/// The index never asks an embedder for its output size. Instead it encodes
/// a probe sentence once at construction and fixes its dimension to the
/// length of the result, so every vector an implementation returns
/// afterwards must have that same length. Vectors of any other length are
/// treated as a failed encode.
///
/// Returning `Err` is the normal way to report that a particular input
/// could not be encoded; the index logs it and substitutes a zero vector
/// (when adding) or an empty result set (when searching).
///
/// # Example
///
/// ```rust,ignore
/// use similarity_search::Embedder;
///
/// struct MyEmbedder;
///
/// #[async_trait::async_trait]
/// impl Embedder for MyEmbedder {
///     async fn embed(&self, text: &str) -> similarity_search::Result<Vec<f32>> {
///         Ok(run_model(text))
///     }
/// }
/// ```
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Generate an embedding vector for a single text input.
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// A short name used in log fields and error messages.
    fn name(&self) -> &str {
        "embedder"
    }
}
