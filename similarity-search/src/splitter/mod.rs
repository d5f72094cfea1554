//! Text splitting strategies.
//!
//! This module provides the [`TextSplitter`] trait and four implementations:
//!
//! - [`CharacterSplitter`]: fixed number of separator-delimited units with overlap
//! - [`TokenSplitter`]: token-budget chunks cut back to sentence boundaries
//! - [`RecursiveCharacterSplitter`]: coarsest separator whose pieces fit, in characters
//! - [`RecursiveTokenSplitter`]: coarsest separator whose pieces fit, in tokens

mod character;
mod recursive;
mod token;

pub use character::CharacterSplitter;
pub use recursive::{RecursiveCharacterSplitter, RecursiveTokenSplitter};
pub use token::TokenSplitter;

use crate::item::Metadata;

/// Most tokens a single chunk may hold when it is meant for a 512-wide
/// encoder, leaving room for `[CLS]` and `[SEP]`.
pub const MAX_CHUNK_TOKENS: usize = 510;

/// The chunks produced by a [`TextSplitter`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SplitOutput {
    /// Chunk texts, trimmed, in source order.
    pub chunks: Vec<String>,
    /// Per-chunk token lists, for splitters that tokenize.
    pub tokens: Option<Vec<Vec<String>>>,
}

impl SplitOutput {
    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }
}

/// A strategy for splitting long text into bounded chunks.
///
/// Empty or whitespace-only text yields an empty [`SplitOutput`].
pub trait TextSplitter: Send + Sync {
    /// Split `text` into chunks of at most `chunk_size` units, where the
    /// unit depends on the implementation. `overlap` is a number of the same
    /// units; splitters that cannot overlap ignore it.
    fn split(&self, text: &str, chunk_size: usize, overlap: usize) -> SplitOutput;
}

/// A split chunk with provenance, ready to be embedded and indexed.
#[derive(Debug, Clone, PartialEq)]
pub struct Chunk {
    /// `{source_id}_{chunk_index}`.
    pub id: String,
    pub text: String,
    /// Tokens of this chunk, when the splitter provided them.
    pub tokens: Option<Vec<String>>,
    /// The id of the text this chunk was cut from.
    pub source_id: String,
    /// Source metadata plus a `chunk_index` field.
    pub metadata: Metadata,
}

/// Split `text` and attach provenance to every chunk.
///
/// # Example
///
/// ```rust,ignore
/// use similarity_search::{CharacterSplitter, chunk_text};
///
/// let chunks = chunk_text(&CharacterSplitter::new(), "doc1", &text, &metadata, 200, 20);
/// index.add_items(
///     chunks.iter().map(|c| c.id.clone()).collect(),
///     chunks.iter().map(|c| c.text.clone()).collect(),
///     chunks.iter().map(|c| c.metadata.clone()).collect(),
///     None,
/// ).await?;
/// ```
pub fn chunk_text(
    splitter: &dyn TextSplitter,
    source_id: &str,
    text: &str,
    metadata: &Metadata,
    chunk_size: usize,
    overlap: usize,
) -> Vec<Chunk> {
    let SplitOutput { chunks, tokens } = splitter.split(text, chunk_size, overlap);
    let mut tokens = tokens.map(Vec::into_iter);

    chunks
        .into_iter()
        .enumerate()
        .map(|(i, text)| {
            let mut metadata = metadata.clone();
            metadata.insert("chunk_index".to_string(), i.to_string());
            Chunk {
                id: format!("{source_id}_{i}"),
                text,
                tokens: tokens.as_mut().and_then(Iterator::next),
                source_id: source_id.to_string(),
                metadata,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chunk_text_derives_ids_and_metadata() {
        let metadata = Metadata::from([("source".to_string(), "notes.txt".to_string())]);
        let chunks =
            chunk_text(&CharacterSplitter::with_separator(" "), "doc", "a b c d e", &metadata, 2, 0);

        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0].id, "doc_0");
        assert_eq!(chunks[2].id, "doc_2");
        assert_eq!(chunks[1].text, "c d");
        assert_eq!(chunks[1].source_id, "doc");
        assert_eq!(chunks[1].metadata["chunk_index"], "1");
        assert_eq!(chunks[1].metadata["source"], "notes.txt");
        assert!(chunks[0].tokens.is_none());
    }

    #[test]
    fn chunk_text_of_blank_text_is_empty() {
        let chunks = chunk_text(&CharacterSplitter::new(), "doc", "  ", &Metadata::new(), 10, 0);
        assert!(chunks.is_empty());
    }
}
