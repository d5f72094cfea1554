//! Tokenizers used by the token-aware splitters and by model front ends.
//!
//! - [`BertTokenizer`]: WordPiece tokenization against a BERT vocabulary,
//!   plus helpers that build fixed-width model inputs
//! - [`WordTokenizer`]: vocabulary-free Unicode word segmentation

mod basic;
mod bert;
mod vocab;
mod word;
mod wordpiece;

pub use basic::BasicTokenizer;
pub use bert::{BertTokenizer, MAX_SEQUENCE_LEN, ModelInputs};
pub use vocab::{CLS_TOKEN, MASK_TOKEN, PAD_TOKEN, SEP_TOKEN, UNK_TOKEN, Vocabulary};
pub use word::WordTokenizer;
pub use wordpiece::WordpieceTokenizer;

/// Splits text into tokens and joins tokens back into text.
pub trait Tokenizer: Send + Sync {
    /// Split `text` into tokens.
    fn tokenize(&self, text: &str) -> Vec<String>;

    /// Rebuild text from tokens. Not an exact inverse: original whitespace
    /// and casing may be lost.
    fn detokenize(&self, tokens: &[String]) -> String;
}
