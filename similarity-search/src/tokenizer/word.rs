use unicode_segmentation::UnicodeSegmentation;

use super::Tokenizer;

/// Vocabulary-free tokenizer that splits on Unicode word boundaries.
///
/// Punctuation is kept as separate tokens, whitespace is dropped. Useful
/// for the token-aware splitters when no model vocabulary is at hand.
#[derive(Debug, Clone, Copy, Default)]
pub struct WordTokenizer;

impl WordTokenizer {
    pub fn new() -> Self {
        Self
    }
}

impl Tokenizer for WordTokenizer {
    fn tokenize(&self, text: &str) -> Vec<String> {
        text.split_word_bounds()
            .filter(|segment| !segment.trim().is_empty())
            .map(str::to_string)
            .collect()
    }

    fn detokenize(&self, tokens: &[String]) -> String {
        tokens.join(" ")
    }
}
