use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

use super::vocab::SPECIAL_TOKENS;

/// Pre-tokenizer that runs before WordPiece.
///
/// Folds diacritics, lowercases, splits on whitespace, and then separates
/// each whitespace token into runs of letters and digits and single
/// punctuation or symbol characters. Special tokens such as `[SEP]` pass
/// through untouched.
#[derive(Debug, Clone, Copy, Default)]
pub struct BasicTokenizer;

impl BasicTokenizer {
    pub fn new() -> Self {
        Self
    }

    pub fn tokenize(&self, text: &str) -> Vec<String> {
        let folded: String = text.nfd().filter(|c| !is_combining_mark(*c)).collect();
        let mut tokens = Vec::new();

        for word in folded.split_whitespace() {
            if SPECIAL_TOKENS.contains(&word) {
                tokens.push(word.to_string());
                continue;
            }

            let mut fragment = String::new();
            for c in word.chars().flat_map(char::to_lowercase) {
                if c.is_alphanumeric() || c == '°' {
                    fragment.push(c);
                } else {
                    if !fragment.is_empty() {
                        tokens.push(std::mem::take(&mut fragment));
                    }
                    tokens.push(c.to_string());
                }
            }
            if !fragment.is_empty() {
                tokens.push(fragment);
            }
        }

        tokens
    }
}
