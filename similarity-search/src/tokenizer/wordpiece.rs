use std::sync::Arc;

use super::vocab::{UNK_TOKEN, Vocabulary};

/// Words longer than this many characters are replaced by `[UNK]` outright.
const MAX_INPUT_CHARS_PER_WORD: usize = 100;

/// Greedy longest-match-first sub-word tokenizer.
///
/// Expects its input to have been through [`BasicTokenizer`](super::BasicTokenizer).
/// Pieces after the first in a word carry a `##` prefix. If any position of
/// a word cannot be matched, the whole word becomes a single `[UNK]`.
#[derive(Debug, Clone)]
pub struct WordpieceTokenizer {
    vocab: Arc<Vocabulary>,
}

impl WordpieceTokenizer {
    pub fn new(vocab: Arc<Vocabulary>) -> Self {
        Self { vocab }
    }

    /// Tokenize a single pre-split word.
    pub fn tokenize(&self, word: &str) -> Vec<String> {
        let chars: Vec<char> = word.chars().collect();
        if chars.len() > MAX_INPUT_CHARS_PER_WORD {
            return vec![UNK_TOKEN.to_string()];
        }

        let mut pieces = Vec::new();
        let mut start = 0;

        while start < chars.len() {
            let mut end = chars.len();
            let mut matched = None;

            while start < end {
                let mut candidate: String = chars[start..end].iter().collect();
                if start > 0 {
                    candidate.insert_str(0, "##");
                }
                if self.vocab.contains(&candidate) {
                    matched = Some(candidate);
                    break;
                }
                end -= 1;
            }

            match matched {
                Some(piece) => pieces.push(piece),
                None => return vec![UNK_TOKEN.to_string()],
            }
            start = end;
        }

        pieces
    }
}
