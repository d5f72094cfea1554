use std::sync::Arc;

use super::{MAX_CHUNK_TOKENS, SplitOutput, TextSplitter};
use crate::tokenizer::Tokenizer;

const CHARACTER_SEPARATORS: [&str; 4] = ["\n\n", "\n", ".", " "];
const TOKEN_SEPARATORS: [&str; 5] = ["\n\n", "\n", ".", " ", ""];

/// Split on the coarsest separator whose pieces all fit, then pack the
/// pieces back together greedily. An empty separator splits per character.
fn split_recursive<F>(text: &str, separators: &[&str], chunk_size: usize, measure: F) -> Vec<String>
where
    F: Fn(&str) -> usize,
{
    for &separator in separators {
        let pieces: Vec<&str> = if separator.is_empty() {
            text.char_indices().map(|(i, c)| &text[i..i + c.len_utf8()]).collect()
        } else {
            text.split(separator).collect()
        };

        if pieces.iter().any(|piece| measure(piece.trim()) > chunk_size) {
            continue;
        }

        let mut chunks = Vec::new();
        let mut current = String::new();
        for piece in pieces {
            let candidate = if current.is_empty() {
                piece.to_string()
            } else {
                format!("{current}{separator}{piece}")
            };

            if measure(candidate.trim()) <= chunk_size {
                current = candidate;
            } else {
                push_trimmed(&mut chunks, &current);
                current = piece.to_string();
            }
        }
        push_trimmed(&mut chunks, &current);
        return chunks;
    }

    Vec::new()
}

fn push_trimmed(chunks: &mut Vec<String>, chunk: &str) {
    let chunk = chunk.trim();
    if !chunk.is_empty() {
        chunks.push(chunk.to_string());
    }
}

/// Recursive splitter measured in characters.
///
/// Tries `"\n\n"`, `"\n"`, `"."` and `" "` in that order. Text with a single
/// word longer than `chunk_size` characters produces no chunks. `overlap`
/// is ignored.
#[derive(Debug, Clone, Copy, Default)]
pub struct RecursiveCharacterSplitter;

impl RecursiveCharacterSplitter {
    pub fn new() -> Self {
        Self
    }
}

impl TextSplitter for RecursiveCharacterSplitter {
    fn split(&self, text: &str, chunk_size: usize, _overlap: usize) -> SplitOutput {
        if text.trim().is_empty() {
            return SplitOutput::default();
        }

        let chunks =
            split_recursive(text, &CHARACTER_SEPARATORS, chunk_size.max(1), |s| s.chars().count());
        SplitOutput { chunks, tokens: None }
    }
}

/// Recursive splitter measured in tokens, falling back to single characters.
///
/// `chunk_size` is capped at [`MAX_CHUNK_TOKENS`]. Each chunk comes with its
/// own tokenization.
pub struct RecursiveTokenSplitter {
    tokenizer: Arc<dyn Tokenizer>,
}

impl RecursiveTokenSplitter {
    pub fn new(tokenizer: Arc<dyn Tokenizer>) -> Self {
        Self { tokenizer }
    }
}

impl TextSplitter for RecursiveTokenSplitter {
    fn split(&self, text: &str, chunk_size: usize, _overlap: usize) -> SplitOutput {
        if text.trim().is_empty() {
            return SplitOutput::default();
        }

        let chunk_size = chunk_size.clamp(1, MAX_CHUNK_TOKENS);
        let chunks = split_recursive(text, &TOKEN_SEPARATORS, chunk_size, |s| {
            self.tokenizer.tokenize(s).len()
        });
        let tokens = chunks.iter().map(|chunk| self.tokenizer.tokenize(chunk)).collect();

        SplitOutput { chunks, tokens: Some(tokens) }
    }
}
