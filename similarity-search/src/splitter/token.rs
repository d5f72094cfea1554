use std::sync::Arc;

use super::{MAX_CHUNK_TOKENS, SplitOutput, TextSplitter};
use crate::tokenizer::Tokenizer;

const SENTENCE_END: [char; 4] = ['.', '?', '!', '\n'];

/// Tokenizes the whole text once and emits chunks of at most `chunk_size`
/// tokens (capped at [`MAX_CHUNK_TOKENS`]), cut back after the last token
/// in the window that ends a sentence.
///
/// Chunk text is rebuilt with [`Tokenizer::detokenize`], so it is lossy for
/// casing and unknown words. The token list returned for each chunk is the
/// span of source tokens it was rebuilt from; the spans concatenate back to
/// the full tokenization. `overlap` is ignored.
pub struct TokenSplitter {
    tokenizer: Arc<dyn Tokenizer>,
}

impl TokenSplitter {
    pub fn new(tokenizer: Arc<dyn Tokenizer>) -> Self {
        Self { tokenizer }
    }

    /// Shrink a window so it does not end in the middle of a word, unless
    /// the word is longer than the whole window.
    fn word_aligned_end(tokens: &[String], end: usize) -> usize {
        if end >= tokens.len() {
            return end;
        }
        let mut aligned = end;
        while aligned > 0 && tokens[aligned].starts_with("##") {
            aligned -= 1;
        }
        if aligned == 0 { end } else { aligned }
    }
}

impl TextSplitter for TokenSplitter {
    fn split(&self, text: &str, chunk_size: usize, _overlap: usize) -> SplitOutput {
        if text.trim().is_empty() {
            return SplitOutput::default();
        }

        let chunk_size = chunk_size.clamp(1, MAX_CHUNK_TOKENS);
        let tokens = self.tokenizer.tokenize(text);

        let mut chunks = Vec::new();
        let mut chunk_tokens = Vec::new();
        let mut remaining: &[String] = &tokens;

        while !remaining.is_empty() {
            let end = Self::word_aligned_end(remaining, chunk_size.min(remaining.len()));
            let window = &remaining[..end];

            let consumed = window
                .iter()
                .rposition(|token| token.ends_with(SENTENCE_END))
                .map_or(window.len(), |last| last + 1);
            let chunk = self.tokenizer.detokenize(&window[..consumed]).replace('\n', " ");
            chunks.push(chunk.trim().to_string());
            chunk_tokens.push(remaining[..consumed].to_vec());
            remaining = &remaining[consumed..];
        }

        SplitOutput { chunks, tokens: Some(chunk_tokens) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokenizer::{BertTokenizer, WordTokenizer};

    fn splitter() -> (TokenSplitter, Arc<BertTokenizer>) {
        let tokenizer = Arc::new(BertTokenizer::bundled().unwrap());
        (TokenSplitter::new(tokenizer.clone()), tokenizer)
    }

    #[test]
    fn cuts_back_to_last_sentence_end() {
        let (splitter, _) = splitter();
        let output = splitter.split("This is a test. Free music online today", 8, 0);

        assert_eq!(output.chunks, vec!["this is a test .", "free music online today"]);
        let tokens = output.tokens.unwrap();
        assert_eq!(tokens[0], vec!["this", "is", "a", "test", "."]);
        assert_eq!(tokens[1], vec!["free", "music", "online", "today"]);
    }

    #[test]
    fn does_not_cut_inside_a_word() {
        let (splitter, _) = splitter();
        // "searching" is two tokens; a 2-token window would split it.
        let output = splitter.split("the searching", 2, 0);
        assert_eq!(output.chunks, vec!["the", "searching"]);
    }

    #[test]
    fn spans_partition_the_original_tokens() {
        let (splitter, tokenizer) = splitter();
        let text = "Running tests is good. Searching for news? Yes! Read the full terms \
                    and privacy policy before you buy any products online";
        let output = splitter.split(text, 5, 0);

        let rejoined: Vec<String> = output.tokens.unwrap().into_iter().flatten().collect();
        assert_eq!(rejoined, tokenizer.tokenize(text));
        for chunk in &output.chunks {
            assert!(tokenizer.tokenize(chunk).len() <= 5, "chunk too long: {chunk}");
        }
    }

    #[test]
    fn works_with_vocabulary_free_tokenizer() {
        let splitter = TokenSplitter::new(Arc::new(WordTokenizer));
        let output = splitter.split("Hello there.\nGeneral Kenobi", 3, 0);
        assert_eq!(output.chunks, vec!["Hello there .", "General Kenobi"]);
    }

    #[test]
    fn dots_inside_tokens_do_not_drop_text() {
        let splitter = TokenSplitter::new(Arc::new(WordTokenizer));
        let text = "It costs 3.50 dollars now. See e.g. the list at 4.25 each";
        let output = splitter.split(text, 5, 0);

        assert_eq!(output.chunks[0], "It costs 3.50 dollars now");
        let spans: Vec<String> = output.tokens.unwrap().into_iter().flatten().collect();
        assert_eq!(spans, WordTokenizer.tokenize(text));
        for word in text.split_whitespace() {
            let word = word.trim_end_matches('.');
            assert!(
                output.chunks.iter().any(|chunk| chunk.contains(word)),
                "'{word}' is in no chunk: {:?}",
                output.chunks
            );
        }
    }

    #[test]
    fn blank_text_yields_nothing() {
        let (splitter, _) = splitter();
        let output = splitter.split("   ", 10, 0);
        assert!(output.is_empty());
        assert!(output.tokens.is_none());
    }

    #[test]
    fn chunk_size_is_capped() {
        let (splitter, _) = splitter();
        let text = "test ".repeat(1200);
        let output = splitter.split(&text, 10_000, 0);
        let tokens = output.tokens.unwrap();
        assert_eq!(tokens.len(), 3);
        assert_eq!(tokens[0].len(), MAX_CHUNK_TOKENS);
        assert_eq!(tokens[2].len(), 1200 - 2 * MAX_CHUNK_TOKENS);
    }
}
