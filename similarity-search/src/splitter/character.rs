use super::{SplitOutput, TextSplitter};

/// Splits on a literal separator and packs a fixed number of units per chunk.
///
/// With no separator every character is a unit. When `chunk_size` units are
/// buffered the chunk is emitted and its last `overlap` units start the next
/// one. `overlap` is capped at `chunk_size - 1` so chunks always advance.
///
/// # Example
///
/// ```rust,ignore
/// use similarity_search::{CharacterSplitter, TextSplitter};
///
/// let output = CharacterSplitter::with_separator(" ").split("a b c d", 2, 1);
/// assert_eq!(output.chunks, ["a b", "b c", "c d"]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct CharacterSplitter {
    separator: Option<String>,
}

impl CharacterSplitter {
    /// Per-character splitter.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_separator(separator: impl Into<String>) -> Self {
        let separator = separator.into();
        Self { separator: (!separator.is_empty()).then_some(separator) }
    }

    fn units<'a>(&self, text: &'a str) -> Vec<&'a str> {
        match &self.separator {
            Some(separator) => text.split(separator.as_str()).collect(),
            None => text.char_indices().map(|(i, c)| &text[i..i + c.len_utf8()]).collect(),
        }
    }

    fn join(&self, units: &[&str]) -> String {
        let separator = self.separator.as_deref().unwrap_or("");
        units.join(separator).trim().to_string()
    }
}

impl TextSplitter for CharacterSplitter {
    fn split(&self, text: &str, chunk_size: usize, overlap: usize) -> SplitOutput {
        if text.trim().is_empty() {
            return SplitOutput::default();
        }

        let chunk_size = chunk_size.max(1);
        let overlap = overlap.min(chunk_size - 1);

        let mut chunks = Vec::new();
        let mut current: Vec<&str> = Vec::with_capacity(chunk_size);

        for unit in self.units(text) {
            if current.len() >= chunk_size {
                chunks.push(self.join(&current));
                current.drain(..current.len() - overlap);
            }
            current.push(unit);
        }

        if !current.is_empty() {
            chunks.push(self.join(&current));
        }
        chunks.retain(|chunk| !chunk.is_empty());

        SplitOutput { chunks, tokens: None }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn per_character_chunks() {
        let output = CharacterSplitter::new().split("abcdefg", 3, 0);
        assert_eq!(output.chunks, vec!["abc", "def", "g"]);
        assert!(output.tokens.is_none());
    }

    #[test]
    fn overlap_carries_trailing_units_forward() {
        let output = CharacterSplitter::with_separator(" ").split("a b c d e", 3, 1);
        assert_eq!(output.chunks, vec!["a b c", "c d e"]);
    }

    #[test]
    fn overlap_is_capped_below_chunk_size() {
        let output = CharacterSplitter::with_separator(" ").split("a b c d", 2, 5);
        assert_eq!(output.chunks, vec!["a b", "b c", "c d"]);
    }

    #[test]
    fn chunks_are_trimmed() {
        let output = CharacterSplitter::new().split("ab  cd", 3, 0);
        assert_eq!(output.chunks, vec!["ab", "cd"]);
    }

    #[test]
    fn multibyte_characters_are_single_units() {
        let output = CharacterSplitter::new().split("héllo", 2, 0);
        assert_eq!(output.chunks, vec!["hé", "ll", "o"]);
    }

    #[test]
    fn blank_text_yields_nothing() {
        assert!(CharacterSplitter::new().split("", 10, 0).is_empty());
        assert!(CharacterSplitter::with_separator(" ").split(" \n\t", 10, 0).is_empty());
    }
}
