//! Token ↔ id table in the BERT `vocab.txt` format.

use std::collections::HashMap;
use std::path::Path;

use crate::error::{Result, SearchError};

pub const PAD_TOKEN: &str = "[PAD]";
pub const UNK_TOKEN: &str = "[UNK]";
pub const CLS_TOKEN: &str = "[CLS]";
pub const SEP_TOKEN: &str = "[SEP]";
pub const MASK_TOKEN: &str = "[MASK]";

/// Tokens that the basic tokenizer never splits.
pub(crate) const SPECIAL_TOKENS: [&str; 5] =
    [UNK_TOKEN, SEP_TOKEN, PAD_TOKEN, CLS_TOKEN, MASK_TOKEN];

const BUNDLED_VOCAB: &str = include_str!("../../resources/vocab.txt");

/// A vocabulary where line `n` of the source file holds the token with id `n`.
#[derive(Debug, Clone)]
pub struct Vocabulary {
    token_to_id: HashMap<String, u32>,
    id_to_token: Vec<String>,
}

impl Vocabulary {
    /// Load the vocabulary shipped with this crate.
    pub fn bundled() -> Result<Self> {
        Self::from_lines(BUNDLED_VOCAB)
    }

    /// Load a `vocab.txt` file from disk.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_lines(&contents)
    }

    /// Parse one token per line. Every special token must be present.
    pub fn from_lines(contents: &str) -> Result<Self> {
        let mut token_to_id = HashMap::new();
        let mut id_to_token = Vec::new();

        for line in contents.lines() {
            let token = line.trim_end_matches('\r');
            if token.is_empty() {
                continue;
            }
            let id = u32::try_from(id_to_token.len())
                .map_err(|_| SearchError::Vocabulary("vocabulary exceeds u32 ids".into()))?;
            token_to_id.entry(token.to_string()).or_insert(id);
            id_to_token.push(token.to_string());
        }

        for special in SPECIAL_TOKENS {
            if !token_to_id.contains_key(special) {
                return Err(SearchError::Vocabulary(format!(
                    "vocabulary is missing special token {special}"
                )));
            }
        }

        Ok(Self { token_to_id, id_to_token })
    }

    /// Look up the id of `token`.
    pub fn id(&self, token: &str) -> Option<u32> {
        self.token_to_id.get(token).copied()
    }

    /// Look up the token with id `id`.
    pub fn token(&self, id: u32) -> Option<&str> {
        self.id_to_token.get(id as usize).map(String::as_str)
    }

    pub fn contains(&self, token: &str) -> bool {
        self.token_to_id.contains_key(token)
    }

    pub fn len(&self) -> usize {
        self.id_to_token.len()
    }

    pub fn is_empty(&self) -> bool {
        self.id_to_token.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bundled_uses_bert_id_layout() {
        let vocab = Vocabulary::bundled().unwrap();
        assert_eq!(vocab.id(PAD_TOKEN), Some(0));
        assert_eq!(vocab.id(UNK_TOKEN), Some(100));
        assert_eq!(vocab.id(CLS_TOKEN), Some(101));
        assert_eq!(vocab.id(SEP_TOKEN), Some(102));
        assert_eq!(vocab.id(MASK_TOKEN), Some(103));
        assert_eq!(vocab.token(101), Some(CLS_TOKEN));
        assert!(vocab.contains("##ing"));
    }

    #[test]
    fn missing_special_token_is_rejected() {
        let err = Vocabulary::from_lines("[PAD]\n[UNK]\nhello\n").unwrap_err();
        assert!(err.is_fatal());
        assert!(err.to_string().contains("[SEP]"));
    }

    #[test]
    fn from_file_reads_one_token_per_line() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vocab.txt");
        std::fs::write(&path, "[PAD]\r\n[UNK]\r\n[CLS]\r\n[SEP]\r\n[MASK]\r\nrust\r\n").unwrap();

        let vocab = Vocabulary::from_file(&path).unwrap();
        assert_eq!(vocab.len(), 6);
        assert_eq!(vocab.id("rust"), Some(5));
    }
}
