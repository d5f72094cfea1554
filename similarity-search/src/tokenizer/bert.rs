use std::sync::Arc;

use tracing::warn;

use super::Tokenizer;
use super::basic::BasicTokenizer;
use super::vocab::{CLS_TOKEN, SEP_TOKEN, Vocabulary};
use super::wordpiece::WordpieceTokenizer;
use crate::error::{Result, SearchError};

/// Fixed model input width, including the `[CLS]` and `[SEP]` markers.
pub const MAX_SEQUENCE_LEN: usize = 512;

/// Fixed-width arrays fed to a BERT-style encoder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelInputs {
    pub input_ids: Vec<i64>,
    /// 1 for real tokens, 0 for padding.
    pub attention_mask: Vec<i64>,
    /// Segment ids; only filled by [`BertTokenizer::build_model_inputs_with_type_ids`].
    pub token_type_ids: Option<Vec<i64>>,
}

/// WordPiece tokenizer over a BERT vocabulary.
///
/// # Example
///
/// ```rust,ignore
/// use similarity_search::{BertTokenizer, Tokenizer};
///
/// let tokenizer = BertTokenizer::bundled()?;
/// assert_eq!(tokenizer.tokenize("Searching!"), ["search", "##ing", "!"]);
/// ```
#[derive(Debug, Clone)]
pub struct BertTokenizer {
    basic: BasicTokenizer,
    wordpiece: WordpieceTokenizer,
    vocab: Arc<Vocabulary>,
}

impl BertTokenizer {
    pub fn new(vocab: Vocabulary) -> Self {
        let vocab = Arc::new(vocab);
        Self {
            basic: BasicTokenizer::new(),
            wordpiece: WordpieceTokenizer::new(Arc::clone(&vocab)),
            vocab,
        }
    }

    /// Tokenizer over the vocabulary bundled with the crate.
    pub fn bundled() -> Result<Self> {
        Ok(Self::new(Vocabulary::bundled()?))
    }

    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocab
    }

    /// Map tokens to vocabulary ids.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Vocabulary`] for a token the vocabulary does
    /// not contain. Tokens produced by [`tokenize`](Tokenizer::tokenize)
    /// always resolve, so this signals an inconsistent vocabulary.
    pub fn convert_tokens_to_ids(&self, tokens: &[String]) -> Result<Vec<u32>> {
        tokens.iter().map(|token| self.token_to_id(token)).collect()
    }

    /// Map vocabulary ids back to tokens.
    pub fn ids_to_tokens(&self, ids: &[u32]) -> Result<Vec<String>> {
        ids.iter()
            .map(|&id| {
                self.vocab
                    .token(id)
                    .map(str::to_string)
                    .ok_or_else(|| SearchError::Vocabulary(format!("no token with id {id}")))
            })
            .collect()
    }

    fn token_to_id(&self, token: &str) -> Result<u32> {
        self.vocab
            .id(token)
            .ok_or_else(|| SearchError::Vocabulary(format!("token '{token}' is not in the vocabulary")))
    }

    /// Build `[CLS] tokens [SEP]` zero-padded to [`MAX_SEQUENCE_LEN`] ids.
    ///
    /// Sentences with more than `MAX_SEQUENCE_LEN - 2` tokens are truncated.
    pub fn build_model_tokens(&self, sentence: &str) -> Result<Vec<u32>> {
        let mut ids = self.convert_tokens_to_ids(&self.tokenize(sentence))?;
        let budget = MAX_SEQUENCE_LEN - 2;

        if ids.len() > budget {
            warn!(
                tokens = ids.len() + 2,
                max = MAX_SEQUENCE_LEN,
                "input sentence is too long, truncating"
            );
            ids.truncate(budget);
        }

        let mut model_tokens = Vec::with_capacity(MAX_SEQUENCE_LEN);
        model_tokens.push(self.token_to_id(CLS_TOKEN)?);
        model_tokens.extend(ids);
        model_tokens.push(self.token_to_id(SEP_TOKEN)?);
        model_tokens.resize(MAX_SEQUENCE_LEN, 0);
        Ok(model_tokens)
    }

    /// Input ids plus an attention mask that zeroes out padding.
    pub fn build_model_inputs(&self, model_tokens: &[u32]) -> ModelInputs {
        ModelInputs {
            input_ids: model_tokens.iter().map(|&id| i64::from(id)).collect(),
            attention_mask: model_tokens.iter().map(|&id| i64::from(id != 0)).collect(),
            token_type_ids: None,
        }
    }

    /// Like [`build_model_inputs`](Self::build_model_inputs), with segment
    /// ids that switch from 0 to 1 at the first `[SEP]` and stay there.
    pub fn build_model_inputs_with_type_ids(&self, model_tokens: &[u32]) -> Result<ModelInputs> {
        let sep = self.token_to_id(SEP_TOKEN)?;
        let mut seen_sep = false;
        let type_ids = model_tokens
            .iter()
            .map(|&id| {
                seen_sep |= id == sep;
                i64::from(seen_sep)
            })
            .collect();

        let mut inputs = self.build_model_inputs(model_tokens);
        inputs.token_type_ids = Some(type_ids);
        Ok(inputs)
    }
}

impl Tokenizer for BertTokenizer {
    fn tokenize(&self, text: &str) -> Vec<String> {
        self.basic
            .tokenize(text)
            .iter()
            .flat_map(|word| self.wordpiece.tokenize(word))
            .collect()
    }

    /// Merges `##` continuations into their words and joins words with
    /// single spaces. Lossy.
    fn detokenize(&self, tokens: &[String]) -> String {
        let mut words: Vec<String> = Vec::new();
        let mut current = String::new();

        for token in tokens {
            if let Some(rest) = token.strip_prefix("##") {
                current.push_str(rest);
            } else {
                if !current.is_empty() {
                    words.push(std::mem::take(&mut current));
                }
                current.push_str(token);
            }
        }
        if !current.is_empty() {
            words.push(current);
        }

        words.join(" ")
    }
}
