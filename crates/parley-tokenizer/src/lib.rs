//! # parley-tokenizer
//!
//! Deterministic word-level tokenization for parley models.
//!
//! This crate provides:
//! - A `Tokenizer` trait for pluggable tokenization backends
//! - A whitespace tokenizer with a seed vocabulary and an end-of-sequence token
//! - Vocabulary loading from a plain-text file (one token per line)
//! - Freezing, after which unknown words map to [`UNK_TOKEN`] instead of growing
//!   the vocabulary

use std::collections::HashMap;
use std::path::Path;
use std::sync::RwLock;

/// Text of the end-of-sequence special token.
pub const EOS_TOKEN: &str = "<|endoftext|>";

/// Text of the unknown-word token used by a frozen tokenizer.
pub const UNK_TOKEN: &str = "<unk>";

/// Error type for tokenization operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TokenizerError {
    #[error("Invalid token ID: {0}")]
    InvalidToken(i32),
    #[error("Encoding error: {0}")]
    EncodingError(String),
    #[error("Decoding error: {0}")]
    DecodingError(String),
    #[error("Vocabulary error: {0}")]
    Vocabulary(String),
}

pub type TokenizerResult<T> = std::result::Result<T, TokenizerError>;

/// Core tokenizer trait. Implementations can be swapped without changing app code.
pub trait Tokenizer: Send + Sync {
    /// Encode text into a sequence of token IDs.
    fn encode(&self, text: &str) -> TokenizerResult<Vec<i32>>;

    /// Decode tokens into text. Special tokens are skipped.
    fn decode(&self, tokens: &[i32]) -> TokenizerResult<String>;

    /// ID of the end-of-sequence token.
    fn eos_token_id(&self) -> i32;

    /// Get vocabulary size, special tokens included.
    fn vocab_size(&self) -> usize;
}

/// Whitespace tokenizer.
///
/// - Splits on whitespace
/// - ID 0 is always [`EOS_TOKEN`]
/// - Words missing from the vocabulary are appended on first sight, so encoding
///   never fails and decoding of anything it encoded always succeeds
/// - After [`freeze`](Self::freeze) the vocabulary is fixed and unknown words
///   encode as [`UNK_TOKEN`]
pub struct WhitespaceTokenizer {
    state: RwLock<VocabState>,
}

#[derive(Debug, Default)]
struct VocabState {
    vocab: Vec<String>,
    reverse_vocab: HashMap<String, i32>,
    /// Set once frozen.
    unk: Option<i32>,
}

impl VocabState {
    fn intern(&mut self, word: &str) -> i32 {
        if let Some(&id) = self.reverse_vocab.get(word) {
            return id;
        }
        let id = self.vocab.len() as i32;
        self.vocab.push(word.to_string());
        self.reverse_vocab.insert(word.to_string(), id);
        id
    }
}

impl WhitespaceTokenizer {
    pub fn new() -> Self {
        Self::with_vocabulary(std::iter::empty::<&str>())
    }

    /// Seed the vocabulary in order; duplicates keep their first ID.
    pub fn with_vocabulary<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut state = VocabState::default();
        state.intern(EOS_TOKEN);
        for word in words {
            let word = word.as_ref().trim();
            if !word.is_empty() {
                state.intern(word);
            }
        }
        Self {
            state: RwLock::new(state),
        }
    }

    /// Fix the vocabulary. `UNK_TOKEN` is added if missing and every later
    /// unknown word encodes to it.
    pub fn freeze(self) -> Self {
        let mut state = self
            .state
            .into_inner()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if state.unk.is_none() {
            let unk = state.intern(UNK_TOKEN);
            state.unk = Some(unk);
        }
        Self {
            state: RwLock::new(state),
        }
    }

    /// ID of [`UNK_TOKEN`], or `None` while the vocabulary can still grow.
    pub fn unk_token_id(&self) -> Option<i32> {
        self.state.read().ok().and_then(|s| s.unk)
    }

    pub fn is_frozen(&self) -> bool {
        self.unk_token_id().is_some()
    }

    /// Load a vocabulary file with one token per line. Blank lines are ignored.
    pub fn from_vocab_file(path: &Path) -> TokenizerResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            TokenizerError::Vocabulary(format!("cannot read {}: {e}", path.display()))
        })?;
        let tokenizer = Self::with_vocabulary(contents.lines());
        if tokenizer.vocab_size() <= 1 {
            return Err(TokenizerError::Vocabulary(format!(
                "{} contains no tokens",
                path.display()
            )));
        }
        Ok(tokenizer)
    }
}

impl Default for WhitespaceTokenizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Tokenizer for WhitespaceTokenizer {
    fn encode(&self, text: &str) -> TokenizerResult<Vec<i32>> {
        {
            let state = self
                .state
                .read()
                .map_err(|_| TokenizerError::EncodingError("tokenizer lock poisoned".to_string()))?;
            if let Some(unk) = state.unk {
                return Ok(text
                    .split_whitespace()
                    .map(|word| state.reverse_vocab.get(word).copied().unwrap_or(unk))
                    .collect());
            }
        }

        let mut state = self
            .state
            .write()
            .map_err(|_| TokenizerError::EncodingError("tokenizer lock poisoned".to_string()))?;

        Ok(text.split_whitespace().map(|word| state.intern(word)).collect())
    }

    fn decode(&self, tokens: &[i32]) -> TokenizerResult<String> {
        let state = self
            .state
            .read()
            .map_err(|_| TokenizerError::DecodingError("tokenizer lock poisoned".to_string()))?;

        let eos = self.eos_token_id();
        let mut words = Vec::with_capacity(tokens.len());
        for &id in tokens {
            if id == eos {
                continue;
            }
            let word = usize::try_from(id)
                .ok()
                .and_then(|idx| state.vocab.get(idx))
                .ok_or(TokenizerError::InvalidToken(id))?;
            words.push(word.as_str());
        }
        Ok(words.join(" "))
    }

    fn eos_token_id(&self) -> i32 {
        0
    }

    fn vocab_size(&self) -> usize {
        self.state.read().map(|s| s.vocab.len()).unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_whitespace_simple() {
        let tok = WhitespaceTokenizer::new();
        let ids = tok.encode("hello world").unwrap();
        assert_eq!(ids, vec![1, 2]);
    }

    #[test]
    fn encode_empty_string() {
        let tok = WhitespaceTokenizer::new();
        assert!(tok.encode("").unwrap().is_empty());
    }

    #[test]
    fn eos_is_reserved_and_skipped() {
        let tok = WhitespaceTokenizer::new();
        let mut ids = tok.encode("hi there").unwrap();
        ids.push(tok.eos_token_id());
        assert_eq!(tok.decode(&ids).unwrap(), "hi there");
    }

    #[test]
    fn seeded_vocabulary_keeps_order() {
        let tok = WhitespaceTokenizer::with_vocabulary(["alpha", "beta", "alpha", ""]);
        assert_eq!(tok.vocab_size(), 3);
        assert_eq!(tok.encode("beta alpha").unwrap(), vec![2, 1]);
    }

    #[test]
    fn frozen_vocabulary_does_not_grow() {
        let tok = WhitespaceTokenizer::with_vocabulary(["hello", "world"]).freeze();
        assert!(tok.is_frozen());
        assert_eq!(tok.vocab_size(), 4);
        let unk = tok.unk_token_id().unwrap();

        assert_eq!(tok.encode("hello stranger").unwrap(), vec![1, unk]);
        assert_eq!(tok.vocab_size(), 4);
        assert_eq!(tok.decode(&[1, unk]).unwrap(), "hello <unk>");
    }

    #[test]
    fn freeze_is_idempotent() {
        let tok = WhitespaceTokenizer::with_vocabulary(["a"]).freeze().freeze();
        assert_eq!(tok.vocab_size(), 3);
        assert!(!WhitespaceTokenizer::new().is_frozen());
    }

    #[test]
    fn decode_invalid_token_errors() {
        let tok = WhitespaceTokenizer::new();
        tok.encode("hello").unwrap();
        assert_eq!(
            tok.decode(&[999]).unwrap_err(),
            TokenizerError::InvalidToken(999)
        );
        assert_eq!(
            tok.decode(&[-4]).unwrap_err(),
            TokenizerError::InvalidToken(-4)
        );
    }

    #[test]
    fn vocab_size_reflects_built_vocab() {
        let tok = WhitespaceTokenizer::new();
        assert_eq!(tok.vocab_size(), 1);
        tok.encode("hello world hello").unwrap();
        assert_eq!(tok.vocab_size(), 3);
    }
}
