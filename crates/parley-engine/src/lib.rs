//! # parley-engine
//!
//! The "narrow waist" of the parley stack. Defines the [`ChatModel`] capability
//! and the value types every other crate speaks: [`Segment`], [`SamplingParams`]
//! and the read-only [`ModelRegistry`]. Conversation state never reaches a model;
//! a model only ever sees segments in and segments out.
//!
//! ## Design Notes
//!
//! ### Shared access
//! `ChatModel` methods take `&self` so one loaded model can serve every session
//! concurrently. Implementations that keep mutable state (a growing vocabulary,
//! a cache) are responsible for their own interior synchronization.
//!
//! ### Token Type
//! `TokenId` is aliased as `i32`, matching the tokenizer and sampling crates.

pub mod params;
pub mod registry;

pub use params::SamplingParams;
pub use registry::{ModelEntry, ModelId, ModelLoader, ModelRecord, ModelRegistry, RegistryBuilder};

pub type Result<T> = std::result::Result<T, EngineError>;

/// Token ID type (i32 to line up with the tokenizer; logically non-negative).
pub type TokenId = i32;

/// Top-level error type for all model operations.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("Model loading failed: {0}")]
    ModelLoad(String),
    #[error("Tokenization failed: {0}")]
    Tokenization(String),
    #[error("Generation failed: {0}")]
    Generation(String),
    #[error("Invalid sampling parameters: {0}")]
    InvalidParams(String),
}

/// An ordered run of token IDs encoding one chat turn (or several, once joined).
///
/// Segments are produced and consumed by a [`ChatModel`]; everything above the
/// model treats them as opaque apart from their length.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Segment {
    tokens: Vec<TokenId>,
}

impl Segment {
    pub fn new(tokens: Vec<TokenId>) -> Self {
        Self { tokens }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    /// Join segments end to end, preserving order.
    pub fn concat<'a, I>(segments: I) -> Self
    where
        I: IntoIterator<Item = &'a Segment>,
    {
        let tokens = segments
            .into_iter()
            .flat_map(|s| s.tokens.iter().copied())
            .collect();
        Self { tokens }
    }

    /// Everything after the first `offset` positions.
    ///
    /// Used to strip an echoed prompt off a raw generation. An offset past the
    /// end yields an empty segment.
    pub fn suffix_from(&self, offset: usize) -> Self {
        let start = offset.min(self.tokens.len());
        Self {
            tokens: self.tokens[start..].to_vec(),
        }
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn tokens(&self) -> &[TokenId] {
        &self.tokens
    }

    pub fn into_tokens(self) -> Vec<TokenId> {
        self.tokens
    }
}

impl From<Vec<TokenId>> for Segment {
    fn from(tokens: Vec<TokenId>) -> Self {
        Self::new(tokens)
    }
}

/// The model capability: the only thing the orchestration core knows about a model.
///
/// `generate` may return the prompt echoed back ahead of the new tokens (as
/// causal decoders commonly do); callers are expected to trim it.
pub trait ChatModel: Send + Sync {
    /// Convert one turn of text into a segment.
    fn encode(&self, text: &str) -> Result<Segment>;

    /// Run generation over `input` with the given sampling parameters.
    fn generate(&self, input: &Segment, params: &SamplingParams) -> Result<Segment>;

    /// Convert a segment back into text, skipping special tokens.
    fn decode(&self, segment: &Segment) -> Result<String>;
}
