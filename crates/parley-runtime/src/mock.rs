//! Mock chat model with predictable output.

use std::sync::atomic::{AtomicUsize, Ordering};

use parley_engine::{ChatModel, EngineError, Result, SamplingParams, Segment};
use parley_tokenizer::{Tokenizer, WhitespaceTokenizer};

/// Replies `"<name> heard <n> tokens"`, where `n` is the length of the
/// generation input.
///
/// Like a causal decoder, `generate` returns the prompt followed by the reply,
/// and the whole output is capped at `max_length` tokens. Every encoded turn
/// ends with the end-of-sequence token.
pub struct MockModel {
    name: String,
    tokenizer: WhitespaceTokenizer,
    generate_calls: AtomicUsize,
}

impl MockModel {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            tokenizer: WhitespaceTokenizer::new(),
            generate_calls: AtomicUsize::new(0),
        }
    }

    /// How many times `generate` ran.
    pub fn generate_calls(&self) -> usize {
        self.generate_calls.load(Ordering::SeqCst)
    }

    fn tokenize_turn(&self, text: &str) -> Result<Vec<i32>> {
        let mut tokens = self
            .tokenizer
            .encode(text)
            .map_err(|e| EngineError::Tokenization(e.to_string()))?;
        tokens.push(self.tokenizer.eos_token_id());
        Ok(tokens)
    }
}

impl ChatModel for MockModel {
    fn encode(&self, text: &str) -> Result<Segment> {
        self.tokenize_turn(text).map(Segment::new)
    }

    fn generate(&self, input: &Segment, params: &SamplingParams) -> Result<Segment> {
        self.generate_calls.fetch_add(1, Ordering::SeqCst);
        if input.is_empty() {
            return Err(EngineError::Generation("empty prompt".to_string()));
        }

        let reply = self.tokenize_turn(&format!("{} heard {} tokens", self.name, input.len()))?;
        let mut output = input.tokens().to_vec();
        output.extend(reply);
        output.truncate(params.max_length.max(input.len()));
        Ok(Segment::new(output))
    }

    fn decode(&self, segment: &Segment) -> Result<String> {
        self.tokenizer
            .decode(segment.tokens())
            .map_err(|e| EngineError::Tokenization(e.to_string()))
    }
}
