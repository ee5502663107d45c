//! Tiny deterministic chat model.
//!
//! There are no real weights: each step's logits come from a seeded hash of
//! (previous token, candidate token), so output depends only on the seed, the
//! prompt and the sampling parameters. Good enough to exercise the whole
//! serving path without loading a checkpoint.
//!
//! The vocabulary is frozen at construction. Unknown query words encode as
//! `<unk>`, which is never generated, so one conversation's words cannot
//! surface in another's reply and per-step cost stays fixed.

use parley_engine::{ChatModel, EngineError, Result, SamplingParams, Segment};
use parley_sampling::Sampler;
use parley_tokenizer::{Tokenizer, WhitespaceTokenizer};

/// Default cap on new tokens per generation, on top of `max_length`.
pub const DEFAULT_MAX_NEW_TOKENS: usize = 48;

/// End-of-sequence logit bias added per generated token.
const EOS_RAMP: f32 = 0.25;

pub struct TinyChatModel {
    tokenizer: WhitespaceTokenizer,
    vocab_size: usize,
    unk: Option<i32>,
    seed: u64,
    max_new_tokens: usize,
}

impl TinyChatModel {
    /// Freezes `tokenizer`; its vocabulary is the model's output space.
    pub fn new(tokenizer: WhitespaceTokenizer, seed: u64) -> Self {
        let tokenizer = tokenizer.freeze();
        Self {
            vocab_size: tokenizer.vocab_size(),
            unk: tokenizer.unk_token_id(),
            tokenizer,
            seed,
            max_new_tokens: DEFAULT_MAX_NEW_TOKENS,
        }
    }

    pub fn vocab_size(&self) -> usize {
        self.vocab_size
    }

    pub fn with_max_new_tokens(mut self, n: usize) -> Self {
        self.max_new_tokens = n;
        self
    }

    /// Pseudo-logits for the next token given the last one.
    fn logits(&self, last: i32, generated: usize) -> Vec<f32> {
        let eos = self.tokenizer.eos_token_id();
        (0..self.vocab_size)
            .map(|candidate| {
                if Some(candidate as i32) == self.unk {
                    return f32::NEG_INFINITY;
                }
                let h = mix(self.seed ^ mix(last as u64) ^ (candidate as u64).rotate_left(17));
                // Map the top 24 bits onto [-2, 2).
                let mut logit = ((h >> 40) as f32 / (1u64 << 24) as f32) * 4.0 - 2.0;
                if candidate as i32 == eos {
                    logit += EOS_RAMP * generated as f32;
                }
                logit
            })
            .collect()
    }
}

impl ChatModel for TinyChatModel {
    fn encode(&self, text: &str) -> Result<Segment> {
        let mut tokens = self
            .tokenizer
            .encode(text)
            .map_err(|e| EngineError::Tokenization(e.to_string()))?;
        tokens.push(self.tokenizer.eos_token_id());
        Ok(Segment::new(tokens))
    }

    fn generate(&self, input: &Segment, params: &SamplingParams) -> Result<Segment> {
        let Some(&first) = input.tokens().first() else {
            return Err(EngineError::Generation("empty prompt".to_string()));
        };

        let prompt_seed = input
            .tokens()
            .iter()
            .fold(mix(first as u64), |acc, &t| mix(acc ^ t as u64));
        let mut sampler = Sampler::new()
            .with_sampling(params.do_sample)
            .with_temperature(params.temperature)
            .with_top_k(params.top_k)
            .with_top_p(params.top_p)
            .with_repetition_penalty(params.repetition_penalty)
            .with_seed(self.seed ^ prompt_seed);

        let eos = self.tokenizer.eos_token_id();
        let budget = params
            .max_length
            .saturating_sub(input.len())
            .min(self.max_new_tokens);

        let mut tokens = input.tokens().to_vec();
        let mut history: Vec<usize> = tokens.iter().filter_map(|&t| usize::try_from(t).ok()).collect();

        for generated in 0..budget {
            let last = *tokens.last().unwrap_or(&eos);
            let logits = self.logits(last, generated);
            let next = sampler
                .sample_with_history(&logits, &history)
                .map_err(|e| EngineError::Generation(e.to_string()))?;
            tokens.push(next as i32);
            history.push(next);
            if next as i32 == eos {
                break;
            }
        }

        Ok(Segment::new(tokens))
    }

    fn decode(&self, segment: &Segment) -> Result<String> {
        self.tokenizer
            .decode(segment.tokens())
            .map_err(|e| EngineError::Tokenization(e.to_string()))
    }
}

/// splitmix64 finalizer.
pub(crate) fn mix(mut x: u64) -> u64 {
    x = x.wrapping_add(0x9E37_79B9_7F4A_7C15);
    x = (x ^ (x >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    x = (x ^ (x >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    x ^ (x >> 31)
}
