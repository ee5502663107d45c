//! # parley-sampling
//!
//! Next-token selection for parley models.
//!
//! A [`Sampler`] runs a fixed pipeline over one step's logits:
//!
//! 1. repetition penalty over the token history
//! 2. greedy short-circuit (argmax) when sampling is off
//! 3. temperature scaling
//! 4. top-k filtering
//! 5. softmax
//! 6. top-p (nucleus) filtering
//! 7. a draw from a seeded RNG, so runs are reproducible
//!
//! The filter stages are exposed as free functions for direct testing.

use std::cmp::Ordering;

/// Sampling error type.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SamplingError {
    #[error("Invalid logits array")]
    InvalidLogits,
    #[error("Temperature must be > 0")]
    InvalidTemperature,
    #[error("No valid tokens after filtering")]
    NoValidTokens,
}

pub type SamplingResult<T> = std::result::Result<T, SamplingError>;

/// Deterministic xorshift64 RNG.
#[derive(Debug, Clone)]
pub struct SeededRng {
    state: u64,
}

impl SeededRng {
    pub fn new(seed: u64) -> Self {
        // A zero state would stay zero forever.
        Self {
            state: if seed == 0 { 0x9E37_79B9_7F4A_7C15 } else { seed },
        }
    }

    /// Next float in [0, 1).
    pub fn next_f32(&mut self) -> f32 {
        self.state ^= self.state << 13;
        self.state ^= self.state >> 7;
        self.state ^= self.state << 17;
        (self.state >> 40) as f32 / (1u64 << 24) as f32
    }
}

/// Configured sampling strategy plus its RNG state.
#[derive(Debug, Clone)]
pub struct Sampler {
    /// When false every step takes the argmax (after repetition penalty).
    pub do_sample: bool,
    pub temperature: f32,
    /// `None` or `Some(0)` disables top-k.
    pub top_k: Option<usize>,
    pub top_p: Option<f32>,
    pub repetition_penalty: Option<f32>,
    rng: SeededRng,
}

impl Sampler {
    /// Stochastic sampler at temperature 1.0 with no filters.
    pub fn new() -> Self {
        Self {
            do_sample: true,
            temperature: 1.0,
            top_k: None,
            top_p: None,
            repetition_penalty: None,
            rng: SeededRng::new(42),
        }
    }

    /// Argmax sampler.
    pub fn greedy() -> Self {
        Self {
            do_sample: false,
            ..Self::new()
        }
    }

    pub fn with_sampling(mut self, do_sample: bool) -> Self {
        self.do_sample = do_sample;
        self
    }

    pub fn with_temperature(mut self, temp: f32) -> Self {
        self.temperature = temp;
        self
    }

    pub fn with_top_k(mut self, k: usize) -> Self {
        self.top_k = Some(k);
        self
    }

    pub fn with_top_p(mut self, p: f32) -> Self {
        self.top_p = Some(p);
        self
    }

    pub fn with_repetition_penalty(mut self, penalty: f32) -> Self {
        self.repetition_penalty = Some(penalty);
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = SeededRng::new(seed);
        self
    }

    /// Pick a token index from `logits` with no history.
    pub fn sample(&mut self, logits: &[f32]) -> SamplingResult<usize> {
        self.sample_with_history(logits, &[])
    }

    /// Pick a token index, penalizing indices that appear in `history`.
    pub fn sample_with_history(
        &mut self,
        logits: &[f32],
        history: &[usize],
    ) -> SamplingResult<usize> {
        if logits.is_empty() || logits.iter().any(|l| l.is_nan()) {
            return Err(SamplingError::InvalidLogits);
        }
        if !(self.temperature > 0.0) {
            return Err(SamplingError::InvalidTemperature);
        }

        let mut work = logits.to_vec();
        if let Some(penalty) = self.repetition_penalty {
            apply_repetition_penalty(&mut work, history, penalty);
        }

        if !self.do_sample {
            return argmax(&work).ok_or(SamplingError::NoValidTokens);
        }

        if (self.temperature - 1.0).abs() > f32::EPSILON {
            for logit in &mut work {
                *logit /= self.temperature;
            }
        }
        if let Some(k) = self.top_k {
            apply_top_k(&mut work, k);
        }

        let mut probs = softmax(&work);
        if let Some(p) = self.top_p {
            apply_top_p(&mut probs, p);
        }

        self.draw(&probs)
    }

    fn draw(&mut self, probs: &[f32]) -> SamplingResult<usize> {
        let r = self.rng.next_f32();
        let mut cumsum = 0.0;
        for (i, &prob) in probs.iter().enumerate() {
            cumsum += prob;
            if r < cumsum {
                return Ok(i);
            }
        }

        // Rounding left r above the final cumulative sum.
        probs
            .iter()
            .rposition(|&p| p > 0.0)
            .ok_or(SamplingError::NoValidTokens)
    }
}

impl Default for Sampler {
    fn default() -> Self {
        Self::new()
    }
}

/// Make tokens already seen less likely, whatever the sign of their logit.
pub fn apply_repetition_penalty(logits: &mut [f32], history: &[usize], penalty: f32) {
    for &token in history {
        if let Some(logit) = logits.get_mut(token) {
            if *logit > 0.0 {
                *logit /= penalty;
            } else {
                *logit *= penalty;
            }
        }
    }
}

/// Keep the `k` largest logits (ties at the boundary survive); mask the rest.
pub fn apply_top_k(logits: &mut [f32], k: usize) {
    if k == 0 || k >= logits.len() {
        return;
    }
    let mut sorted = logits.to_vec();
    sorted.sort_by(|a, b| b.partial_cmp(a).unwrap_or(Ordering::Equal));
    let threshold = sorted[k - 1];
    for logit in logits.iter_mut() {
        if *logit < threshold {
            *logit = f32::NEG_INFINITY;
        }
    }
}

/// Numerically stable softmax. Falls back to uniform if everything is masked.
pub fn softmax(logits: &[f32]) -> Vec<f32> {
    let max = logits.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    if !max.is_finite() {
        return vec![1.0 / logits.len() as f32; logits.len()];
    }
    let exps: Vec<f32> = logits.iter().map(|&l| (l - max).exp()).collect();
    let sum: f32 = exps.iter().sum();
    exps.into_iter().map(|e| e / sum).collect()
}

/// Zero every probability outside the smallest prefix (by descending
/// probability) whose mass reaches `p`, then renormalize.
pub fn apply_top_p(probs: &mut [f32], p: f32) {
    if p >= 1.0 || probs.is_empty() {
        return;
    }
    let mut sorted = probs.to_vec();
    sorted.sort_by(|a, b| b.partial_cmp(a).unwrap_or(Ordering::Equal));

    let mut cumsum = 0.0;
    let mut cutoff = sorted[0];
    for &prob in &sorted {
        cumsum += prob;
        cutoff = prob;
        if cumsum >= p {
            break;
        }
    }

    for prob in probs.iter_mut() {
        if *prob < cutoff {
            *prob = 0.0;
        }
    }
    let sum: f32 = probs.iter().sum();
    if sum > 0.0 {
        for prob in probs.iter_mut() {
            *prob /= sum;
        }
    }
}

/// Index of the largest value; `None` for an empty slice.
pub fn argmax(values: &[f32]) -> Option<usize> {
    values
        .iter()
        .enumerate()
        .max_by(|a, b| a.1.partial_cmp(b.1).unwrap_or(Ordering::Equal))
        .map(|(idx, _)| idx)
}
