//! Per-request sampling parameters.

use serde::{Deserialize, Serialize};

use crate::{EngineError, Result};

/// Sampling knobs handed to [`ChatModel::generate`](crate::ChatModel::generate).
///
/// `max_length` bounds the total output length, prompt included.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SamplingParams {
    pub max_length: usize,
    pub do_sample: bool,
    pub top_k: usize,
    pub top_p: f32,
    pub temperature: f32,
    pub repetition_penalty: f32,
}

impl Default for SamplingParams {
    fn default() -> Self {
        Self {
            max_length: 1000,
            do_sample: false,
            top_k: 50,
            top_p: 1.0,
            temperature: 1.0,
            repetition_penalty: 1.0,
        }
    }
}

impl SamplingParams {
    /// Check every value against its domain.
    ///
    /// A model never sees parameters that fail this check.
    pub fn validate(&self) -> Result<()> {
        if self.max_length == 0 {
            return Err(EngineError::InvalidParams(
                "max_length must be greater than 0".to_string(),
            ));
        }
        if !(self.top_p.is_finite() && self.top_p > 0.0 && self.top_p <= 1.0) {
            return Err(EngineError::InvalidParams(format!(
                "top_p must be in (0, 1], got {}",
                self.top_p
            )));
        }
        if !(self.temperature.is_finite() && self.temperature > 0.0) {
            return Err(EngineError::InvalidParams(format!(
                "temperature must be positive, got {}",
                self.temperature
            )));
        }
        if !(self.repetition_penalty.is_finite() && self.repetition_penalty > 0.0) {
            return Err(EngineError::InvalidParams(format!(
                "repetition_penalty must be positive, got {}",
                self.repetition_penalty
            )));
        }
        Ok(())
    }
}
