//! `/generate` query parameters.

use parley_chat::TurnRequest;
use parley_engine::SamplingParams;
use serde::Deserialize;

use super::{parse_flag, parse_optional, parse_value, present, required};
use crate::error::ServerError;

#[derive(Debug, Default, Deserialize)]
pub struct GenerateQuery {
    pub query: Option<String>,
    pub token: Option<String>,
    pub model_id: Option<String>,
    pub max_length: Option<String>,
    pub do_sample: Option<String>,
    pub top_k: Option<String>,
    pub top_p: Option<String>,
    pub temperature: Option<String>,
    pub repetition_penalty: Option<String>,
}

impl GenerateQuery {
    /// Absent sampling fields take their defaults; range checks happen later
    /// in [`SamplingParams::validate`].
    pub fn into_turn(self) -> Result<TurnRequest, ServerError> {
        // An empty query is still a turn; only an absent one is rejected.
        let query = present("query", self.query)?;
        let model_id = parse_value("model_id", &required("model_id", self.model_id)?)?;

        let defaults = SamplingParams::default();
        let params = SamplingParams {
            max_length: parse_optional("max_length", self.max_length)?
                .unwrap_or(defaults.max_length),
            do_sample: match self.do_sample {
                Some(raw) => parse_flag("do_sample", &raw)?,
                None => defaults.do_sample,
            },
            top_k: parse_optional("top_k", self.top_k)?.unwrap_or(defaults.top_k),
            top_p: parse_optional("top_p", self.top_p)?.unwrap_or(defaults.top_p),
            temperature: parse_optional("temperature", self.temperature)?
                .unwrap_or(defaults.temperature),
            repetition_penalty: parse_optional("repetition_penalty", self.repetition_penalty)?
                .unwrap_or(defaults.repetition_penalty),
        };

        Ok(TurnRequest {
            model_id,
            token: self.token.filter(|t| !t.is_empty()),
            query,
            params,
        })
    }
}
