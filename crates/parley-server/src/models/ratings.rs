//! Rating request and response types.

use std::collections::BTreeMap;

use parley_engine::ModelId;
use parley_store::RatingRecord;
use serde::{Deserialize, Serialize};

use super::{parse_value, present, required};
use crate::error::ServerError;

#[derive(Debug, Default, Deserialize)]
pub struct SubmitRatingQuery {
    pub conversation: Option<String>,
    pub rating: Option<String>,
    pub model_id: Option<String>,
}

/// A validated rating submission.
#[derive(Debug, Clone, PartialEq)]
pub struct NewRating {
    pub conversation: String,
    pub rating: i64,
    pub model_used: ModelId,
}

impl SubmitRatingQuery {
    pub fn validate(self) -> Result<NewRating, ServerError> {
        let conversation = present("conversation", self.conversation)?;
        let rating = parse_value("rating", &required("rating", self.rating)?)?;
        let model_used = parse_value("model_id", &required("model_id", self.model_id)?)?;
        Ok(NewRating {
            conversation,
            rating,
            model_used,
        })
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct RatingsQuery {
    pub model_id: Option<String>,
}

impl RatingsQuery {
    pub fn model_id(self) -> Result<ModelId, ServerError> {
        parse_value("model_id", &required("model_id", self.model_id)?)
    }
}

#[derive(Debug, Serialize)]
pub struct SuccessResponse {
    pub success: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct RatingView {
    pub conversation: String,
    pub rating: i64,
    pub model_used: ModelId,
}

/// Ratings keyed by row id.
#[derive(Debug, Serialize)]
pub struct RatingsResponse {
    pub ratings: BTreeMap<i64, RatingView>,
}

impl From<Vec<RatingRecord>> for RatingsResponse {
    fn from(records: Vec<RatingRecord>) -> Self {
        let ratings = records
            .into_iter()
            .map(|r| {
                (
                    r.id,
                    RatingView {
                        conversation: r.conversation,
                        rating: r.rating,
                        model_used: r.model_used,
                    },
                )
            })
            .collect();
        Self { ratings }
    }
}
