//! Query-string and JSON body types.
//!
//! Query fields arrive as raw strings so that an absent value and an
//! unparseable one can be reported differently.

pub mod catalog;
pub mod generate;
pub mod ratings;

use std::fmt::Display;
use std::str::FromStr;

use crate::error::ServerError;

pub use catalog::{HealthResponse, ModelsResponse};
pub use generate::GenerateQuery;
pub use ratings::{RatingView, RatingsQuery, RatingsResponse, SubmitRatingQuery, SuccessResponse};

/// A present value, possibly empty, or `MissingParameter`.
pub(crate) fn present(name: &'static str, raw: Option<String>) -> Result<String, ServerError> {
    raw.ok_or(ServerError::MissingParameter(name))
}

/// A present, non-blank value or `MissingParameter`.
pub(crate) fn required(name: &'static str, raw: Option<String>) -> Result<String, ServerError> {
    match raw {
        Some(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(ServerError::MissingParameter(name)),
    }
}

pub(crate) fn parse_value<T>(name: &'static str, raw: &str) -> Result<T, ServerError>
where
    T: FromStr,
    T::Err: Display,
{
    raw.trim()
        .parse()
        .map_err(|e| ServerError::InvalidParams(format!("{name}={raw:?}: {e}")))
}

pub(crate) fn parse_optional<T>(name: &'static str, raw: Option<String>) -> Result<Option<T>, ServerError>
where
    T: FromStr,
    T::Err: Display,
{
    raw.map(|value| parse_value(name, &value)).transpose()
}

/// Accepts the spellings HTML forms and Python clients send.
pub(crate) fn parse_flag(name: &'static str, raw: &str) -> Result<bool, ServerError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" | "" => Ok(false),
        _ => Err(ServerError::InvalidParams(format!(
            "{name}={raw:?}: expected a boolean"
        ))),
    }
}
