//! Model listing and health response types.

use std::collections::BTreeMap;

use parley_engine::ModelId;
use serde::Serialize;

/// Model id → display name.
#[derive(Debug, Serialize)]
pub struct ModelsResponse {
    pub models: BTreeMap<ModelId, String>,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub models: usize,
    /// Conversations whose token is still valid.
    pub sessions: usize,
    pub database: &'static str,
}
