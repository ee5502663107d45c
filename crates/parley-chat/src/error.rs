//! Error types for turn orchestration.

use parley_engine::{EngineError, ModelId};

pub type Result<T> = std::result::Result<T, ChatError>;

#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    #[error("Model {0} does not exist")]
    ModelNotFound(ModelId),

    #[error("Invalid parameters: {0}")]
    InvalidParams(String),

    #[error("Generation failed: {0}")]
    Generation(String),
}

impl From<EngineError> for ChatError {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::InvalidParams(msg) => ChatError::InvalidParams(msg),
            other => ChatError::Generation(other.to_string()),
        }
    }
}
