//! HTTP error handling and response mapping.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use parley_chat::ChatError;
use parley_store::StoreError;
use serde_json::json;

#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("{0} parameter is required")]
    MissingParameter(&'static str),

    #[error("invalid parameter: {0}")]
    InvalidParams(String),

    #[error(transparent)]
    Chat(#[from] ChatError),

    #[error("could not access the database: {0}")]
    Store(#[from] StoreError),
}

impl ServerError {
    pub fn status(&self) -> StatusCode {
        match self {
            ServerError::MissingParameter(_) | ServerError::InvalidParams(_) => {
                StatusCode::BAD_REQUEST
            }
            ServerError::Chat(ChatError::ModelNotFound(_)) => StatusCode::NOT_FOUND,
            ServerError::Chat(ChatError::InvalidParams(_)) => StatusCode::BAD_REQUEST,
            ServerError::Chat(ChatError::Generation(_)) => StatusCode::INTERNAL_SERVER_ERROR,
            ServerError::Store(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        } else {
            tracing::debug!(error = %self, "request rejected");
        }

        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
