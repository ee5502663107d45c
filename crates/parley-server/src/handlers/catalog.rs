//! Model listing handler.

use axum::{extract::State, Json};

use crate::{models::ModelsResponse, state::AppState};

pub async fn handle_get_models(State(state): State<AppState>) -> Json<ModelsResponse> {
    Json(ModelsResponse {
        models: state.chat.list_models(),
    })
}
