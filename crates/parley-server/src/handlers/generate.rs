//! Conversational turn handler.

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    Json,
};
use parley_chat::TurnReply;

use crate::{error::ServerError, models::GenerateQuery, state::AppState};

/// Run one turn. A request without a live `token` starts a new conversation
/// and the reply carries the token to use next time.
pub async fn handle_generate(
    State(state): State<AppState>,
    query: Result<Query<GenerateQuery>, QueryRejection>,
) -> Result<Json<TurnReply>, ServerError> {
    let Query(query) = query.map_err(|e| ServerError::InvalidParams(e.body_text()))?;
    let turn = query.into_turn()?;
    let reply = state.chat.converse(turn).await?;
    Ok(Json(reply))
}
