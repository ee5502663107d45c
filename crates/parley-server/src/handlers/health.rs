//! Health check handler.

use axum::{extract::State, Json};

use crate::{models::HealthResponse, state::AppState};

/// Reports loaded models and live conversations. A failing database marks
/// the service degraded; generation keeps working without it.
pub async fn handle_health(State(state): State<AppState>) -> Json<HealthResponse> {
    let database_ok = match state.store.ping() {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!(error = %e, "database ping failed");
            false
        }
    };

    Json(HealthResponse {
        status: if database_ok { "ok" } else { "degraded" },
        models: state.chat.registry().len(),
        sessions: state.chat.sessions().live_count().await,
        database: if database_ok { "ok" } else { "unavailable" },
    })
}
