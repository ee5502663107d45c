//! Rating submission and lookup.

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    Json,
};

use crate::{
    error::ServerError,
    models::{RatingsQuery, RatingsResponse, SubmitRatingQuery, SuccessResponse},
    state::AppState,
};

pub async fn handle_submit_rating(
    State(state): State<AppState>,
    query: Result<Query<SubmitRatingQuery>, QueryRejection>,
) -> Result<Json<SuccessResponse>, ServerError> {
    let Query(query) = query.map_err(|e| ServerError::InvalidParams(e.body_text()))?;
    let rating = query.validate()?;

    let id = state
        .store
        .submit_rating(&rating.conversation, rating.rating, rating.model_used)?;
    tracing::info!(id, model_id = rating.model_used, "rating submitted");

    Ok(Json(SuccessResponse {
        success: "Successfully added",
    }))
}

pub async fn handle_get_ratings(
    State(state): State<AppState>,
    query: Result<Query<RatingsQuery>, QueryRejection>,
) -> Result<Json<RatingsResponse>, ServerError> {
    let Query(query) = query.map_err(|e| ServerError::InvalidParams(e.body_text()))?;
    let model_id = query.model_id()?;
    let records = state.store.ratings_for_model(model_id)?;
    Ok(Json(records.into()))
}
