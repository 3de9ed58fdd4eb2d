use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde_json::Value;
use tracing::{instrument, warn};

use super::{
    dto::{SearchParams, SearchResponse},
    filter::GiftFilter,
    repo_types::Gift,
    services,
};
use crate::{error::ApiError, extract::ApiJson, state::AppState};

pub fn gift_routes() -> Router<AppState> {
    Router::new()
        .route("/gifts", get(list_gifts).post(create_gift))
        .route("/gifts/:id", get(get_gift))
        .route("/search", get(search_gifts))
}

#[instrument(skip(state))]
pub async fn list_gifts(State(state): State<AppState>) -> Result<Json<Vec<Gift>>, ApiError> {
    Ok(Json(state.gifts.list().await?))
}

#[instrument(skip(state))]
pub async fn get_gift(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Gift>, ApiError> {
    match state.gifts.find(&id).await? {
        Some(g) => Ok(Json(g)),
        None => {
            warn!(%id, "gift not found");
            Err(ApiError::GiftNotFound)
        }
    }
}

#[instrument(skip(state, body))]
pub async fn create_gift(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<Value>,
) -> Result<(StatusCode, Json<Gift>), ApiError> {
    let gift = services::create_gift(state.gifts.as_ref(), body).await?;
    Ok((StatusCode::CREATED, Json(gift)))
}

#[instrument(skip(state))]
pub async fn search_gifts(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<SearchResponse>, ApiError> {
    let filter = GiftFilter::from_params(&params)?;
    let gifts = state.gifts.search(&filter).await?;
    Ok(Json(SearchResponse {
        success: true,
        gifts,
    }))
}
