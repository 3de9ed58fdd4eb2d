use axum::{
    extract::State,
    http::HeaderMap,
    routing::{post, put},
    Json, Router,
};
use tracing::instrument;

use crate::{
    auth::{
        dto::{
            LoginRequest, LoginResponse, RegisterRequest, RegisterResponse, UpdateRequest,
            UpdateResponse,
        },
        extractors::AuthUser,
        services, validation,
    },
    error::ApiError,
    extract::ApiJson,
    state::AppState,
};

/// Header naming the profile a `PUT /auth/update` targets.
pub const EMAIL_HEADER: &str = "email";

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/update", put(update))
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<RegisterRequest>,
) -> Result<Json<RegisterResponse>, ApiError> {
    let reg = validation::registration(&payload)?;
    let res = services::register(state.users.as_ref(), &state.jwt, reg).await?;
    Ok(Json(res))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let creds = validation::credentials(&payload)?;
    let res = services::login(state.users.as_ref(), &state.jwt, creds).await?;
    Ok(Json(res))
}

#[instrument(skip(state, headers, payload))]
pub async fn update(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    headers: HeaderMap,
    ApiJson(payload): ApiJson<UpdateRequest>,
) -> Result<Json<UpdateResponse>, ApiError> {
    let changes = validation::profile_changes(&payload)?;
    let email = headers.get(EMAIL_HEADER).and_then(|v| v.to_str().ok());
    let res = services::update_profile(state.users.as_ref(), &state.jwt, caller, email, changes)
        .await?;
    Ok(Json(res))
}
