use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::json;
use thiserror::Error;
use tracing::error;

use crate::store::StoreError;

/// One offending input field, reported back to the client as part of a 400.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct FieldError {
    pub location: &'static str,
    pub path: String,
    pub msg: String,
}

impl FieldError {
    pub fn body(path: &str, msg: impl Into<String>) -> Self {
        Self {
            location: "body",
            path: path.to_string(),
            msg: msg.into(),
        }
    }

    pub fn query(path: &str, msg: impl Into<String>) -> Self {
        Self {
            location: "query",
            path: path.to_string(),
            msg: msg.into(),
        }
    }
}

/// Every failure a handler can answer with.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("invalid input ({} field errors)", .0.len())]
    Validation(Vec<FieldError>),

    #[error("Email already exists")]
    DuplicateEmail,

    #[error("Email not found in the request headers")]
    MissingEmail,

    #[error("Wrong password")]
    WrongPassword,

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("User not found")]
    UserNotFound,

    #[error("Gift not found")]
    GiftNotFound,

    #[error("Gift already exists")]
    DuplicateGift,

    #[error("store unavailable")]
    StoreUnavailable(#[source] StoreError),

    #[error("internal error")]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation(_)
            | Self::DuplicateEmail
            | Self::MissingEmail
            | Self::WrongPassword => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::UserNotFound | Self::GiftNotFound => StatusCode::NOT_FOUND,
            Self::DuplicateGift => StatusCode::CONFLICT,
            Self::StoreUnavailable(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::Unavailable(_) => Self::StoreUnavailable(e),
            other => Self::Internal(anyhow::Error::new(other)),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::Validation(vec![FieldError::body("", rejection.body_text())])
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = match &self {
            Self::Validation(errors) => json!({ "errors": errors }),
            Self::StoreUnavailable(e) => {
                error!(error = %e, "store unavailable");
                json!({ "error": "Internal server error" })
            }
            Self::Internal(e) => {
                error!(error = format!("{e:#}"), "internal error");
                json!({ "error": "Internal server error" })
            }
            other => json!({ "error": other.to_string() }),
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    async fn body_json(err: ApiError) -> (StatusCode, serde_json::Value) {
        let res = err.into_response();
        let status = res.status();
        let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[test]
    fn status_code_mapping() {
        assert_eq!(ApiError::DuplicateEmail.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::MissingEmail.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::UserNotFound.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(
            ApiError::Unauthorized("no".into()).status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(ApiError::DuplicateGift.status_code(), StatusCode::CONFLICT);
        assert_eq!(
            ApiError::Internal(anyhow::anyhow!("boom")).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn unavailable_store_maps_to_store_unavailable() {
        let err: ApiError = StoreError::Unavailable("pool timed out".into()).into();
        assert!(matches!(err, ApiError::StoreUnavailable(_)));
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);

        let err: ApiError = StoreError::Conflict("users_email_key".into()).into();
        assert!(matches!(err, ApiError::Internal(_)));
    }

    #[tokio::test]
    async fn validation_errors_are_itemized() {
        let (status, body) = body_json(ApiError::Validation(vec![
            FieldError::body("password", "Invalid value"),
            FieldError::body("firstName", "Invalid value"),
        ]))
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let errors = body["errors"].as_array().unwrap();
        assert_eq!(errors.len(), 2);
        assert_eq!(errors[0]["path"], "password");
        assert_eq!(errors[0]["location"], "body");
    }

    #[tokio::test]
    async fn internal_errors_do_not_leak_detail() {
        let (status, body) =
            body_json(ApiError::Internal(anyhow::anyhow!("connection refused to 10.0.0.3"))).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Internal server error");
    }

    #[tokio::test]
    async fn plain_errors_carry_message() {
        let (status, body) = body_json(ApiError::UserNotFound).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "User not found");
    }
}
