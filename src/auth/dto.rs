use serde::{Deserialize, Serialize};
use serde_json::Value;

// Request fields are kept as raw JSON so that a wrong type becomes an itemized
// validation error instead of a body rejection.

/// Request body for user registration.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub email: Option<Value>,
    pub first_name: Option<Value>,
    pub last_name: Option<Value>,
    pub password: Option<Value>,
}

/// Request body for login.
#[derive(Debug, Default, Deserialize)]
pub struct LoginRequest {
    pub email: Option<Value>,
    pub password: Option<Value>,
}

/// Request body for profile update; every field is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRequest {
    pub first_name: Option<Value>,
    pub last_name: Option<Value>,
    pub password: Option<Value>,
}

#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub authtoken: String,
    pub email: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub authtoken: String,
    pub user_name: String,
    pub user_email: String,
}

#[derive(Debug, Serialize)]
pub struct UpdateResponse {
    pub authtoken: String,
}
