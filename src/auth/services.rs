use time::OffsetDateTime;
use tracing::{error, info, warn};
use uuid::Uuid;

use super::{
    dto::{LoginResponse, RegisterResponse, UpdateResponse},
    jwt::JwtKeys,
    password::{hash_password_blocking, verify_password_blocking},
    repo::UserRepo,
    repo_types::{NewUser, UserChanges},
    validation::{Credentials, ProfileChanges, Registration},
};
use crate::{error::ApiError, store::StoreError};

/// Creates a user and issues its first token.
///
/// The existence check is only a fast path. Uniqueness is decided by the
/// store at insert time, so a concurrent registration that slips past the
/// check still ends in [`ApiError::DuplicateEmail`].
pub async fn register(
    users: &dyn UserRepo,
    keys: &JwtKeys,
    reg: Registration,
) -> Result<RegisterResponse, ApiError> {
    if users.find_by_email(&reg.email).await?.is_some() {
        warn!(email = %reg.email, "email already registered");
        return Err(ApiError::DuplicateEmail);
    }

    let password_hash = hash_password_blocking(reg.password).await?;

    let user = match users
        .insert(NewUser {
            email: reg.email,
            first_name: reg.first_name,
            last_name: reg.last_name,
            password_hash,
            created_at: OffsetDateTime::now_utc(),
        })
        .await
    {
        Ok(u) => u,
        Err(StoreError::Conflict(constraint)) => {
            warn!(%constraint, "email taken by concurrent registration");
            return Err(ApiError::DuplicateEmail);
        }
        Err(e) => {
            error!(error = %e, "create user failed");
            return Err(e.into());
        }
    };

    // The user row stays even if signing fails; the client can log in later.
    let authtoken = keys.sign(user.id)?;

    info!(user_id = %user.id, "user registered");
    Ok(RegisterResponse {
        authtoken,
        email: user.email,
    })
}

pub async fn login(
    users: &dyn UserRepo,
    keys: &JwtKeys,
    creds: Credentials,
) -> Result<LoginResponse, ApiError> {
    let user = match users.find_by_email(&creds.email).await? {
        Some(u) => u,
        None => {
            warn!(email = %creds.email, "login unknown email");
            return Err(ApiError::UserNotFound);
        }
    };

    if !verify_password_blocking(creds.password, user.password_hash.clone()).await? {
        warn!(user_id = %user.id, "login invalid password");
        return Err(ApiError::WrongPassword);
    }

    let authtoken = keys.sign(user.id)?;
    info!(user_id = %user.id, "user logged in");
    Ok(LoginResponse {
        authtoken,
        user_name: user.first_name,
        user_email: user.email,
    })
}

/// Applies a partial profile update to the user named by `email`.
///
/// `caller` is the subject of the request's bearer token; it must own the
/// target record.
pub async fn update_profile(
    users: &dyn UserRepo,
    keys: &JwtKeys,
    caller: Uuid,
    email: Option<&str>,
    changes: ProfileChanges,
) -> Result<UpdateResponse, ApiError> {
    let email = match email.map(str::trim).filter(|e| !e.is_empty()) {
        Some(e) => e,
        None => {
            warn!("email not found in the request headers");
            return Err(ApiError::MissingEmail);
        }
    };

    let existing = match users.find_by_email(email).await? {
        Some(u) => u,
        None => {
            warn!(%email, "update for unknown user");
            return Err(ApiError::UserNotFound);
        }
    };

    if existing.id != caller {
        warn!(user_id = %existing.id, %caller, "token does not own target profile");
        return Err(ApiError::Forbidden(
            "Token does not match the target user".into(),
        ));
    }

    let password_hash = match changes.password {
        Some(p) => Some(hash_password_blocking(p).await?),
        None => None,
    };

    let updated = users
        .update(
            existing.id,
            UserChanges {
                first_name: changes.first_name,
                last_name: changes.last_name,
                password_hash,
                updated_at: OffsetDateTime::now_utc(),
            },
        )
        .await?
        .ok_or_else(|| {
            warn!(user_id = %existing.id, "user vanished before update");
            ApiError::UserNotFound
        })?;

    let authtoken = keys.sign(updated.id)?;
    info!(user_id = %updated.id, "user updated");
    Ok(UpdateResponse { authtoken })
}
