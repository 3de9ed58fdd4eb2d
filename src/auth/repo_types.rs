use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

/// User record in the database.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,                             // store-assigned identifier
    pub email: String,                        // unique, case-sensitive
    pub first_name: String,
    pub last_name: String,
    #[serde(skip_serializing)]
    pub password_hash: String,                // Argon2 hash, not exposed in JSON
    pub created_at: OffsetDateTime,
    pub updated_at: Option<OffsetDateTime>,
}

/// Fields needed to insert a user; the store assigns the id.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub password_hash: String,
    pub created_at: OffsetDateTime,
}

/// Partial update. `None` leaves the stored value as is.
#[derive(Debug, Clone)]
pub struct UserChanges {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub password_hash: Option<String>,
    pub updated_at: OffsetDateTime,
}

impl User {
    pub fn apply(&mut self, changes: UserChanges) {
        if let Some(v) = changes.first_name {
            self.first_name = v;
        }
        if let Some(v) = changes.last_name {
            self.last_name = v;
        }
        if let Some(v) = changes.password_hash {
            self.password_hash = v;
        }
        self.updated_at = Some(changes.updated_at);
    }
}
