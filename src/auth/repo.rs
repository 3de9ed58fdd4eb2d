use async_trait::async_trait;
use uuid::Uuid;

use crate::auth::repo_types::{NewUser, User, UserChanges};
use crate::store::StoreError;

/// Handle on the users collection.
#[async_trait]
pub trait UserRepo: Send + Sync {
    /// Find a user by exact email.
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;

    /// Insert a new user. Fails with [`StoreError::Conflict`] if the email is taken.
    async fn insert(&self, user: NewUser) -> Result<User, StoreError>;

    /// Apply `changes` and return the post-update record, or `None` if no user
    /// with `id` exists any more.
    async fn update(&self, id: Uuid, changes: UserChanges) -> Result<Option<User>, StoreError>;
}
