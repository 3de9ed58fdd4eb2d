use async_trait::async_trait;

use crate::gifts::filter::GiftFilter;
use crate::gifts::repo_types::Gift;
use crate::store::StoreError;

/// Handle on the gifts collection.
#[async_trait]
pub trait GiftRepo: Send + Sync {
    async fn list(&self) -> Result<Vec<Gift>, StoreError>;

    async fn find(&self, id: &str) -> Result<Option<Gift>, StoreError>;

    /// Insert a gift that already carries an id. Fails with
    /// [`StoreError::Conflict`] if the id is taken.
    async fn insert(&self, gift: Gift) -> Result<Gift, StoreError>;

    /// Insert all gifts in one batch; returns how many were written.
    async fn insert_many(&self, gifts: Vec<Gift>) -> Result<u64, StoreError>;

    async fn search(&self, filter: &GiftFilter) -> Result<Vec<Gift>, StoreError>;

    async fn count(&self) -> Result<u64, StoreError>;
}
