use std::collections::HashMap;
#[cfg(test)]
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::StoreError;
use crate::auth::repo::UserRepo;
use crate::auth::repo_types::{NewUser, User, UserChanges};
use crate::gifts::filter::GiftFilter;
use crate::gifts::repo::GiftRepo;
use crate::gifts::repo_types::Gift;

/// Process-local store. Uniqueness checks and writes happen under one write
/// lock, so concurrent inserts of the same key see exactly one winner.
#[derive(Default)]
pub struct MemoryStore {
    users: RwLock<HashMap<Uuid, User>>,
    gifts: RwLock<Vec<Gift>>,
    #[cfg(test)]
    unavailable: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(not(test))]
    fn check(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

#[cfg(test)]
impl MemoryStore {
    /// Makes every subsequent call fail with [`StoreError::Unavailable`].
    pub fn set_unavailable(&self, down: bool) {
        self.unavailable.store(down, Ordering::SeqCst);
    }

    fn check(&self) -> Result<(), StoreError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("memory store marked down".into()));
        }
        Ok(())
    }

    pub async fn user_count(&self) -> usize {
        self.users.read().await.len()
    }

    pub async fn remove_user(&self, id: Uuid) -> bool {
        self.users.write().await.remove(&id).is_some()
    }
}

#[async_trait]
impl UserRepo for MemoryStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        self.check()?;
        let users = self.users.read().await;
        Ok(users.values().find(|u| u.email == email).cloned())
    }

    async fn insert(&self, new: NewUser) -> Result<User, StoreError> {
        self.check()?;
        let mut users = self.users.write().await;
        if users.values().any(|u| u.email == new.email) {
            return Err(StoreError::Conflict("users_email_key".into()));
        }
        let user = User {
            id: Uuid::new_v4(),
            email: new.email,
            first_name: new.first_name,
            last_name: new.last_name,
            password_hash: new.password_hash,
            created_at: new.created_at,
            updated_at: None,
        };
        users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn update(&self, id: Uuid, changes: UserChanges) -> Result<Option<User>, StoreError> {
        self.check()?;
        let mut users = self.users.write().await;
        Ok(users.get_mut(&id).map(|u| {
            u.apply(changes);
            u.clone()
        }))
    }
}

#[async_trait]
impl GiftRepo for MemoryStore {
    async fn list(&self) -> Result<Vec<Gift>, StoreError> {
        self.check()?;
        Ok(self.gifts.read().await.clone())
    }

    async fn find(&self, id: &str) -> Result<Option<Gift>, StoreError> {
        self.check()?;
        let gifts = self.gifts.read().await;
        Ok(gifts.iter().find(|g| g.id() == Some(id)).cloned())
    }

    async fn insert(&self, gift: Gift) -> Result<Gift, StoreError> {
        self.check()?;
        let id = gift
            .id()
            .ok_or_else(|| StoreError::Other(anyhow::anyhow!("gift without id")))?;
        let mut gifts = self.gifts.write().await;
        if gifts.iter().any(|g| g.id() == Some(id)) {
            return Err(StoreError::Conflict("gifts_pkey".into()));
        }
        gifts.push(gift.clone());
        Ok(gift)
    }

    async fn insert_many(&self, batch: Vec<Gift>) -> Result<u64, StoreError> {
        self.check()?;
        let mut gifts = self.gifts.write().await;
        for (i, g) in batch.iter().enumerate() {
            let id = g
                .id()
                .ok_or_else(|| StoreError::Other(anyhow::anyhow!("gift without id")))?;
            let taken = gifts.iter().any(|e| e.id() == Some(id))
                || batch[..i].iter().any(|e| e.id() == Some(id));
            if taken {
                return Err(StoreError::Conflict("gifts_pkey".into()));
            }
        }
        let n = batch.len() as u64;
        gifts.extend(batch);
        Ok(n)
    }

    async fn search(&self, filter: &GiftFilter) -> Result<Vec<Gift>, StoreError> {
        self.check()?;
        let gifts = self.gifts.read().await;
        Ok(gifts.iter().filter(|g| filter.matches(g)).cloned().collect())
    }

    async fn count(&self) -> Result<u64, StoreError> {
        self.check()?;
        Ok(self.gifts.read().await.len() as u64)
    }
}
