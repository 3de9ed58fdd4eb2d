use serde::Deserialize;
use serde_json::Value;
use tracing::{info, warn};

use super::{repo::GiftRepo, repo_types::Gift};
use crate::{
    error::{ApiError, FieldError},
    store::StoreError,
};

/// Stores a new gift document, assigning an id if it has none.
pub async fn create_gift(gifts: &dyn GiftRepo, body: Value) -> Result<Gift, ApiError> {
    let mut gift = Gift::from_value(body).ok_or_else(|| {
        ApiError::Validation(vec![FieldError::body("", "gift must be a JSON object")])
    })?;
    let id = gift.ensure_id();

    match gifts.insert(gift).await {
        Ok(g) => {
            info!(gift_id = %id, "gift created");
            Ok(g)
        }
        Err(StoreError::Conflict(_)) => {
            warn!(gift_id = %id, "gift id already exists");
            Err(ApiError::DuplicateGift)
        }
        Err(e) => Err(e.into()),
    }
}

/// Seed file layout: `{"docs": [...]}`.
#[derive(Debug, Deserialize)]
pub struct SeedFile {
    pub docs: Vec<Value>,
}

#[derive(Debug, PartialEq, Eq)]
pub enum SeedOutcome {
    Inserted(u64),
    AlreadyPopulated(u64),
}

/// Loads `docs` into the gifts collection if, and only if, it is empty.
pub async fn seed_if_empty(gifts: &dyn GiftRepo, docs: Vec<Value>) -> anyhow::Result<SeedOutcome> {
    let existing = gifts.count().await?;
    if existing > 0 {
        info!(existing, "gifts collection already populated; nothing inserted");
        return Ok(SeedOutcome::AlreadyPopulated(existing));
    }

    let mut batch = Vec::with_capacity(docs.len());
    for (i, doc) in docs.into_iter().enumerate() {
        let Some(mut gift) = Gift::from_value(doc) else {
            anyhow::bail!("seed document #{i} is not a JSON object");
        };
        gift.ensure_id();
        batch.push(gift);
    }

    let n = gifts.insert_many(batch).await?;
    info!(inserted = n, "gifts seeded");
    Ok(SeedOutcome::Inserted(n))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use serde_json::json;

    #[tokio::test]
    async fn create_assigns_id_when_missing() {
        let store = MemoryStore::new();
        let g = create_gift(&store, json!({"name": "Lamp"})).await.unwrap();
        let id = g.id().unwrap().to_string();
        assert_eq!(store.find(&id).await.unwrap(), Some(g));
    }

    #[tokio::test]
    async fn create_rejects_non_objects() {
        let store = MemoryStore::new();
        let err = create_gift(&store, json!(["Lamp"])).await.unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
        assert_eq!(store.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn create_duplicate_id_conflicts() {
        let store = MemoryStore::new();
        create_gift(&store, json!({"id": "7"})).await.unwrap();
        let err = create_gift(&store, json!({"id": "7"})).await.unwrap_err();
        assert!(matches!(err, ApiError::DuplicateGift));
    }

    #[tokio::test]
    async fn seed_only_fills_an_empty_collection() {
        let store = MemoryStore::new();
        let docs = vec![json!({"id": "1", "name": "A"}), json!({"name": "B"})];
        let out = seed_if_empty(&store, docs.clone()).await.unwrap();
        assert_eq!(out, SeedOutcome::Inserted(2));

        let out = seed_if_empty(&store, docs).await.unwrap();
        assert_eq!(out, SeedOutcome::AlreadyPopulated(2));
        assert_eq!(store.count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn seed_rejects_bad_documents() {
        let store = MemoryStore::new();
        assert!(seed_if_empty(&store, vec![json!(1)]).await.is_err());
        assert_eq!(store.count().await.unwrap(), 0);
    }

    #[test]
    fn seed_file_shape() {
        let f: SeedFile = serde_json::from_str(r#"{"docs": [{"id": "1"}]}"#).unwrap();
        assert_eq!(f.docs.len(), 1);
    }
}
