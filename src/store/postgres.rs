use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use sqlx::{postgres::PgPoolOptions, types::Json, PgPool, Postgres, QueryBuilder};
use tracing::info;
use uuid::Uuid;

use super::StoreError;
use crate::auth::repo::UserRepo;
use crate::auth::repo_types::{NewUser, User, UserChanges};
use crate::gifts::filter::GiftFilter;
use crate::gifts::repo::GiftRepo;
use crate::gifts::repo_types::Gift;

const USER_COLUMNS: &str =
    "id, email, first_name, last_name, password_hash, created_at, updated_at";

/// PostgreSQL-backed store. Users live in a relational table with a unique
/// index on `email`; gifts are JSONB documents keyed by their `id`.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub async fn connect(database_url: &str, max_connections: u32) -> anyhow::Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(Duration::from_secs(5))
            .connect(database_url)
            .await
            .context("connect to database")?;
        Ok(Self { pool })
    }

    pub async fn migrate(&self) -> anyhow::Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .context("run migrations")?;
        info!("migrations applied");
        Ok(())
    }
}

#[async_trait]
impl UserRepo for PgStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn insert(&self, new: NewUser) -> Result<User, StoreError> {
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (id, email, first_name, last_name, password_hash, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(&new.email)
        .bind(&new.first_name)
        .bind(&new.last_name)
        .bind(&new.password_hash)
        .bind(new.created_at)
        .fetch_one(&self.pool)
        .await?;
        Ok(user)
    }

    async fn update(&self, id: Uuid, changes: UserChanges) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            UPDATE users
               SET first_name    = COALESCE($2, first_name),
                   last_name     = COALESCE($3, last_name),
                   password_hash = COALESCE($4, password_hash),
                   updated_at    = $5
             WHERE id = $1
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(changes.first_name)
        .bind(changes.last_name)
        .bind(changes.password_hash)
        .bind(changes.updated_at)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }
}

#[async_trait]
impl GiftRepo for PgStore {
    async fn list(&self) -> Result<Vec<Gift>, StoreError> {
        let rows = sqlx::query_as::<_, (Json<Gift>,)>(
            "SELECT doc FROM gifts ORDER BY seq",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(|(Json(g),)| g).collect())
    }

    async fn find(&self, id: &str) -> Result<Option<Gift>, StoreError> {
        let row = sqlx::query_as::<_, (Json<Gift>,)>("SELECT doc FROM gifts WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(|(Json(g),)| g))
    }

    async fn insert(&self, gift: Gift) -> Result<Gift, StoreError> {
        let id = gift
            .id()
            .map(str::to_string)
            .context("gift without id")?;
        let (Json(stored),) = sqlx::query_as::<_, (Json<Gift>,)>(
            "INSERT INTO gifts (id, doc) VALUES ($1, $2) RETURNING doc",
        )
        .bind(id)
        .bind(Json(gift))
        .fetch_one(&self.pool)
        .await?;
        Ok(stored)
    }

    async fn insert_many(&self, gifts: Vec<Gift>) -> Result<u64, StoreError> {
        let mut tx = self.pool.begin().await?;
        let mut n = 0;
        for gift in gifts {
            let id = gift
                .id()
                .map(str::to_string)
                .context("gift without id")?;
            n += sqlx::query("INSERT INTO gifts (id, doc) VALUES ($1, $2)")
                .bind(id)
                .bind(Json(gift))
                .execute(&mut *tx)
                .await?
                .rows_affected();
        }
        tx.commit().await?;
        Ok(n)
    }

    async fn search(&self, filter: &GiftFilter) -> Result<Vec<Gift>, StoreError> {
        let mut qb = search_query(filter);
        let rows: Vec<(Json<Gift>,)> = qb.build_query_as().fetch_all(&self.pool).await?;
        Ok(rows.into_iter().map(|(Json(g),)| g).collect())
    }

    async fn count(&self) -> Result<u64, StoreError> {
        let (n,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM gifts")
            .fetch_one(&self.pool)
            .await?;
        Ok(n as u64)
    }
}

fn search_query(filter: &GiftFilter) -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::<Postgres>::new("SELECT doc FROM gifts WHERE TRUE");
    if let Some(name) = &filter.name {
        // strpos keeps the needle literal; LIKE would treat % and _ as wildcards.
        qb.push(" AND strpos(lower(doc->>'name'), lower(")
            .push_bind(name.clone())
            .push(")) > 0");
    }
    if let Some(category) = &filter.category {
        qb.push(" AND doc->>'category' = ").push_bind(category.clone());
    }
    if let Some(condition) = &filter.condition {
        qb.push(" AND doc->>'condition' = ").push_bind(condition.clone());
    }
    if let Some(max) = filter.max_age_years {
        qb.push(
            " AND CASE WHEN jsonb_typeof(doc->'age_years') = 'number' \
             THEN (doc->'age_years')::float8 <= ",
        )
        .push_bind(max)
        .push(" ELSE FALSE END");
    }
    qb.push(" ORDER BY seq");
    qb
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_filter_selects_everything() {
        let qb = search_query(&GiftFilter::default());
        assert_eq!(
            qb.sql(),
            "SELECT doc FROM gifts WHERE TRUE ORDER BY seq"
        );
    }

    #[test]
    fn every_filter_field_is_bound() {
        let filter = GiftFilter {
            name: Some("bike".into()),
            category: Some("toys".into()),
            condition: Some("New".into()),
            max_age_years: Some(3.0),
        };
        let qb = search_query(&filter);
        let sql = qb.sql();
        assert!(sql.contains("strpos(lower(doc->>'name'), lower($1)) > 0"));
        assert!(sql.contains("doc->>'category' = $2"));
        assert!(sql.contains("doc->>'condition' = $3"));
        assert!(sql.contains("(doc->'age_years')::float8 <= $4 ELSE FALSE END"));
        assert!(!sql.contains("bike"));
    }
}
