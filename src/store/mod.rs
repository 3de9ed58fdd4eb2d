//! Persistence backends for users and gifts.
//!
//! Handlers only ever see [`UserRepo`](crate::auth::repo::UserRepo) and
//! [`GiftRepo`](crate::gifts::repo::GiftRepo) trait objects held in the
//! application state; this module provides the implementations behind them.

pub mod memory;
pub mod postgres;

use thiserror::Error;

pub use memory::MemoryStore;
pub use postgres::PgStore;

#[derive(Debug, Error)]
pub enum StoreError {
    /// The store could not be reached (pool exhausted, closed, I/O failure).
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// A unique key already exists.
    #[error("unique constraint violated: {0}")]
    Conflict(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db) = &e {
            if db.is_unique_violation() {
                return Self::Conflict(db.constraint().unwrap_or("unique").to_string());
            }
        }
        match e {
            sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::Io(_)
            | sqlx::Error::Tls(_)
            | sqlx::Error::WorkerCrashed => Self::Unavailable(e.to_string()),
            other => Self::Other(anyhow::Error::new(other)),
        }
    }
}
