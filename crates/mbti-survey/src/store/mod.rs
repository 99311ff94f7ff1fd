//! SQLite persistence for questionnaires, answers, results, and accounts.

mod accounts;
mod schema;
mod survey;

use std::str::FromStr;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use tracing::info;

use crate::survey::domain::DomainError;

pub use accounts::{SessionRecord, UserRecord};
pub use survey::{PurgeCounts, UpsertOutcome};

/// Handle to the relational store. Cloning shares the underlying pool.
#[derive(Debug, Clone)]
pub struct Store {
    pool: SqlitePool,
}

impl Store {
    pub async fn connect(url: &str) -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::from_str(url)?
            .create_if_missing(true)
            .foreign_keys(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(8)
            .connect_with(options)
            .await?;

        let store = Self { pool };
        store.migrate().await?;
        info!(%url, "database ready");
        Ok(store)
    }

    /// Private in-memory database; a single connection keeps every query on
    /// the same database.
    pub async fn in_memory() -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await?;

        let store = Self { pool };
        store.migrate().await?;
        Ok(store)
    }

    pub async fn migrate(&self) -> Result<(), StoreError> {
        schema::create_tables(&self.pool).await
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("stored JSON is malformed: {0}")]
    Json(#[from] serde_json::Error),
    #[error("stored row is invalid: {0}")]
    Corrupt(#[from] DomainError),
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
}

impl StoreError {
    pub(crate) fn from_insert(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::Database(db) if db.is_unique_violation() => Self::Conflict,
            _ => Self::Database(err),
        }
    }
}
