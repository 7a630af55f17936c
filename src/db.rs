use std::{future::Future, time::Duration};

use anyhow::Context;
use sqlx::{postgres::PgPoolOptions, PgPool};
use thiserror::Error;

use crate::config::AppConfig;

/// SQLSTATE for `unique_violation`.
const UNIQUE_VIOLATION: &str = "23505";

/// Failure of a single persistence operation.
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("persistence operation timed out after {0:?}")]
    Timeout(Duration),
    #[error("unique constraint violated")]
    UniqueViolation,
    #[error("database error: {0}")]
    Database(#[source] sqlx::Error),
}

impl From<sqlx::Error> for RepoError {
    fn from(e: sqlx::Error) -> Self {
        match &e {
            sqlx::Error::Database(db) if db.code().as_deref() == Some(UNIQUE_VIOLATION) => {
                RepoError::UniqueViolation
            }
            _ => RepoError::Database(e),
        }
    }
}

pub async fn connect(config: &AppConfig) -> anyhow::Result<PgPool> {
    PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .acquire_timeout(config.db_timeout)
        .connect(&config.database_url)
        .await
        .context("connect to database")
}

/// Runs one persistence call under `limit`, so a stalled database surfaces
/// as `RepoError::Timeout` instead of a hung request.
pub async fn with_deadline<T, F>(limit: Duration, op: F) -> Result<T, RepoError>
where
    F: Future<Output = Result<T, sqlx::Error>>,
{
    match tokio::time::timeout(limit, op).await {
        Ok(res) => res.map_err(RepoError::from),
        Err(_) => {
            tracing::error!(?limit, "persistence deadline exceeded");
            Err(RepoError::Timeout(limit))
        }
    }
}
