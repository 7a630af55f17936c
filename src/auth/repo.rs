use std::time::Duration;

use axum::async_trait;
use sqlx::PgPool;
use tracing::warn;

use crate::auth::repo_types::{NewUser, User};
use crate::db::{with_deadline, RepoError};
use crate::error::ApiError;

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// `Ok(None)` when no user has this email.
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError>;

    /// Inserts without any pre-check; a taken email must fail with
    /// `RepoError::UniqueViolation`.
    async fn insert(&self, user: NewUser) -> Result<User, RepoError>;

    /// Looks the email up first so the common case gets a clean conflict,
    /// then relies on the storage constraint for the concurrent case.
    async fn create(&self, user: NewUser) -> Result<User, ApiError> {
        if self.find_by_email(&user.email).await?.is_some() {
            warn!(email = %user.email, "email already registered");
            return Err(ApiError::DuplicateEmail);
        }
        match self.insert(user).await {
            Ok(u) => Ok(u),
            Err(RepoError::UniqueViolation) => {
                warn!("email registered concurrently");
                Err(ApiError::DuplicateEmail)
            }
            Err(e) => Err(e.into()),
        }
    }
}

#[derive(Clone)]
pub struct PgUserRepository {
    db: PgPool,
    timeout: Duration,
}

impl PgUserRepository {
    pub fn new(db: PgPool, timeout: Duration) -> Self {
        Self { db, timeout }
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError> {
        with_deadline(
            self.timeout,
            sqlx::query_as::<_, User>(
                r#"
                SELECT id, email, full_name, password_hash, created_at, updated_at
                FROM users
                WHERE email = $1
                "#,
            )
            .bind(email)
            .fetch_optional(&self.db),
        )
        .await
    }

    async fn insert(&self, user: NewUser) -> Result<User, RepoError> {
        with_deadline(
            self.timeout,
            sqlx::query_as::<_, User>(
                r#"
                INSERT INTO users (email, full_name, password_hash)
                VALUES ($1, $2, $3)
                RETURNING id, email, full_name, password_hash, created_at, updated_at
                "#,
            )
            .bind(&user.email)
            .bind(&user.full_name)
            .bind(&user.password_hash)
            .fetch_one(&self.db),
        )
        .await
    }
}
