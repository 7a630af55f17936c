use std::time::Duration;

use axum::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::db::{with_deadline, RepoError};
use crate::todos::repo_types::{NewTodo, Todo, TodoPatch};

/// Every lookup and mutation is filtered by owner as well as by id.
#[async_trait]
pub trait TodoRepository: Send + Sync {
    async fn insert(&self, todo: NewTodo) -> Result<Todo, RepoError>;

    async fn find_all(&self, user_id: Uuid) -> Result<Vec<Todo>, RepoError>;

    async fn find_by_id(&self, id: Uuid, user_id: Uuid) -> Result<Option<Todo>, RepoError>;

    /// `Ok(false)` when no todo matched `(id, user_id)`.
    async fn update(&self, id: Uuid, user_id: Uuid, patch: TodoPatch) -> Result<bool, RepoError>;

    /// `Ok(false)` when no todo matched `(id, user_id)`.
    async fn delete(&self, id: Uuid, user_id: Uuid) -> Result<bool, RepoError>;
}

#[derive(Clone)]
pub struct PgTodoRepository {
    db: PgPool,
    timeout: Duration,
}

impl PgTodoRepository {
    pub fn new(db: PgPool, timeout: Duration) -> Self {
        Self { db, timeout }
    }
}

#[async_trait]
impl TodoRepository for PgTodoRepository {
    async fn insert(&self, todo: NewTodo) -> Result<Todo, RepoError> {
        with_deadline(
            self.timeout,
            sqlx::query_as::<_, Todo>(
                r#"
                INSERT INTO todos (user_id, title, completed)
                VALUES ($1, $2, $3)
                RETURNING id, title, completed, created_at, updated_at, user_id
                "#,
            )
            .bind(todo.user_id)
            .bind(&todo.title)
            .bind(todo.completed)
            .fetch_one(&self.db),
        )
        .await
    }

    async fn find_all(&self, user_id: Uuid) -> Result<Vec<Todo>, RepoError> {
        with_deadline(
            self.timeout,
            sqlx::query_as::<_, Todo>(
                r#"
                SELECT id, title, completed, created_at, updated_at, user_id
                FROM todos
                WHERE user_id = $1
                ORDER BY created_at ASC
                "#,
            )
            .bind(user_id)
            .fetch_all(&self.db),
        )
        .await
    }

    async fn find_by_id(&self, id: Uuid, user_id: Uuid) -> Result<Option<Todo>, RepoError> {
        with_deadline(
            self.timeout,
            sqlx::query_as::<_, Todo>(
                r#"
                SELECT id, title, completed, created_at, updated_at, user_id
                FROM todos
                WHERE id = $1 AND user_id = $2
                "#,
            )
            .bind(id)
            .bind(user_id)
            .fetch_optional(&self.db),
        )
        .await
    }

    async fn update(&self, id: Uuid, user_id: Uuid, patch: TodoPatch) -> Result<bool, RepoError> {
        let res = with_deadline(
            self.timeout,
            sqlx::query(
                r#"
                UPDATE todos
                   SET title = COALESCE($3, title),
                       completed = COALESCE($4, completed),
                       updated_at = GREATEST($5, updated_at + INTERVAL '1 microsecond')
                 WHERE id = $1 AND user_id = $2
                "#,
            )
            .bind(id)
            .bind(user_id)
            .bind(patch.title)
            .bind(patch.completed)
            .bind(patch.updated_at)
            .execute(&self.db),
        )
        .await?;
        Ok(res.rows_affected() > 0)
    }

    async fn delete(&self, id: Uuid, user_id: Uuid) -> Result<bool, RepoError> {
        let res = with_deadline(
            self.timeout,
            sqlx::query("DELETE FROM todos WHERE id = $1 AND user_id = $2")
                .bind(id)
                .bind(user_id)
                .execute(&self.db),
        )
        .await?;
        Ok(res.rows_affected() > 0)
    }
}
