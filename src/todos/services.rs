use uuid::Uuid;

use crate::auth::extractors::AuthUser;
use crate::error::{ApiError, ApiResult};
use crate::todos::dto::{CreateTodoRequest, UpdateTodoRequest};
use crate::todos::repo_types::Todo;
use crate::todos::store::TodoStore;

/// Binds the caller's identity to store operations and turns raw path ids
/// into typed ones.
#[derive(Clone)]
pub struct TodoService {
    store: TodoStore,
}

pub fn parse_id(raw: &str) -> ApiResult<Uuid> {
    Uuid::parse_str(raw.trim()).map_err(|_| ApiError::InvalidIdentifier)
}

impl TodoService {
    pub fn new(store: TodoStore) -> Self {
        Self { store }
    }

    pub async fn create(&self, user: &AuthUser, req: CreateTodoRequest) -> ApiResult<Todo> {
        self.store
            .create(user.user_id, req.title, req.completed)
            .await
    }

    pub async fn list(&self, user: &AuthUser) -> ApiResult<Vec<Todo>> {
        self.store.find_all(user.user_id).await
    }

    pub async fn get(&self, user: &AuthUser, id: &str) -> ApiResult<Todo> {
        self.store.find_by_id(parse_id(id)?, user.user_id).await
    }

    pub async fn update(&self, user: &AuthUser, id: &str, req: UpdateTodoRequest) -> ApiResult<Todo> {
        let id = parse_id(id)?;
        self.store
            .update(id, user.user_id, req.title, req.completed)
            .await
    }

    pub async fn delete(&self, user: &AuthUser, id: &str) -> ApiResult<()> {
        self.store.delete(parse_id(id)?, user.user_id).await
    }
}
