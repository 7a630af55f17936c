use serde::Deserialize;

use crate::error::{ApiError, ApiResult};

/// Request body for `POST /todos`. Any owner field a client sends is ignored.
#[derive(Debug, Deserialize)]
pub struct CreateTodoRequest {
    #[serde(default)]
    pub title: String,
    pub completed: Option<bool>,
}

/// Request body for `PUT /todos/{id}`. An absent (or `null`) field is left
/// untouched; an explicit `false` is written.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateTodoRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub completed: Option<bool>,
}

impl CreateTodoRequest {
    pub fn validate(&self) -> ApiResult<()> {
        if self.title.trim().is_empty() {
            return Err(ApiError::Validation("title is required".into()));
        }
        Ok(())
    }
}

impl UpdateTodoRequest {
    pub fn validate(&self) -> ApiResult<()> {
        if matches!(&self.title, Some(t) if t.trim().is_empty()) {
            return Err(ApiError::Validation("title must not be empty".into()));
        }
        Ok(())
    }
}
