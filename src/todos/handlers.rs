use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use tracing::instrument;

use crate::{
    auth::extractors::AuthUser,
    error::{ApiResult, AppJson},
    state::AppState,
    todos::{
        dto::{CreateTodoRequest, UpdateTodoRequest},
        repo_types::Todo,
    },
};

pub fn todo_routes() -> Router<AppState> {
    Router::new()
        .route("/todos", get(list_todos).post(create_todo))
        .route(
            "/todos/:id",
            get(get_todo).put(update_todo).delete(delete_todo),
        )
}

#[instrument(skip(state, user), fields(user_id = %user.user_id))]
pub async fn list_todos(
    State(state): State<AppState>,
    user: AuthUser,
) -> ApiResult<Json<Vec<Todo>>> {
    Ok(Json(state.todos.list(&user).await?))
}

#[instrument(skip(state, user, payload), fields(user_id = %user.user_id))]
pub async fn create_todo(
    State(state): State<AppState>,
    user: AuthUser,
    AppJson(payload): AppJson<CreateTodoRequest>,
) -> ApiResult<(StatusCode, Json<Todo>)> {
    payload.validate()?;
    let todo = state.todos.create(&user, payload).await?;
    Ok((StatusCode::CREATED, Json(todo)))
}

#[instrument(skip(state, user), fields(user_id = %user.user_id))]
pub async fn get_todo(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
) -> ApiResult<Json<Todo>> {
    Ok(Json(state.todos.get(&user, &id).await?))
}

#[instrument(skip(state, user, payload), fields(user_id = %user.user_id))]
pub async fn update_todo(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
    AppJson(payload): AppJson<UpdateTodoRequest>,
) -> ApiResult<Json<Todo>> {
    payload.validate()?;
    Ok(Json(state.todos.update(&user, &id, payload).await?))
}

#[instrument(skip(state, user), fields(user_id = %user.user_id))]
pub async fn delete_todo(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    state.todos.delete(&user, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}
