use axum::{middleware, Router};

use crate::auth::extractors::require_auth;
use crate::state::AppState;

pub mod dto;
pub mod handlers;
pub mod repo;
pub mod repo_types;
pub mod services;
pub mod store;

/// Every todo route sits behind the bearer-token gate.
pub fn router(state: AppState) -> Router<AppState> {
    handlers::todo_routes().route_layer(middleware::from_fn_with_state(state, require_auth))
}
