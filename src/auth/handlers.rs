use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use tracing::{instrument, warn};

use crate::{
    auth::{
        dto::{LoginRequest, RegisterRequest, TokenResponse},
        repo_types::User,
    },
    error::{ApiResult, AppJson},
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    AppJson(mut payload): AppJson<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<User>)> {
    if let Err(e) = payload.normalize_and_validate() {
        warn!(error = %e, "invalid registration");
        return Err(e);
    }
    let user = state.auth.register(payload).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    AppJson(mut payload): AppJson<LoginRequest>,
) -> ApiResult<Json<TokenResponse>> {
    payload.normalize_and_validate()?;
    let token = state.auth.login(&payload.email, &payload.password).await?;
    Ok(Json(TokenResponse { token }))
}
