use axum::{
    async_trait,
    extract::{FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts},
    middleware::Next,
    response::Response,
};
use tracing::warn;
use uuid::Uuid;

use crate::{auth::services::AuthService, error::ApiError, state::AppState};

pub const BEARER_PREFIX: &str = "Bearer ";

/// Identity of the caller, placed in request extensions by `require_auth`.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub email: String,
}

/// Resolves the `Authorization` header value to a verified identity.
pub fn authenticate(auth: &AuthService, header: Option<&str>) -> Result<AuthUser, ApiError> {
    let header = match header {
        Some(h) if !h.is_empty() => h,
        _ => {
            warn!("missing authorization header");
            return Err(ApiError::Unauthorized(
                "authorization header is required".into(),
            ));
        }
    };

    let Some(token) = header.strip_prefix(BEARER_PREFIX) else {
        warn!("invalid authorization scheme");
        return Err(ApiError::Unauthorized(
            "authorization header must start with 'Bearer '".into(),
        ));
    };

    auth.verify_token(token.trim())
}

/// Gate for protected routes: on failure the request goes no further.
pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let header = req
        .headers()
        .get(AUTHORIZATION)
        .map(|v| v.to_str().unwrap_or_default());
    let user = authenticate(&state.auth, header)?;
    req.extensions_mut().insert(user);
    Ok(next.run(req).await)
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthUser>()
            .cloned()
            .ok_or_else(|| ApiError::Unauthorized("authentication required".into()))
    }
}
