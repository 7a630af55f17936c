use std::sync::Arc;

use tracing::{info, warn};

use crate::auth::{
    dto::RegisterRequest,
    extractors::AuthUser,
    jwt::{JwtKeys, TokenError},
    password::{hash_password, verify_password},
    repo::UserRepository,
    repo_types::{NewUser, User},
};
use crate::error::{ApiError, ApiResult};

/// Registration, login and token verification on top of the user directory.
#[derive(Clone)]
pub struct AuthService {
    users: Arc<dyn UserRepository>,
    keys: JwtKeys,
    pepper: Arc<str>,
}

impl AuthService {
    pub fn new(users: Arc<dyn UserRepository>, keys: JwtKeys, pepper: &str) -> Self {
        Self {
            users,
            keys,
            pepper: Arc::from(pepper),
        }
    }

    #[cfg(test)]
    pub fn keys(&self) -> &JwtKeys {
        &self.keys
    }

    /// Expects an already validated request. The raw password is consumed
    /// here and never stored.
    pub async fn register(&self, req: RegisterRequest) -> ApiResult<User> {
        let RegisterRequest {
            email,
            full_name,
            password,
        } = req;

        let pepper = self.pepper.clone();
        let password_hash = tokio::task::spawn_blocking(move || hash_password(&password, &pepper))
            .await
            .map_err(ApiError::internal)?
            .map_err(ApiError::internal)?;

        let user = self
            .users
            .create(NewUser {
                email,
                full_name,
                password_hash,
            })
            .await?;
        info!(user_id = %user.id, "user registered");
        Ok(user)
    }

    /// Unknown email and wrong password fail the same way.
    pub async fn login(&self, email: &str, password: &str) -> ApiResult<String> {
        let Some(user) = self.users.find_by_email(email).await? else {
            warn!("login unknown email");
            return Err(ApiError::InvalidCredentials);
        };

        let pepper = self.pepper.clone();
        let password = password.to_string();
        let stored = user.password_hash.clone();
        let ok = tokio::task::spawn_blocking(move || verify_password(&password, &pepper, &stored))
            .await
            .map_err(ApiError::internal)?;
        if !ok {
            warn!(user_id = %user.id, "login invalid password");
            return Err(ApiError::InvalidCredentials);
        }

        let token = self
            .keys
            .issue(user.id, &user.email)
            .map_err(ApiError::internal)?;
        info!(user_id = %user.id, "user logged in");
        Ok(token)
    }

    /// Every token failure is a 401; only the message differs.
    pub fn verify_token(&self, token: &str) -> ApiResult<AuthUser> {
        match self.keys.verify(token) {
            Ok(claims) => Ok(AuthUser {
                user_id: claims.sub,
                email: claims.email,
            }),
            Err(e) => {
                warn!(error = %e, "token rejected");
                let message = match e {
                    TokenError::Expired => "token has expired",
                    _ => "invalid token",
                };
                Err(ApiError::Unauthorized(message.into()))
            }
        }
    }
}
