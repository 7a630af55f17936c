use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{ApiError, ApiResult};

pub const MIN_PASSWORD_LEN: usize = 6;
pub const FULL_NAME_LEN: std::ops::RangeInclusive<usize> = 3..=50;

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

/// Request body for user registration.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub password: String,
}

/// Request body for login.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Response returned after a successful login.
#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub token: String,
}

impl RegisterRequest {
    /// Trims email and name, then reports every violated rule at once.
    pub fn normalize_and_validate(&mut self) -> ApiResult<()> {
        self.email = self.email.trim().to_string();
        self.full_name = self.full_name.trim().to_string();

        let mut problems = Vec::new();
        if self.email.is_empty() {
            problems.push("email is required".to_string());
        } else if !is_valid_email(&self.email) {
            problems.push("email must be a valid email".to_string());
        }
        let name_len = self.full_name.chars().count();
        if name_len == 0 {
            problems.push("fullName is required".to_string());
        } else if !FULL_NAME_LEN.contains(&name_len) {
            problems.push(format!(
                "fullName must be between {} and {} characters",
                FULL_NAME_LEN.start(),
                FULL_NAME_LEN.end()
            ));
        }
        if self.password.is_empty() {
            problems.push("password is required".to_string());
        } else if self.password.chars().count() < MIN_PASSWORD_LEN {
            problems.push(format!(
                "password must be at least {MIN_PASSWORD_LEN} characters"
            ));
        }

        if problems.is_empty() {
            Ok(())
        } else {
            Err(ApiError::Validation(problems.join(", ")))
        }
    }
}

impl LoginRequest {
    pub fn normalize_and_validate(&mut self) -> ApiResult<()> {
        self.email = self.email.trim().to_string();
        if self.email.is_empty() || self.password.is_empty() {
            return Err(ApiError::Validation(
                "email and password are required".into(),
            ));
        }
        Ok(())
    }
}
