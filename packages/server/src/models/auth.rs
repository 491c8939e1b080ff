use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::models::user::{PublicUser, normalize_email, normalize_username};

/// Request body for user login. One of `username` or `email` is required.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct LoginRequest {
    #[schema(example = "alice")]
    pub username: Option<String>,
    #[schema(example = "alice@example.com")]
    pub email: Option<String>,
    #[schema(example = "s3cure_P@ss!")]
    pub password: String,
}

/// How a login request identifies the account.
#[derive(Debug, PartialEq)]
pub enum LoginIdentifier {
    Username(String),
    Email(String),
}

impl LoginRequest {
    pub fn identifier(&self) -> Result<LoginIdentifier, AppError> {
        if self.password.is_empty() {
            return Err(AppError::Validation("Password is required".into()));
        }
        let username = self.username.as_deref().map(str::trim).filter(|s| !s.is_empty());
        let email = self.email.as_deref().map(str::trim).filter(|s| !s.is_empty());
        match (username, email) {
            (Some(u), _) => Ok(LoginIdentifier::Username(normalize_username(u)?)),
            (None, Some(e)) => Ok(LoginIdentifier::Email(normalize_email(e)?)),
            (None, None) => Err(AppError::Validation(
                "Email or username is required".into(),
            )),
        }
    }
}

/// Successful login response.
#[derive(Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub user: PublicUser,
    #[schema(example = "eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9...")]
    pub access_token: String,
    pub refresh_token: String,
}

/// A freshly issued token pair.
#[derive(Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

/// Request body for `POST /users/refresh-token`. The cookie is used when absent.
#[derive(Deserialize, Default, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
    pub refresh_token: Option<String>,
}

/// Request body for `POST /users/change-password`.
#[derive(Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    pub old_password: String,
    pub new_password: String,
}
