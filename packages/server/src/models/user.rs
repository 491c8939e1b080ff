use chrono::{DateTime, Utc};
use sea_orm::FromQueryResult;
use serde::{Deserialize, Serialize};

use crate::entity::user;
use crate::error::AppError;

/// Projection of a user embedded wherever a record surfaces its owner.
/// Never carries credentials.
#[derive(Clone, Debug, Serialize, FromQueryResult, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OwnerSummary {
    #[schema(example = "65a1b2c3d4e5f60718293a4b")]
    pub id: String,
    #[schema(example = "alice")]
    pub username: String,
    #[schema(example = "Alice Liddell")]
    pub fullname: String,
    /// Avatar URI.
    pub avatar: String,
}

/// A user as shown to themselves.
#[derive(Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PublicUser {
    #[schema(example = "65a1b2c3d4e5f60718293a4b")]
    pub id: String,
    #[schema(example = "alice")]
    pub username: String,
    #[schema(example = "alice@example.com")]
    pub email: String,
    #[schema(example = "Alice Liddell")]
    pub fullname: String,
    pub avatar: String,
    pub cover_image: Option<String>,
    pub subscribers_count: i64,
    pub channels_subscribed_to_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<user::Model> for PublicUser {
    fn from(m: user::Model) -> Self {
        Self {
            id: m.id,
            username: m.username,
            email: m.email,
            fullname: m.fullname,
            avatar: m.avatar_url,
            cover_image: m.cover_image_url,
            subscribers_count: m.subscribers_count,
            channels_subscribed_to_count: m.channels_subscribed_to_count,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

/// A user's public channel page.
#[derive(Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChannelProfile {
    pub id: String,
    pub username: String,
    pub fullname: String,
    pub email: String,
    pub avatar: String,
    pub cover_image: Option<String>,
    /// Counted from subscriptions at read time.
    pub subscribers_count: i64,
    /// Counted from subscriptions at read time.
    pub channels_subscribed_to_count: i64,
    /// Whether the requesting user subscribes to this channel. `false` for anonymous requests.
    pub is_subscribed: bool,
    pub created_at: DateTime<Utc>,
}

/// Request body for `PATCH /users/update-account`.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct UpdateAccountRequest {
    #[schema(example = "Alice P. Liddell")]
    pub fullname: Option<String>,
    #[schema(example = "alice@wonderland.example")]
    pub email: Option<String>,
}

/// Validated account changes.
#[derive(Debug, PartialEq)]
pub struct AccountPatch {
    pub fullname: Option<String>,
    pub email: Option<String>,
}

impl UpdateAccountRequest {
    pub fn validate(self) -> Result<AccountPatch, AppError> {
        if self.fullname.is_none() && self.email.is_none() {
            return Err(AppError::Validation(
                "At least one of fullname or email is required".into(),
            ));
        }
        let fullname = self
            .fullname
            .map(|f| validate_fullname(&f))
            .transpose()?;
        let email = self.email.map(|e| normalize_email(&e)).transpose()?;
        Ok(AccountPatch { fullname, email })
    }
}

pub fn normalize_username(username: &str) -> Result<String, AppError> {
    let username = username.trim().to_lowercase();
    if username.is_empty() || username.chars().count() > 32 {
        return Err(AppError::Validation(
            "Username must be 1-32 characters".into(),
        ));
    }
    if !username
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.')
    {
        return Err(AppError::Validation(
            "Username must contain only letters, digits, dots and underscores".into(),
        ));
    }
    Ok(username)
}

pub fn normalize_email(email: &str) -> Result<String, AppError> {
    let email = email.trim().to_lowercase();
    let valid = email.len() <= 254
        && !email.chars().any(char::is_whitespace)
        && matches!(email.split_once('@'), Some((local, domain))
            if !local.is_empty() && domain.contains('.') && !domain.contains('@')
                && !domain.starts_with('.') && !domain.ends_with('.'));
    if !valid {
        return Err(AppError::Validation("Email is invalid".into()));
    }
    Ok(email)
}

pub fn validate_fullname(fullname: &str) -> Result<String, AppError> {
    let fullname = fullname.trim();
    if fullname.is_empty() || fullname.chars().count() > 64 {
        return Err(AppError::Validation(
            "Fullname must be 1-64 characters".into(),
        ));
    }
    Ok(fullname.to_owned())
}

pub fn validate_password(password: &str) -> Result<(), AppError> {
    if password.len() < 8 || password.len() > 128 {
        return Err(AppError::Validation(
            "Password must be 8-128 characters".into(),
        ));
    }
    Ok(())
}
