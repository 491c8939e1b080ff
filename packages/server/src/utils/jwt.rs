use anyhow::{Context, Result};
use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::entity::user;

/// Claims carried by an access token.
#[derive(Debug, Serialize, Deserialize)]
pub struct AccessClaims {
    pub sub: String, // User ID
    pub username: String,
    pub email: String,
    pub fullname: String,
    pub exp: usize,
}

/// Claims carried by a refresh token.
#[derive(Debug, Serialize, Deserialize)]
pub struct RefreshClaims {
    pub sub: String,
    /// Random per-token nonce so that rotation always yields a new token.
    pub jti: String,
    pub exp: usize,
}

fn expiry(ttl: Duration) -> Result<usize> {
    let exp = Utc::now()
        .checked_add_signed(ttl)
        .context("token expiry overflows")?
        .timestamp();
    Ok(exp as usize)
}

/// Sign a new access token for a user.
pub fn sign_access(user: &user::Model, secret: &str, ttl_minutes: i64) -> Result<String> {
    let claims = AccessClaims {
        sub: user.id.clone(),
        username: user.username.clone(),
        email: user.email.clone(),
        fullname: user.fullname.clone(),
        exp: expiry(Duration::minutes(ttl_minutes))?,
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?;
    Ok(token)
}

/// Verify and decode an access token.
pub fn verify_access(token: &str, secret: &str) -> Result<AccessClaims> {
    let data = decode::<AccessClaims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )?;
    Ok(data.claims)
}

/// Sign a new refresh token for a user.
pub fn sign_refresh(user_id: &str, secret: &str, ttl_days: i64) -> Result<String> {
    let claims = RefreshClaims {
        sub: user_id.to_owned(),
        jti: uuid::Uuid::new_v4().simple().to_string(),
        exp: expiry(Duration::days(ttl_days))?,
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?;
    Ok(token)
}

/// Verify and decode a refresh token.
pub fn verify_refresh(token: &str, secret: &str) -> Result<RefreshClaims> {
    let data = decode::<RefreshClaims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )?;
    Ok(data.claims)
}
