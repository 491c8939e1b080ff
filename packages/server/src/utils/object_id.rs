//! 12-byte entity identifiers rendered as 24 lowercase hex characters.

use chrono::Utc;

use crate::error::AppError;

const ID_BYTES: usize = 12;

/// Generate a new identifier: 4-byte big-endian unix seconds followed by 8 random bytes.
pub fn generate() -> String {
    let mut bytes = [0u8; ID_BYTES];
    let seconds = Utc::now().timestamp().clamp(0, u32::MAX as i64) as u32;
    bytes[..4].copy_from_slice(&seconds.to_be_bytes());
    bytes[4..].copy_from_slice(&rand::random::<[u8; 8]>());
    hex::encode(bytes)
}

/// Whether `s` has the shape of an identifier.
pub fn is_valid(s: &str) -> bool {
    s.len() == ID_BYTES * 2 && s.bytes().all(|b| b.is_ascii_hexdigit())
}

/// Validate an identifier taken from a request, normalizing it to lowercase.
///
/// `thing` names the entity in the error message, e.g. `"video"` gives
/// "Invalid video ID".
pub fn parse(s: &str, thing: &str) -> Result<String, AppError> {
    let s = s.trim();
    if !is_valid(s) {
        return Err(AppError::Validation(format!("Invalid {thing} ID")));
    }
    Ok(s.to_ascii_lowercase())
}
