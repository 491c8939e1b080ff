use std::fmt;
use std::str::FromStr;

use super::error::StorageError;

const KEY_BYTES: usize = 16;
const MAX_EXTENSION_LEN: usize = 10;

/// Opaque, deletable handle of a stored asset.
///
/// Rendered as 32 lowercase hex characters, optionally followed by a
/// `.ext` suffix kept from the uploaded file so content types survive.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct AssetKey {
    id: [u8; KEY_BYTES],
    extension: Option<String>,
}

impl AssetKey {
    /// Generate a fresh random key, keeping `extension` when it is a sane file extension.
    pub fn generate(extension: Option<&str>) -> Self {
        Self {
            id: rand::random(),
            extension: extension.and_then(sanitize_extension),
        }
    }

    /// Parse a key previously produced by [`AssetKey::to_string`].
    pub fn parse(s: &str) -> Result<Self, StorageError> {
        let (hex_part, extension) = match s.split_once('.') {
            Some((hex_part, ext)) => {
                let ext = sanitize_extension(ext)
                    .filter(|clean| clean == ext)
                    .ok_or_else(|| StorageError::InvalidKey(format!("bad extension in {s:?}")))?;
                (hex_part, Some(ext))
            }
            None => (s, None),
        };

        if hex_part.len() != KEY_BYTES * 2 {
            return Err(StorageError::InvalidKey(format!(
                "expected {} hex characters, got {}",
                KEY_BYTES * 2,
                hex_part.len()
            )));
        }

        let bytes = hex::decode(hex_part)
            .map_err(|e| StorageError::InvalidKey(format!("invalid hex: {e}")))?;
        let id: [u8; KEY_BYTES] = bytes
            .try_into()
            .map_err(|_| StorageError::InvalidKey("decoded to wrong length".into()))?;

        Ok(Self { id, extension })
    }

    /// First 2 hex characters, used as the shard directory.
    pub fn shard_prefix(&self) -> String {
        hex::encode(&self.id[..1])
    }

    pub fn extension(&self) -> Option<&str> {
        self.extension.as_deref()
    }
}

fn sanitize_extension(ext: &str) -> Option<String> {
    let ext = ext.trim().to_ascii_lowercase();
    if ext.is_empty()
        || ext.len() > MAX_EXTENSION_LEN
        || !ext.chars().all(|c| c.is_ascii_alphanumeric())
    {
        return None;
    }
    Some(ext)
}

impl fmt::Display for AssetKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.id))?;
        if let Some(ext) = &self.extension {
            write!(f, ".{ext}")?;
        }
        Ok(())
    }
}

impl fmt::Debug for AssetKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AssetKey({self})")
    }
}

impl FromStr for AssetKey {
    type Err = StorageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// The class of an asset, mirroring how the store partitions its content.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AssetKind {
    Image,
    Video,
}

impl AssetKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AssetKind::Image => "image",
            AssetKind::Video => "video",
        }
    }
}

impl fmt::Display for AssetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AssetKind {
    type Err = StorageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "image" => Ok(AssetKind::Image),
            "video" => Ok(AssetKind::Video),
            other => Err(StorageError::InvalidKind(other.to_string())),
        }
    }
}
