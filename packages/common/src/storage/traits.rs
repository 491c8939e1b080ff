use std::path::Path;

use async_trait::async_trait;
use tokio::io::AsyncRead;

use super::error::StorageError;
use super::key::{AssetKey, AssetKind};

/// Type alias for a boxed async reader.
pub type BoxReader = Box<dyn AsyncRead + Unpin + Send>;

/// Where an uploaded asset ended up.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StoredAsset {
    /// Stable URI clients fetch the asset from.
    pub url: String,
    /// Handle needed to delete the asset later.
    pub key: AssetKey,
}

/// Store for binary assets (videos, thumbnails, avatars, cover images).
#[async_trait]
pub trait AssetStore: Send + Sync {
    /// Copy the local file at `path` into the store.
    async fn upload(&self, path: &Path, kind: AssetKind) -> Result<StoredAsset, StorageError>;

    /// Delete an asset.
    ///
    /// Returns `true` if the asset was deleted, `false` if it did not exist.
    async fn delete(&self, key: &AssetKey, kind: AssetKind) -> Result<bool, StorageError>;

    /// Open an asset for streaming.
    async fn open(&self, key: &AssetKey, kind: AssetKind) -> Result<BoxReader, StorageError>;
}
