use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use tokio::io::BufReader;

use super::error::StorageError;
use super::key::{AssetKey, AssetKind};
use super::traits::{AssetStore, BoxReader, StoredAsset};

/// Filesystem-backed asset store.
///
/// Assets are stored in a sharded directory layout:
/// `{base_path}/{kind}/{first 2 hex chars}/{key}`
pub struct FilesystemAssetStore {
    base_path: PathBuf,
    public_url: String,
    max_size: u64,
}

impl FilesystemAssetStore {
    /// Create a new filesystem asset store.
    pub async fn new(
        base_path: PathBuf,
        public_url: impl Into<String>,
        max_size: u64,
    ) -> Result<Self, StorageError> {
        fs::create_dir_all(&base_path).await?;
        fs::create_dir_all(base_path.join(".tmp")).await?;
        Ok(Self {
            base_path,
            public_url: public_url.into().trim_end_matches('/').to_string(),
            max_size,
        })
    }

    /// Compute the filesystem path for a given key.
    fn asset_path(&self, key: &AssetKey, kind: AssetKind) -> PathBuf {
        self.base_path
            .join(kind.as_str())
            .join(key.shard_prefix())
            .join(key.to_string())
    }

    /// Path for a temporary file during writes.
    fn temp_path(&self) -> PathBuf {
        self.base_path
            .join(".tmp")
            .join(uuid::Uuid::new_v4().to_string())
    }

    fn url_for(&self, key: &AssetKey, kind: AssetKind) -> String {
        format!("{}/{}/{}", self.public_url, kind, key)
    }
}

#[async_trait]
impl AssetStore for FilesystemAssetStore {
    async fn upload(&self, path: &Path, kind: AssetKind) -> Result<StoredAsset, StorageError> {
        let size = fs::metadata(path).await?.len();
        if size > self.max_size {
            return Err(StorageError::SizeLimitExceeded {
                actual: size,
                limit: self.max_size,
            });
        }

        let extension = path.extension().and_then(|e| e.to_str());
        let key = AssetKey::generate(extension);
        let asset_path = self.asset_path(&key, kind);

        let temp_path = self.temp_path();
        if let Err(e) = fs::copy(path, &temp_path).await {
            let _ = fs::remove_file(&temp_path).await;
            return Err(e.into());
        }

        if let Some(parent) = asset_path.parent() {
            fs::create_dir_all(parent).await?;
        }

        if let Err(e) = fs::rename(&temp_path, &asset_path).await {
            let _ = fs::remove_file(&temp_path).await;
            return Err(e.into());
        }

        tracing::debug!(%key, %kind, size, "Stored asset");

        Ok(StoredAsset {
            url: self.url_for(&key, kind),
            key,
        })
    }

    async fn delete(&self, key: &AssetKey, kind: AssetKind) -> Result<bool, StorageError> {
        let asset_path = self.asset_path(key, kind);
        match fs::remove_file(&asset_path).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    async fn open(&self, key: &AssetKey, kind: AssetKind) -> Result<BoxReader, StorageError> {
        let asset_path = self.asset_path(key, kind);
        match fs::File::open(&asset_path).await {
            Ok(file) => Ok(Box::new(BufReader::new(file))),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(StorageError::NotFound(key.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }
}
