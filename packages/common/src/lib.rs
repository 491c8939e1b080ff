pub mod config;
pub mod retry;
pub mod storage;

pub use config::StorageConfig;
pub use storage::{AssetKey, AssetKind, AssetStore, StorageError, StoredAsset};
