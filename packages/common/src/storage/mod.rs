mod error;
mod key;
mod traits;

pub mod filesystem;

pub use error::StorageError;
pub use filesystem::FilesystemAssetStore;
pub use key::{AssetKey, AssetKind};
pub use traits::{AssetStore, BoxReader, StoredAsset};
