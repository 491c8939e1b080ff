use std::path::PathBuf;

use serde::Deserialize;

/// Binary asset store configuration.
#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    /// Directory that holds stored assets. Default: "./data/assets".
    #[serde(default = "default_root")]
    pub root: PathBuf,
    /// Public URL prefix the assets are served under. Default: "http://127.0.0.1:8000/assets".
    #[serde(default = "default_public_url")]
    pub public_url: String,
    /// Directory for in-flight multipart uploads. Default: "./data/tmp".
    #[serde(default = "default_temp_dir")]
    pub temp_dir: PathBuf,
    /// Largest accepted file in bytes. Default: 512 MiB.
    #[serde(default = "default_max_file_size")]
    pub max_file_size: u64,
    /// Upper bound for a single upload into the store. Default: 120 seconds.
    #[serde(default = "default_upload_timeout_secs")]
    pub upload_timeout_secs: u64,
}

fn default_root() -> PathBuf {
    PathBuf::from("./data/assets")
}
fn default_public_url() -> String {
    "http://127.0.0.1:8000/assets".into()
}
fn default_temp_dir() -> PathBuf {
    PathBuf::from("./data/tmp")
}
fn default_max_file_size() -> u64 {
    512 * 1024 * 1024
}
fn default_upload_timeout_secs() -> u64 {
    120
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            root: default_root(),
            public_url: default_public_url(),
            temp_dir: default_temp_dir(),
            max_file_size: default_max_file_size(),
            upload_timeout_secs: default_upload_timeout_secs(),
        }
    }
}
