use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use axum::extract::Multipart;
use axum::extract::multipart::Field;
use chrono::Utc;
use sea_orm::{ActiveModelTrait, ConnectionTrait, Set};
use tokio::io::AsyncWriteExt;
use vidhub_common::{AssetKey, AssetKind, StoredAsset};

use crate::entity::orphaned_asset;
use crate::error::AppError;
use crate::state::AppState;
use crate::utils::object_id;

/// A multipart file spooled to local disk. The file is removed when the
/// guard is dropped, whatever happened to the upload.
#[derive(Debug)]
pub struct TempUpload {
    path: PathBuf,
    size: u64,
}

impl TempUpload {
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn size(&self) -> u64 {
        self.size
    }
}

impl Drop for TempUpload {
    fn drop(&mut self) {
        if let Err(e) = std::fs::remove_file(&self.path)
            && e.kind() != std::io::ErrorKind::NotFound
        {
            tracing::warn!(path = %self.path.display(), error = %e, "Failed to remove temp upload");
        }
    }
}

/// Text fields and spooled files of a multipart request.
#[derive(Debug, Default)]
pub struct UploadForm {
    text: HashMap<String, String>,
    files: HashMap<String, TempUpload>,
}

impl UploadForm {
    pub fn text(&self, name: &str) -> Option<&str> {
        self.text.get(name).map(String::as_str)
    }

    pub fn take_file(&mut self, name: &str) -> Option<TempUpload> {
        self.files.remove(name)
    }

    pub fn require_file(&mut self, name: &str) -> Result<TempUpload, AppError> {
        self.take_file(name)
            .ok_or_else(|| AppError::Validation(format!("{name} file is required")))
    }
}

/// Read a whole multipart request. Fields named in `file_fields` are spooled
/// to `temp_dir`; every other field is read as text. Empty file parts count
/// as absent.
pub async fn read_form(
    mut multipart: Multipart,
    file_fields: &[&str],
    temp_dir: &Path,
    max_size: u64,
) -> Result<UploadForm, AppError> {
    let mut form = UploadForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Multipart error: {e}")))?
    {
        let Some(name) = field.name().map(str::to_owned) else {
            continue;
        };

        if file_fields.contains(&name.as_str()) {
            let upload = spool_field(field, temp_dir, max_size).await?;
            if upload.size() > 0 {
                form.files.insert(name, upload);
            }
        } else {
            let text = field
                .text()
                .await
                .map_err(|e| AppError::Validation(format!("Failed to read {name}: {e}")))?;
            form.text.insert(name, text);
        }
    }

    Ok(form)
}

async fn spool_field(
    mut field: Field<'_>,
    temp_dir: &Path,
    max_size: u64,
) -> Result<TempUpload, AppError> {
    tokio::fs::create_dir_all(temp_dir)
        .await
        .map_err(|e| AppError::Internal(format!("Failed to create temp dir: {e}")))?;

    // The extension survives into the asset key so content types can be guessed later.
    let extension = field
        .file_name()
        .and_then(|name| Path::new(name).extension())
        .and_then(|ext| ext.to_str())
        .filter(|ext| ext.len() <= 10 && ext.chars().all(|c| c.is_ascii_alphanumeric()))
        .map(|ext| format!(".{}", ext.to_ascii_lowercase()))
        .unwrap_or_default();
    let path = temp_dir.join(format!("vidhub-upload-{}{}", uuid::Uuid::new_v4(), extension));

    let mut file = tokio::fs::File::create(&path)
        .await
        .map_err(|e| AppError::Internal(format!("Failed to create temp file: {e}")))?;
    let mut upload = TempUpload { path, size: 0 };

    while let Some(chunk) = field
        .chunk()
        .await
        .map_err(|e| AppError::Validation(format!("Upload read error: {e}")))?
    {
        upload.size += chunk.len() as u64;
        if upload.size > max_size {
            return Err(AppError::Validation(format!(
                "File exceeds maximum size of {max_size} bytes"
            )));
        }
        file.write_all(&chunk)
            .await
            .map_err(|e| AppError::Internal(format!("Temp file write failed: {e}")))?;
    }

    file.flush()
        .await
        .map_err(|e| AppError::Internal(format!("Temp file flush failed: {e}")))?;

    Ok(upload)
}

/// Push a spooled file into the asset store, bounded by the configured timeout.
pub async fn upload_asset(
    state: &AppState,
    upload: &TempUpload,
    kind: AssetKind,
) -> Result<StoredAsset, AppError> {
    let timeout = Duration::from_secs(state.config.storage.upload_timeout_secs);
    match tokio::time::timeout(timeout, state.assets.upload(upload.path(), kind)).await {
        Ok(result) => Ok(result?),
        Err(_) => Err(AppError::Internal(format!(
            "Asset upload timed out after {}s",
            timeout.as_secs()
        ))),
    }
}

/// Delete an asset without failing the caller. A failed deletion is
/// recorded in `orphaned_asset` for the maintenance sweep to retry.
pub async fn discard_asset<C: ConnectionTrait>(state: &AppState, db: &C, key: &str, kind: AssetKind) {
    let error = match AssetKey::parse(key) {
        Ok(parsed) => match state.assets.delete(&parsed, kind).await {
            Ok(_) => return,
            Err(e) => e.to_string(),
        },
        Err(e) => {
            tracing::warn!(key, %kind, error = %e, "Not deleting asset with malformed key");
            return;
        }
    };

    tracing::warn!(key, %kind, error = %error, "Asset deletion failed, queued for retry");

    let now = Utc::now();
    let orphan = orphaned_asset::ActiveModel {
        id: Set(object_id::generate()),
        key: Set(key.to_owned()),
        kind: Set(kind.as_str().to_owned()),
        attempts: Set(1),
        last_error: Set(Some(error)),
        next_attempt_at: Set(now),
        created_at: Set(now),
    };
    if let Err(e) = orphan.insert(db).await {
        tracing::error!(key, %kind, error = %e, "Failed to record orphaned asset");
    }
}

/// Best-effort cleanup of assets uploaded for a request that then failed.
pub async fn discard_uploaded(state: &AppState, assets: &[(&StoredAsset, AssetKind)]) {
    for (asset, kind) in assets {
        discard_asset(state, &state.db, &asset.key.to_string(), *kind).await;
    }
}
