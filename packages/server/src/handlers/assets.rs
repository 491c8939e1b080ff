use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::{StatusCode, header};
use axum::response::Response;
use tokio_util::io::ReaderStream;
use tracing::instrument;
use vidhub_common::{AssetKey, AssetKind};

use crate::error::AppError;
use crate::state::AppState;

/// Stream a stored image or video. Malformed kinds and keys are reported as
/// missing, so no path outside the store can be addressed.
#[instrument(skip(state))]
pub async fn serve_asset(
    State(state): State<AppState>,
    Path((kind, key)): Path<(String, String)>,
) -> Result<Response, AppError> {
    let kind: AssetKind = kind.parse()?;
    let key = AssetKey::parse(&key)?;

    let reader = state.assets.open(&key, kind).await?;
    let mime = mime_guess::from_path(key.to_string()).first_or_octet_stream();

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, mime.as_ref())
        .header(header::CACHE_CONTROL, "public, max-age=31536000, immutable")
        .body(Body::from_stream(ReaderStream::new(reader)))
        .map_err(|e| AppError::Internal(e.to_string()))
}
