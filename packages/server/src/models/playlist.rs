use chrono::{DateTime, Utc};
use sea_orm::FromQueryResult;
use serde::{Deserialize, Serialize};

use crate::entity::playlist;
use crate::error::AppError;
use crate::models::shared::{bounded_text, double_option, require_text};
use crate::models::user::OwnerSummary;
use crate::models::video::VideoView;

const NAME_MAX_CHARS: usize = 128;
const DESCRIPTION_MAX_CHARS: usize = 2000;

/// A playlist without its videos.
#[derive(Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistResponse {
    pub id: String,
    #[schema(example = "Rust talks")]
    pub name: String,
    pub description: Option<String>,
    pub owner_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<playlist::Model> for PlaylistResponse {
    fn from(m: playlist::Model) -> Self {
        Self {
            id: m.id,
            name: m.name,
            description: m.description,
            owner_id: m.owner_id,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

/// A playlist with its videos in order, each with its owner.
#[derive(Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistDetail {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub owner: Option<OwnerSummary>,
    pub videos: Vec<VideoView>,
    pub total_videos: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The fields of a video shown in playlist listings.
#[derive(Clone, Debug, Serialize, FromQueryResult, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistVideoSummary {
    pub id: String,
    pub title: String,
    pub thumbnail: String,
    pub duration: f64,
    pub views: i64,
    pub created_at: DateTime<Utc>,
}

/// One of a user's playlists in `GET /playlist/user/{userId}`.
#[derive(Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserPlaylist {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub owner: Option<OwnerSummary>,
    pub videos: Vec<PlaylistVideoSummary>,
    pub total_videos: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Request body for creating a playlist.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct CreatePlaylistRequest {
    #[schema(example = "Rust talks")]
    pub name: Option<String>,
    pub description: Option<String>,
}

impl CreatePlaylistRequest {
    /// Returns the trimmed name and description; an empty description is dropped.
    pub fn validate(self) -> Result<(String, Option<String>), AppError> {
        let name = require_text(self.name.as_deref(), "Playlist name is required")?;
        let name = bounded_text(&name, "Playlist name", NAME_MAX_CHARS)?;
        let description = validate_description(self.description)?;
        Ok((name, description))
    }
}

/// Request body for `PATCH /playlist/{playlistId}`.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct UpdatePlaylistRequest {
    pub name: Option<String>,
    /// `null` clears the description; absent leaves it unchanged.
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub description: Option<Option<String>>,
}

/// Validated playlist changes.
#[derive(Debug, PartialEq)]
pub struct PlaylistPatch {
    pub name: Option<String>,
    pub description: Option<Option<String>>,
}

impl UpdatePlaylistRequest {
    pub fn validate(self) -> Result<PlaylistPatch, AppError> {
        if self.name.is_none() && self.description.is_none() {
            return Err(AppError::Validation(
                "At least one of name or description is required".into(),
            ));
        }
        let name = self
            .name
            .map(|n| bounded_text(&n, "Playlist name", NAME_MAX_CHARS))
            .transpose()?;
        let description = self.description.map(validate_description).transpose()?;
        Ok(PlaylistPatch { name, description })
    }
}

fn validate_description(description: Option<String>) -> Result<Option<String>, AppError> {
    match description.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(d) => bounded_text(d, "Description", DESCRIPTION_MAX_CHARS).map(Some),
    }
}
