use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::entity::video;
use crate::error::AppError;
use crate::models::shared::{PageMeta, bounded_text};
use crate::models::user::OwnerSummary;

pub const MAX_TITLE_CHARS: usize = 200;
pub const MAX_DESCRIPTION_CHARS: usize = 5000;

/// A video with its owner resolved.
#[derive(Clone, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VideoView {
    #[schema(example = "65a1b2c3d4e5f60718293a4b")]
    pub id: String,
    /// URI of the video file.
    pub video_file: String,
    /// URI of the thumbnail image.
    pub thumbnail: String,
    #[schema(example = "Building a parser in an afternoon")]
    pub title: String,
    pub description: String,
    /// Length in seconds.
    #[schema(example = 754.2)]
    pub duration: f64,
    #[schema(example = 1024)]
    pub views: i64,
    pub is_published: bool,
    /// `null` when the owner no longer exists.
    pub owner: Option<OwnerSummary>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl VideoView {
    pub fn new(m: video::Model, owner: Option<OwnerSummary>) -> Self {
        Self {
            id: m.id,
            video_file: m.video_file_url,
            thumbnail: m.thumbnail_url,
            title: m.title,
            description: m.description,
            duration: m.duration,
            views: m.views,
            is_published: m.is_published,
            owner,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

/// A page of videos.
#[derive(Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VideoPage {
    pub videos: Vec<VideoView>,
    /// Number of videos matching the filter, independent of paging.
    pub total_videos: u64,
    #[serde(flatten)]
    pub meta: PageMeta,
}

/// Query parameters for `GET /videos`.
#[derive(Debug, Default, Deserialize, utoipa::IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct VideoListQuery {
    /// Page number, 1-based. Default: 1.
    pub page: Option<String>,
    /// Page size. Default: 10, capped at the configured maximum.
    pub limit: Option<String>,
    /// Case-insensitive substring matched against title and description.
    pub query: Option<String>,
    /// One of `createdAt`, `updatedAt`, `title`, `views`, `duration`. Default: `createdAt`.
    pub sort_by: Option<String>,
    /// `asc` or `desc`. Default: `desc`.
    pub sort_type: Option<String>,
    /// Only videos owned by this user.
    pub user_id: Option<String>,
}

/// Text fields of a video form.
#[derive(Debug, Default, PartialEq)]
pub struct VideoPatch {
    pub title: Option<String>,
    pub description: Option<String>,
}

impl VideoPatch {
    /// Validate whichever fields are present; present fields must not be blank.
    pub fn from_form(title: Option<&str>, description: Option<&str>) -> Result<Self, AppError> {
        Ok(Self {
            title: title
                .map(|t| bounded_text(t, "Title", MAX_TITLE_CHARS))
                .transpose()?,
            description: description
                .map(|d| bounded_text(d, "Description", MAX_DESCRIPTION_CHARS))
                .transpose()?,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.description.is_none()
    }
}

/// Parse the optional `duration` form field, in seconds.
/// Media files are not inspected, so a missing duration is `0`.
pub fn parse_duration(raw: Option<&str>) -> Result<f64, AppError> {
    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return Ok(0.0);
    };
    match raw.parse::<f64>() {
        Ok(d) if d.is_finite() && d >= 0.0 => Ok(d),
        _ => Err(AppError::Validation(
            "Duration must be a non-negative number of seconds".into(),
        )),
    }
}
