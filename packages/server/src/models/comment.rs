use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::entity::comment;
use crate::error::AppError;
use crate::models::shared::{PageMeta, bounded_text};
use crate::models::user::OwnerSummary;

pub const MAX_COMMENT_CHARS: usize = 2000;

#[derive(Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CommentView {
    pub id: String,
    #[schema(example = "Great explanation!")]
    pub content: String,
    pub video_id: String,
    pub owner: Option<OwnerSummary>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CommentView {
    pub fn new(m: comment::Model, owner: Option<OwnerSummary>) -> Self {
        Self {
            id: m.id,
            content: m.content,
            video_id: m.video_id,
            owner,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

#[derive(Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CommentPage {
    pub comments: Vec<CommentView>,
    pub total_comments: u64,
    #[serde(flatten)]
    pub meta: PageMeta,
}

/// Request body for creating or editing a comment.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct CommentRequest {
    #[schema(example = "Great explanation!")]
    pub content: Option<String>,
}

impl CommentRequest {
    /// Trimmed content; blank or overlong content is rejected.
    pub fn content(&self) -> Result<String, AppError> {
        bounded_text(self.content.as_deref().unwrap_or_default(), "Content", MAX_COMMENT_CHARS)
    }
}
