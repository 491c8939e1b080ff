use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::entity::tweet;
use crate::error::AppError;
use crate::models::shared::{PageMeta, bounded_text};
use crate::models::user::OwnerSummary;

pub const MAX_TWEET_CHARS: usize = 500;

#[derive(Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TweetView {
    pub id: String,
    #[schema(example = "New video dropping tomorrow")]
    pub content: String,
    pub owner: Option<OwnerSummary>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TweetView {
    pub fn new(m: tweet::Model, owner: Option<OwnerSummary>) -> Self {
        Self {
            id: m.id,
            content: m.content,
            owner,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

#[derive(Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TweetPage {
    pub tweets: Vec<TweetView>,
    pub total_tweets: u64,
    #[serde(flatten)]
    pub meta: PageMeta,
}

/// Request body for creating or editing a tweet.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct TweetRequest {
    #[schema(example = "New video dropping tomorrow")]
    pub content: Option<String>,
}

impl TweetRequest {
    /// Trimmed content; blank or overlong content is rejected.
    pub fn content(&self) -> Result<String, AppError> {
        bounded_text(self.content.as_deref().unwrap_or_default(), "Content", MAX_TWEET_CHARS)
    }
}
