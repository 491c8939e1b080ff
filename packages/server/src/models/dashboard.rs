use chrono::{DateTime, Utc};
use sea_orm::FromQueryResult;
use serde::Serialize;

/// Aggregate statistics of the requesting user's channel.
#[derive(Debug, Default, PartialEq, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChannelStats {
    #[schema(example = 12)]
    pub total_subscribers: i64,
    #[schema(example = 4)]
    pub total_videos: i64,
    #[schema(example = 5120)]
    pub total_views: i64,
    #[schema(example = 87)]
    pub total_likes: i64,
}

/// One of the requesting user's own videos, published or not.
#[derive(Debug, Serialize, FromQueryResult, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DashboardVideo {
    pub id: String,
    pub title: String,
    pub description: String,
    pub thumbnail: String,
    pub views: i64,
    pub duration: f64,
    pub is_published: bool,
    pub likes_count: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DashboardVideos {
    pub videos: Vec<DashboardVideo>,
    pub total_videos: u64,
}
