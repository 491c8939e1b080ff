use sea_orm::FromQueryResult;
use serde::Serialize;

use crate::models::user::OwnerSummary;

/// Result of a subscription toggle.
#[derive(Serialize, utoipa::ToSchema)]
pub struct SubscriptionToggled {
    /// Whether the requester subscribes to the channel after the toggle.
    pub subscribed: bool,
}

#[derive(Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubscriberList {
    pub subscribers: Vec<OwnerSummary>,
    pub total_subscribers: u64,
}

/// A channel someone subscribes to.
#[derive(Debug, Serialize, FromQueryResult, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChannelSummary {
    pub id: String,
    pub username: String,
    pub fullname: String,
    pub avatar: String,
    /// Counted from subscriptions at read time.
    pub subscribers_count: i64,
}

#[derive(Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubscribedChannels {
    pub channels: Vec<ChannelSummary>,
    pub total_channels: u64,
}
