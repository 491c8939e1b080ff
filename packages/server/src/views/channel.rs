//! Per-user aggregates: channel profile, subscriber lists, dashboard statistics.

use sea_orm::*;

use crate::entity::{subscription, user};
use crate::models::dashboard::{ChannelStats, DashboardVideo};
use crate::models::subscription::ChannelSummary;
use crate::models::user::{ChannelProfile, OwnerSummary};
use crate::views::owner::load_owners;

/// Subscriptions pointing at `channel_id`.
pub async fn count_subscribers<C: ConnectionTrait>(db: &C, channel_id: &str) -> Result<u64, DbErr> {
    subscription::Entity::find()
        .filter(subscription::Column::ChannelId.eq(channel_id))
        .count(db)
        .await
}

/// Subscriptions made by `subscriber_id`.
pub async fn count_subscriptions<C: ConnectionTrait>(
    db: &C,
    subscriber_id: &str,
) -> Result<u64, DbErr> {
    subscription::Entity::find()
        .filter(subscription::Column::SubscriberId.eq(subscriber_id))
        .count(db)
        .await
}

pub async fn is_subscribed<C: ConnectionTrait>(
    db: &C,
    subscriber_id: &str,
    channel_id: &str,
) -> Result<bool, DbErr> {
    let found = subscription::Entity::find()
        .filter(subscription::Column::SubscriberId.eq(subscriber_id))
        .filter(subscription::Column::ChannelId.eq(channel_id))
        .one(db)
        .await?;
    Ok(found.is_some())
}

/// Channel page of `username`, with counts recomputed from subscriptions.
pub async fn channel_profile<C: ConnectionTrait>(
    db: &C,
    username: &str,
    viewer: Option<&str>,
) -> Result<Option<ChannelProfile>, DbErr> {
    let Some(channel) = user::Entity::find()
        .filter(user::Column::Username.eq(username))
        .one(db)
        .await?
    else {
        return Ok(None);
    };

    let subscribers_count = count_subscribers(db, &channel.id).await?;
    let channels_subscribed_to_count = count_subscriptions(db, &channel.id).await?;
    let is_subscribed = match viewer {
        Some(viewer) => is_subscribed(db, viewer, &channel.id).await?,
        None => false,
    };

    Ok(Some(ChannelProfile {
        id: channel.id,
        username: channel.username,
        fullname: channel.fullname,
        email: channel.email,
        avatar: channel.avatar_url,
        cover_image: channel.cover_image_url,
        subscribers_count: subscribers_count as i64,
        channels_subscribed_to_count: channels_subscribed_to_count as i64,
        is_subscribed,
        created_at: channel.created_at,
    }))
}

/// Users subscribed to `channel_id`, most recent subscription first.
/// Subscriptions whose subscriber vanished are skipped.
pub async fn subscribers_of<C: ConnectionTrait>(
    db: &C,
    channel_id: &str,
) -> Result<Vec<OwnerSummary>, DbErr> {
    let ids: Vec<String> = subscription::Entity::find()
        .select_only()
        .column(subscription::Column::SubscriberId)
        .filter(subscription::Column::ChannelId.eq(channel_id))
        .order_by_desc(subscription::Column::CreatedAt)
        .into_tuple()
        .all(db)
        .await?;

    let mut owners = load_owners(db, ids.iter().map(String::as_str)).await?;
    Ok(ids.iter().filter_map(|id| owners.remove(id)).collect())
}

const SUBSCRIBED_CHANNELS_SQL: &str = r#"
SELECT u.id, u.username, u.fullname, u.avatar_url AS avatar,
       (SELECT COUNT(*) FROM "subscription" c WHERE c.channel_id = u.id)::BIGINT AS subscribers_count
FROM "subscription" s
JOIN "user" u ON u.id = s.channel_id
WHERE s.subscriber_id = $1
ORDER BY s.created_at DESC
"#;

/// Channels `subscriber_id` subscribes to, each with its live subscriber count.
pub async fn channels_of<C: ConnectionTrait>(
    db: &C,
    subscriber_id: &str,
) -> Result<Vec<ChannelSummary>, DbErr> {
    ChannelSummary::find_by_statement(Statement::from_sql_and_values(
        DbBackend::Postgres,
        SUBSCRIBED_CHANNELS_SQL,
        [subscriber_id.into()],
    ))
    .all(db)
    .await
}

#[derive(Debug, FromQueryResult)]
struct VideoTotals {
    total_videos: i64,
    total_views: i64,
    total_likes: i64,
}

// One pass over the owner's videos. COUNT/COALESCE keep the row present
// with zeros when there are no videos.
const VIDEO_TOTALS_SQL: &str = r#"
SELECT COUNT(*)::BIGINT AS total_videos,
       COALESCE(SUM(v.views), 0)::BIGINT AS total_views,
       COALESCE(SUM((SELECT COUNT(*) FROM "like" l WHERE l.video_id = v.id)), 0)::BIGINT AS total_likes
FROM "video" v
WHERE v.owner_id = $1
"#;

/// Statistics of the channel owned by `owner_id`.
pub async fn channel_stats<C: ConnectionTrait>(db: &C, owner_id: &str) -> Result<ChannelStats, DbErr> {
    let total_subscribers = count_subscribers(db, owner_id).await?;

    let totals = VideoTotals::find_by_statement(Statement::from_sql_and_values(
        DbBackend::Postgres,
        VIDEO_TOTALS_SQL,
        [owner_id.into()],
    ))
    .one(db)
    .await?;

    Ok(stats_from(total_subscribers, totals))
}

fn stats_from(total_subscribers: u64, totals: Option<VideoTotals>) -> ChannelStats {
    let totals = totals.unwrap_or(VideoTotals {
        total_videos: 0,
        total_views: 0,
        total_likes: 0,
    });
    ChannelStats {
        total_subscribers: total_subscribers as i64,
        total_videos: totals.total_videos,
        total_views: totals.total_views,
        total_likes: totals.total_likes,
    }
}

const DASHBOARD_VIDEOS_SQL: &str = r#"
SELECT v.id, v.title, v.description, v.thumbnail_url AS thumbnail, v.views, v.duration,
       v.is_published, v.created_at,
       (SELECT COUNT(*) FROM "like" l WHERE l.video_id = v.id)::BIGINT AS likes_count
FROM "video" v
WHERE v.owner_id = $1
ORDER BY v.created_at DESC, v.id DESC
"#;

/// All videos of `owner_id`, including unpublished ones, newest first.
pub async fn dashboard_videos<C: ConnectionTrait>(
    db: &C,
    owner_id: &str,
) -> Result<Vec<DashboardVideo>, DbErr> {
    DashboardVideo::find_by_statement(Statement::from_sql_and_values(
        DbBackend::Postgres,
        DASHBOARD_VIDEOS_SQL,
        [owner_id.into()],
    ))
    .all(db)
    .await
}

/// Does a user with this id exist?
pub async fn user_exists<C: ConnectionTrait>(db: &C, id: &str) -> Result<bool, DbErr> {
    let count = user::Entity::find()
        .filter(user::Column::Id.eq(id))
        .count(db)
        .await?;
    Ok(count > 0)
}
