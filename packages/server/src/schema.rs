use sea_orm::sea_query::{Index, IndexCreateStatement, PostgresQueryBuilder};
use sea_orm::*;
use tracing::info;

use crate::entity::{comment, like, subscription, video, watch_history};

/// Unique indexes backing the toggle and watch-history upserts. Startup fails
/// without them.
fn unique_indexes() -> Vec<(&'static str, IndexCreateStatement)> {
    vec![
        (
            "uq_like_user_video",
            Index::create()
                .name("uq_like_user_video")
                .table(like::Entity)
                .col(like::Column::LikedBy)
                .col(like::Column::VideoId)
                .unique()
                .to_owned(),
        ),
        (
            "uq_like_user_comment",
            Index::create()
                .name("uq_like_user_comment")
                .table(like::Entity)
                .col(like::Column::LikedBy)
                .col(like::Column::CommentId)
                .unique()
                .to_owned(),
        ),
        (
            "uq_like_user_tweet",
            Index::create()
                .name("uq_like_user_tweet")
                .table(like::Entity)
                .col(like::Column::LikedBy)
                .col(like::Column::TweetId)
                .unique()
                .to_owned(),
        ),
        (
            "uq_subscription_pair",
            Index::create()
                .name("uq_subscription_pair")
                .table(subscription::Entity)
                .col(subscription::Column::SubscriberId)
                .col(subscription::Column::ChannelId)
                .unique()
                .to_owned(),
        ),
        (
            "uq_watch_history_user_video",
            Index::create()
                .name("uq_watch_history_user_video")
                .table(watch_history::Entity)
                .col(watch_history::Column::UserId)
                .col(watch_history::Column::VideoId)
                .unique()
                .to_owned(),
        ),
    ]
}

/// Indexes that only speed up list queries.
fn lookup_indexes() -> Vec<(&'static str, IndexCreateStatement)> {
    vec![
        // Channel video lists: WHERE owner_id = ? ORDER BY created_at DESC
        (
            "idx_video_owner_created",
            Index::create()
                .name("idx_video_owner_created")
                .table(video::Entity)
                .col(video::Column::OwnerId)
                .col(video::Column::CreatedAt)
                .to_owned(),
        ),
        // Comment pages of a video, newest first
        (
            "idx_comment_video_created",
            Index::create()
                .name("idx_comment_video_created")
                .table(comment::Entity)
                .col(comment::Column::VideoId)
                .col(comment::Column::CreatedAt)
                .to_owned(),
        ),
        // Watch history, most recent first
        (
            "idx_watch_history_user_watched",
            Index::create()
                .name("idx_watch_history_user_watched")
                .table(watch_history::Entity)
                .col(watch_history::Column::UserId)
                .col(watch_history::Column::WatchedAt)
                .to_owned(),
        ),
    ]
}

/// Create the composite indexes schema sync does not derive from the entities.
pub async fn ensure_indexes(db: &DatabaseConnection) -> Result<(), DbErr> {
    for (name, mut stmt) in unique_indexes() {
        let sql = stmt.if_not_exists().to_string(PostgresQueryBuilder);
        db.execute_unprepared(&sql).await?;
        info!("Ensured index {} exists", name);
    }

    for (name, mut stmt) in lookup_indexes() {
        let sql = stmt.if_not_exists().to_string(PostgresQueryBuilder);
        match db.execute_unprepared(&sql).await {
            Ok(_) => info!("Ensured index {} exists", name),
            Err(e) => tracing::warn!("Failed to create index {}: {}", name, e),
        }
    }

    Ok(())
}
