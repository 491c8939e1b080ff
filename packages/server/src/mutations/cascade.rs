//! Gated deletes that also remove the records hanging off the deleted one.

use sea_orm::*;

use crate::entity::{comment, like, playlist, playlist_video, tweet, video, watch_history};
use crate::error::AppError;
use crate::mutations::owned::{OwnedBy, delete_owned};

/// Delete a video with its comments, every like on the video or its
/// comments, its playlist entries and watch-history entries.
///
/// Stored assets are left to the caller, to be removed after commit.
pub async fn delete_video(db: &DatabaseConnection, key: OwnedBy<'_>) -> Result<video::Model, AppError> {
    let txn = db.begin().await?;

    let video = delete_owned::<video::Entity, _>(&txn, key).await?;

    let comment_ids: Vec<String> = comment::Entity::find()
        .select_only()
        .column(comment::Column::Id)
        .filter(comment::Column::VideoId.eq(video.id.as_str()))
        .into_tuple()
        .all(&txn)
        .await?;

    let mut likes = Condition::any().add(like::Column::VideoId.eq(video.id.as_str()));
    if !comment_ids.is_empty() {
        likes = likes.add(like::Column::CommentId.is_in(comment_ids.iter().map(String::as_str)));
    }
    let removed_likes = like::Entity::delete_many().filter(likes).exec(&txn).await?;

    let removed_comments = comment::Entity::delete_many()
        .filter(comment::Column::VideoId.eq(video.id.as_str()))
        .exec(&txn)
        .await?;

    playlist_video::Entity::delete_many()
        .filter(playlist_video::Column::VideoId.eq(video.id.as_str()))
        .exec(&txn)
        .await?;

    watch_history::Entity::delete_many()
        .filter(watch_history::Column::VideoId.eq(video.id.as_str()))
        .exec(&txn)
        .await?;

    txn.commit().await?;

    tracing::info!(
        video_id = %video.id,
        comments = removed_comments.rows_affected,
        likes = removed_likes.rows_affected,
        "Deleted video"
    );
    Ok(video)
}

/// Delete a comment and the likes on it.
pub async fn delete_comment(
    db: &DatabaseConnection,
    key: OwnedBy<'_>,
) -> Result<comment::Model, AppError> {
    let txn = db.begin().await?;
    let comment = delete_owned::<comment::Entity, _>(&txn, key).await?;
    like::Entity::delete_many()
        .filter(like::Column::CommentId.eq(comment.id.as_str()))
        .exec(&txn)
        .await?;
    txn.commit().await?;
    Ok(comment)
}

/// Delete a tweet and the likes on it.
pub async fn delete_tweet(db: &DatabaseConnection, key: OwnedBy<'_>) -> Result<tweet::Model, AppError> {
    let txn = db.begin().await?;
    let tweet = delete_owned::<tweet::Entity, _>(&txn, key).await?;
    like::Entity::delete_many()
        .filter(like::Column::TweetId.eq(tweet.id.as_str()))
        .exec(&txn)
        .await?;
    txn.commit().await?;
    Ok(tweet)
}

/// Delete a playlist and its entries. The videos themselves stay.
pub async fn delete_playlist(
    db: &DatabaseConnection,
    key: OwnedBy<'_>,
) -> Result<playlist::Model, AppError> {
    let txn = db.begin().await?;
    let playlist = delete_owned::<playlist::Entity, _>(&txn, key).await?;
    playlist_video::Entity::delete_many()
        .filter(playlist_video::Column::PlaylistId.eq(playlist.id.as_str()))
        .exec(&txn)
        .await?;
    txn.commit().await?;
    Ok(playlist)
}
