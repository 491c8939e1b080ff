//! Create-if-absent / delete-if-present operations keyed by a uniqueness pair.
//!
//! Each toggle runs in one transaction: the existence check of the target,
//! the record change and, for subscriptions, both users' counters either
//! all commit or none do.

use sea_orm::prelude::Expr;
use sea_orm::sea_query::ExprTrait;
use sea_orm::*;

use crate::entity::{comment, like, subscription, tweet, user};
use crate::error::AppError;
use crate::utils::object_id;
use crate::views;

/// What a like points at. Exactly one target per like.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LikeTarget {
    Video(String),
    Comment(String),
    Tweet(String),
}

impl LikeTarget {
    pub fn thing(&self) -> &'static str {
        match self {
            LikeTarget::Video(_) => "Video",
            LikeTarget::Comment(_) => "Comment",
            LikeTarget::Tweet(_) => "Tweet",
        }
    }

    fn id(&self) -> &str {
        match self {
            LikeTarget::Video(id) | LikeTarget::Comment(id) | LikeTarget::Tweet(id) => id,
        }
    }

    fn column(&self) -> like::Column {
        match self {
            LikeTarget::Video(_) => like::Column::VideoId,
            LikeTarget::Comment(_) => like::Column::CommentId,
            LikeTarget::Tweet(_) => like::Column::TweetId,
        }
    }

    /// The target must exist, and a video must be visible to `actor`.
    async fn ensure_likeable<C: ConnectionTrait>(&self, db: &C, actor: &str) -> Result<(), AppError> {
        let count = match self {
            LikeTarget::Video(id) => {
                views::video::find_visible(db, id, Some(actor)).await?;
                return Ok(());
            }
            LikeTarget::Comment(id) => comment::Entity::find_by_id(id.clone()).count(db).await?,
            LikeTarget::Tweet(id) => tweet::Entity::find_by_id(id.clone()).count(db).await?,
        };
        if count == 0 {
            return Err(AppError::NotFound(format!("{} not found", self.thing())));
        }
        Ok(())
    }

    fn new_like(&self, actor: &str) -> like::ActiveModel {
        let (video_id, comment_id, tweet_id) = match self {
            LikeTarget::Video(id) => (Some(id.clone()), None, None),
            LikeTarget::Comment(id) => (None, Some(id.clone()), None),
            LikeTarget::Tweet(id) => (None, None, Some(id.clone())),
        };
        like::ActiveModel {
            id: Set(object_id::generate()),
            video_id: Set(video_id),
            comment_id: Set(comment_id),
            tweet_id: Set(tweet_id),
            liked_by: Set(actor.to_owned()),
            created_at: Set(chrono::Utc::now()),
        }
    }
}

/// State after a toggle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ToggleOutcome {
    /// `true` if the record exists after the toggle.
    pub active: bool,
}

/// Like `target` as `actor`, or remove the like if it exists.
pub async fn toggle_like(
    db: &DatabaseConnection,
    actor: &str,
    target: &LikeTarget,
) -> Result<ToggleOutcome, AppError> {
    let txn = db.begin().await?;

    target.ensure_likeable(&txn, actor).await?;

    let existing = like::Entity::find()
        .filter(like::Column::LikedBy.eq(actor))
        .filter(target.column().eq(target.id()))
        .one(&txn)
        .await?;

    let active = match existing {
        Some(row) => {
            like::Entity::delete_by_id(row.id).exec(&txn).await?;
            false
        }
        None => {
            target
                .new_like(actor)
                .insert(&txn)
                .await
                .map_err(|e| AppError::conflict_on_unique(e, "Like is being toggled concurrently"))?;
            true
        }
    };

    txn.commit().await?;
    tracing::debug!(actor, target = ?target, active, "Toggled like");
    Ok(ToggleOutcome { active })
}

/// Subscribe `actor` to `channel_id`, or unsubscribe if already subscribed.
/// Both users' denormalized counters move with the record.
pub async fn toggle_subscription(
    db: &DatabaseConnection,
    actor: &str,
    channel_id: &str,
) -> Result<ToggleOutcome, AppError> {
    if actor == channel_id {
        return Err(AppError::Validation(
            "You cannot subscribe to your own channel".into(),
        ));
    }

    let txn = db.begin().await?;

    let channel_exists = user::Entity::find_by_id(channel_id.to_owned())
        .count(&txn)
        .await?
        > 0;
    if !channel_exists {
        return Err(AppError::NotFound("Channel not found".into()));
    }

    let existing = subscription::Entity::find()
        .filter(subscription::Column::SubscriberId.eq(actor))
        .filter(subscription::Column::ChannelId.eq(channel_id))
        .one(&txn)
        .await?;

    let active = match existing {
        Some(row) => {
            subscription::Entity::delete_by_id(row.id).exec(&txn).await?;
            adjust_counters(&txn, actor, channel_id, CounterStep::Decrement).await?;
            false
        }
        None => {
            subscription::ActiveModel {
                id: Set(object_id::generate()),
                subscriber_id: Set(actor.to_owned()),
                channel_id: Set(channel_id.to_owned()),
                created_at: Set(chrono::Utc::now()),
            }
            .insert(&txn)
            .await
            .map_err(|e| {
                AppError::conflict_on_unique(e, "Subscription is being toggled concurrently")
            })?;
            adjust_counters(&txn, actor, channel_id, CounterStep::Increment).await?;
            true
        }
    };

    txn.commit().await?;
    tracing::debug!(actor, channel_id, active, "Toggled subscription");
    Ok(ToggleOutcome { active })
}

#[derive(Clone, Copy, Debug)]
enum CounterStep {
    Increment,
    Decrement,
}

async fn adjust_counters<C: ConnectionTrait>(
    db: &C,
    subscriber_id: &str,
    channel_id: &str,
    step: CounterStep,
) -> Result<(), DbErr> {
    step_counter(db, channel_id, user::Column::SubscribersCount, step).await?;
    step_counter(db, subscriber_id, user::Column::ChannelsSubscribedToCount, step).await
}

async fn step_counter<C: ConnectionTrait>(
    db: &C,
    user_id: &str,
    column: user::Column,
    step: CounterStep,
) -> Result<(), DbErr> {
    let mut update = user::Entity::update_many().filter(user::Column::Id.eq(user_id));
    update = match step {
        CounterStep::Increment => update.col_expr(column, Expr::col(column).add(1)),
        // Never below zero.
        CounterStep::Decrement => update
            .col_expr(column, Expr::col(column).sub(1))
            .filter(column.gt(0)),
    };
    update.exec(db).await?;
    Ok(())
}
