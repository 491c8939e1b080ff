use chrono::Utc;
use sea_orm::prelude::Expr;
use sea_orm::sea_query::{ExprTrait, OnConflict};
use sea_orm::*;

use crate::entity::{video, watch_history};
use crate::utils::object_id;

/// Count a view of `video_id`. For a signed-in viewer the video also moves
/// to the head of their watch history.
pub async fn record_view<C: ConnectionTrait>(
    db: &C,
    video_id: &str,
    viewer: Option<&str>,
) -> Result<(), DbErr> {
    video::Entity::update_many()
        .col_expr(video::Column::Views, Expr::col(video::Column::Views).add(1))
        .filter(video::Column::Id.eq(video_id))
        .exec(db)
        .await?;

    if let Some(viewer) = viewer {
        let entry = watch_history::ActiveModel {
            id: Set(object_id::generate()),
            user_id: Set(viewer.to_owned()),
            video_id: Set(video_id.to_owned()),
            watched_at: Set(Utc::now()),
        };
        watch_history::Entity::insert(entry)
            .on_conflict(
                OnConflict::columns([
                    watch_history::Column::UserId,
                    watch_history::Column::VideoId,
                ])
                .update_column(watch_history::Column::WatchedAt)
                .to_owned(),
            )
            .exec_without_returning(db)
            .await?;
    }

    Ok(())
}
