use std::collections::HashMap;

use sea_orm::prelude::Expr;
use sea_orm::sea_query::{Func, LikeExpr};
use sea_orm::*;

use crate::entity::{like, video, watch_history};
use crate::error::AppError;
use crate::models::shared::escape_like;
use crate::models::video::VideoView;
use crate::views::owner::load_owners;
use crate::views::pagination::{PageParams, SortSpec, fetch_page};

/// Filters of the public video listing. Only published videos are ever listed.
#[derive(Debug, Default)]
pub struct VideoFilter {
    /// Case-insensitive substring of the title or the description.
    pub search: Option<String>,
    pub owner_id: Option<String>,
}

fn published_select(filter: &VideoFilter) -> Select<video::Entity> {
    let mut select = video::Entity::find().filter(video::Column::IsPublished.eq(true));

    if let Some(owner_id) = &filter.owner_id {
        select = select.filter(video::Column::OwnerId.eq(owner_id.as_str()));
    }

    if let Some(search) = &filter.search {
        let term = escape_like(search.trim());
        if !term.is_empty() {
            let pattern = format!("%{}%", term.to_lowercase());
            select = select.filter(
                Condition::any()
                    .add(
                        Expr::expr(Func::lower(Expr::col(video::Column::Title)))
                            .like(LikeExpr::new(pattern.clone()).escape('\\')),
                    )
                    .add(
                        Expr::expr(Func::lower(Expr::col(video::Column::Description)))
                            .like(LikeExpr::new(pattern).escape('\\')),
                    ),
            );
        }
    }

    select
}

/// A page of published videos, owner-enriched, plus the total under the filter.
pub async fn list_published<C: ConnectionTrait>(
    db: &C,
    filter: &VideoFilter,
    sort: &SortSpec,
    params: PageParams,
) -> Result<(Vec<VideoView>, u64), DbErr> {
    let select = published_select(filter)
        .order_by(sort.field.video_column(), sort.order.clone())
        .order_by(video::Column::Id, sort.order.clone());

    let (rows, total) = fetch_page(db, select, params).await?;
    Ok((enrich(db, rows).await?, total))
}

/// Attach owners to videos, keeping their order.
pub async fn enrich<C: ConnectionTrait>(
    db: &C,
    videos: Vec<video::Model>,
) -> Result<Vec<VideoView>, DbErr> {
    let owners = load_owners(db, videos.iter().map(|v| v.owner_id.as_str())).await?;
    Ok(videos
        .into_iter()
        .map(|v| {
            let owner = owners.get(&v.owner_id).cloned();
            VideoView::new(v, owner)
        })
        .collect())
}

pub async fn enrich_one<C: ConnectionTrait>(db: &C, video: video::Model) -> Result<VideoView, DbErr> {
    let mut views = enrich(db, vec![video]).await?;
    views
        .pop()
        .ok_or_else(|| DbErr::Custom("enrichment dropped a video".into()))
}

/// Whether `viewer` may see `video`.
pub fn is_visible_to(video: &video::Model, viewer: Option<&str>) -> bool {
    video.is_published || viewer == Some(video.owner_id.as_str())
}

/// Load a video `viewer` may see: 404 if it does not exist, 403 if it is
/// another user's unpublished video.
pub async fn find_visible<C: ConnectionTrait>(
    db: &C,
    video_id: &str,
    viewer: Option<&str>,
) -> Result<video::Model, AppError> {
    let video = video::Entity::find_by_id(video_id.to_owned())
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Video not found".into()))?;

    if !is_visible_to(&video, viewer) {
        return Err(AppError::PermissionDenied("This video is not published".into()));
    }
    Ok(video)
}

/// Load videos by id and return them in the order of `ids`, owner-enriched.
///
/// Ids of vanished videos, and of videos `viewer` may not see, are dropped.
pub async fn load_in_order<C: ConnectionTrait>(
    db: &C,
    ids: &[String],
    viewer: Option<&str>,
) -> Result<Vec<VideoView>, DbErr> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }

    let mut by_id: HashMap<String, video::Model> = video::Entity::find()
        .filter(video::Column::Id.is_in(ids.iter().map(String::as_str)))
        .all(db)
        .await?
        .into_iter()
        .filter(|v| is_visible_to(v, viewer))
        .map(|v| (v.id.clone(), v))
        .collect();

    // Duplicate ids keep their first position only.
    let ordered: Vec<video::Model> = ids.iter().filter_map(|id| by_id.remove(id)).collect();
    enrich(db, ordered).await
}

/// The user's watch history, most recent first.
pub async fn watch_history<C: ConnectionTrait>(
    db: &C,
    user_id: &str,
) -> Result<Vec<VideoView>, DbErr> {
    let ids: Vec<String> = watch_history::Entity::find()
        .select_only()
        .column(watch_history::Column::VideoId)
        .filter(watch_history::Column::UserId.eq(user_id))
        .order_by_desc(watch_history::Column::WatchedAt)
        .into_tuple()
        .all(db)
        .await?;

    load_in_order(db, &ids, Some(user_id)).await
}

/// Videos the user liked, most recent like first. The like itself is not
/// part of the result; each entry is the video promoted to the top level.
pub async fn liked_videos<C: ConnectionTrait>(
    db: &C,
    user_id: &str,
) -> Result<Vec<VideoView>, DbErr> {
    let ids: Vec<Option<String>> = like::Entity::find()
        .select_only()
        .column(like::Column::VideoId)
        .filter(like::Column::LikedBy.eq(user_id))
        .filter(like::Column::VideoId.is_not_null())
        .order_by_desc(like::Column::CreatedAt)
        .into_tuple()
        .all(db)
        .await?;
    let ids: Vec<String> = ids.into_iter().flatten().collect();

    load_in_order(db, &ids, Some(user_id)).await
}
