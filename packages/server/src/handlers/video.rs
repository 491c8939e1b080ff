use axum::extract::{Multipart, Path, Query, State};
use sea_orm::prelude::Expr;
use sea_orm::sea_query::ExprTrait;
use sea_orm::*;
use tracing::instrument;
use vidhub_common::AssetKind;

use crate::entity::video;
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::{AuthUser, MaybeAuthUser};
use crate::models::shared::{ApiResponse, Empty};
use crate::models::video::{VideoListQuery, VideoPage, VideoPatch, VideoView, parse_duration};
use crate::mutations::owned::{OwnedBy, lock_owned, update_owned};
use crate::mutations::{cascade, watch};
use crate::state::AppState;
use crate::utils::object_id;
use crate::utils::upload::{discard_asset, discard_uploaded, read_form, upload_asset};
use crate::views;
use crate::views::pagination::{PageParams, SortSpec};
use crate::views::video::VideoFilter;

#[utoipa::path(
    get,
    path = "/",
    tag = "Videos",
    operation_id = "getAllVideos",
    summary = "List published videos",
    description = "Paginated list of published videos with optional search (`query`, case-insensitive \
        substring of title or description), owner filter (`userId`) and sorting (`sortBy` one of \
        `createdAt` (default), `updatedAt`, `title`, `views`, `duration`; `sortType` `asc` or `desc` \
        (default)). `totalVideos` counts every match, independent of paging.",
    params(VideoListQuery),
    responses(
        (status = 200, description = "Page of videos", body = ApiResponse<VideoPage>),
        (status = 400, description = "Invalid sort or user ID (VALIDATION_ERROR)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, query))]
pub async fn list_videos(
    State(state): State<AppState>,
    Query(query): Query<VideoListQuery>,
) -> Result<ApiResponse<VideoPage>, AppError> {
    let params = PageParams::parse(
        query.page.as_deref(),
        query.limit.as_deref(),
        &state.config.pagination,
    );
    let sort = SortSpec::parse(query.sort_by.as_deref(), query.sort_type.as_deref())?;
    let owner_id = query
        .user_id
        .as_deref()
        .map(|id| object_id::parse(id, "user"))
        .transpose()?;

    let filter = VideoFilter {
        search: query.query,
        owner_id,
    };
    let (videos, total) = views::video::list_published(&state.db, &filter, &sort, params).await?;

    Ok(ApiResponse::ok(
        VideoPage {
            videos,
            total_videos: total,
            meta: params.meta(total),
        },
        "Videos fetched successfully",
    ))
}

#[utoipa::path(
    post,
    path = "/",
    tag = "Videos",
    operation_id = "publishAVideo",
    summary = "Publish a video",
    description = "Multipart form with `title`, `description`, optional `duration` in seconds, a \
        `videoFile` and a `thumbnail` image. Both files are stored before the record is created.",
    request_body(content_type = "multipart/form-data", description = "Video fields and files"),
    responses(
        (status = 201, description = "Video published", body = ApiResponse<VideoView>),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, multipart), fields(user_id = %auth_user.user_id))]
pub async fn publish_video(
    auth_user: AuthUser,
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<ApiResponse<VideoView>, AppError> {
    let storage = &state.config.storage;
    let mut form = read_form(
        multipart,
        &["videoFile", "thumbnail"],
        &storage.temp_dir,
        storage.max_file_size,
    )
    .await?;

    let patch = VideoPatch::from_form(
        Some(form.text("title").unwrap_or_default()),
        Some(form.text("description").unwrap_or_default()),
    )?;
    let duration = parse_duration(form.text("duration"))?;
    let video_file = form.require_file("videoFile")?;
    let thumbnail_file = form.require_file("thumbnail")?;

    let stored_video = upload_asset(&state, &video_file, AssetKind::Video).await?;
    let stored_thumbnail = match upload_asset(&state, &thumbnail_file, AssetKind::Image).await {
        Ok(stored) => stored,
        Err(e) => {
            discard_uploaded(&state, &[(&stored_video, AssetKind::Video)]).await;
            return Err(e);
        }
    };

    let now = chrono::Utc::now();
    let new_video = video::ActiveModel {
        id: Set(object_id::generate()),
        video_file_url: Set(stored_video.url.clone()),
        video_file_key: Set(stored_video.key.to_string()),
        thumbnail_url: Set(stored_thumbnail.url.clone()),
        thumbnail_key: Set(stored_thumbnail.key.to_string()),
        title: Set(patch.title.unwrap_or_default()),
        description: Set(patch.description.unwrap_or_default()),
        duration: Set(duration),
        views: Set(0),
        is_published: Set(true),
        owner_id: Set(auth_user.user_id.clone()),
        created_at: Set(now),
        updated_at: Set(now),
    };

    let created = match new_video.insert(&state.db).await {
        Ok(created) => created,
        Err(e) => {
            discard_uploaded(
                &state,
                &[
                    (&stored_video, AssetKind::Video),
                    (&stored_thumbnail, AssetKind::Image),
                ],
            )
            .await;
            return Err(e.into());
        }
    };

    tracing::info!(video_id = %created.id, "Video published");
    let view = views::video::enrich_one(&state.db, created).await?;
    Ok(ApiResponse::created(view, "Video published successfully"))
}

#[utoipa::path(
    get,
    path = "/{videoId}",
    tag = "Videos",
    operation_id = "getVideoById",
    summary = "Get a video",
    description = "Returns the owner-enriched video and counts a view. For a signed-in viewer the \
        video moves to the head of their watch history. Unpublished videos are only visible to \
        their owner.",
    params(("videoId" = String, Path, description = "Video ID")),
    responses(
        (status = 200, description = "Video", body = ApiResponse<VideoView>),
        (status = 400, description = "Invalid video ID (VALIDATION_ERROR)", body = ErrorBody),
        (status = 403, description = "Unpublished video of another user (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Video not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, viewer), fields(video_id = %video_id))]
pub async fn get_video(
    viewer: MaybeAuthUser,
    State(state): State<AppState>,
    Path(video_id): Path<String>,
) -> Result<ApiResponse<VideoView>, AppError> {
    let video_id = object_id::parse(&video_id, "video")?;

    let mut video = views::video::find_visible(&state.db, &video_id, viewer.user_id()).await?;

    watch::record_view(&state.db, &video_id, viewer.user_id()).await?;
    video.views += 1;

    let view = views::video::enrich_one(&state.db, video).await?;
    Ok(ApiResponse::ok(view, "Video fetched successfully"))
}

#[utoipa::path(
    patch,
    path = "/{videoId}",
    tag = "Videos",
    operation_id = "updateVideo",
    summary = "Update a video",
    description = "Multipart patch with optional `title`, `description` and `thumbnail`. At least \
        one is required. Only the owner may update; a video that is missing or not yours is \
        reported the same way.",
    params(("videoId" = String, Path, description = "Video ID")),
    request_body(content_type = "multipart/form-data", description = "Fields to change"),
    responses(
        (status = 200, description = "Video updated", body = ApiResponse<VideoView>),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Video not found or unauthorized (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, multipart), fields(user_id = %auth_user.user_id, video_id = %video_id))]
pub async fn update_video(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(video_id): Path<String>,
    multipart: Multipart,
) -> Result<ApiResponse<VideoView>, AppError> {
    let video_id = object_id::parse(&video_id, "video")?;
    let storage = &state.config.storage;
    let mut form = read_form(multipart, &["thumbnail"], &storage.temp_dir, storage.max_file_size).await?;

    let patch = VideoPatch::from_form(form.text("title"), form.text("description"))?;
    let thumbnail_file = form.take_file("thumbnail");
    if patch.is_empty() && thumbnail_file.is_none() {
        return Err(AppError::Validation(
            "At least one of title, description or thumbnail is required".into(),
        ));
    }

    let key = OwnedBy::new(&video_id, &auth_user.user_id);
    let apply = |update: UpdateMany<video::Entity>| {
        let mut update = update.col_expr(video::Column::UpdatedAt, Expr::value(chrono::Utc::now()));
        if let Some(title) = patch.title.clone() {
            update = update.col_expr(video::Column::Title, Expr::value(title));
        }
        if let Some(description) = patch.description.clone() {
            update = update.col_expr(video::Column::Description, Expr::value(description));
        }
        update
    };

    let updated = match thumbnail_file {
        None => update_owned::<video::Entity, _, _>(&state.db, key, apply).await?,
        Some(file) => {
            let stored = upload_asset(&state, &file, AssetKind::Image).await?;

            let swap = async {
                let txn = state.db.begin().await?;
                let current = lock_owned::<video::Entity, _>(&txn, key).await?;
                let updated = update_owned::<video::Entity, _, _>(&txn, key, |update| {
                    apply(update)
                        .col_expr(video::Column::ThumbnailUrl, Expr::value(stored.url.clone()))
                        .col_expr(video::Column::ThumbnailKey, Expr::value(stored.key.to_string()))
                })
                .await?;
                txn.commit().await?;
                Ok::<_, AppError>((updated, current.thumbnail_key))
            }
            .await;

            match swap {
                Ok((updated, old_key)) => {
                    discard_asset(&state, &state.db, &old_key, AssetKind::Image).await;
                    updated
                }
                Err(e) => {
                    discard_uploaded(&state, &[(&stored, AssetKind::Image)]).await;
                    return Err(e);
                }
            }
        }
    };

    let view = views::video::enrich_one(&state.db, updated).await?;
    Ok(ApiResponse::ok(view, "Video updated successfully"))
}

#[utoipa::path(
    delete,
    path = "/{videoId}",
    tag = "Videos",
    operation_id = "deleteVideo",
    summary = "Delete a video",
    description = "Deletes the video with its comments, likes, playlist entries and watch-history \
        entries. Stored files are removed after the delete commits; failed removals are retried \
        in the background.",
    params(("videoId" = String, Path, description = "Video ID")),
    responses(
        (status = 200, description = "Video deleted", body = ApiResponse<Empty>),
        (status = 400, description = "Invalid video ID (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Video not found or unauthorized (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = %auth_user.user_id, video_id = %video_id))]
pub async fn delete_video(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(video_id): Path<String>,
) -> Result<ApiResponse<Empty>, AppError> {
    let video_id = object_id::parse(&video_id, "video")?;

    let deleted = cascade::delete_video(&state.db, OwnedBy::new(&video_id, &auth_user.user_id)).await?;

    discard_asset(&state, &state.db, &deleted.video_file_key, AssetKind::Video).await;
    discard_asset(&state, &state.db, &deleted.thumbnail_key, AssetKind::Image).await;

    Ok(ApiResponse::ok(Empty {}, "Video deleted successfully"))
}

#[utoipa::path(
    patch,
    path = "/toggle/publish/{videoId}",
    tag = "Videos",
    operation_id = "togglePublishStatus",
    summary = "Publish or unpublish a video",
    params(("videoId" = String, Path, description = "Video ID")),
    responses(
        (status = 200, description = "Publish state flipped", body = ApiResponse<VideoView>),
        (status = 400, description = "Invalid video ID (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Video not found or unauthorized (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = %auth_user.user_id, video_id = %video_id))]
pub async fn toggle_publish(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(video_id): Path<String>,
) -> Result<ApiResponse<VideoView>, AppError> {
    let video_id = object_id::parse(&video_id, "video")?;

    let updated = update_owned::<video::Entity, _, _>(
        &state.db,
        OwnedBy::new(&video_id, &auth_user.user_id),
        |update| {
            update
                .col_expr(
                    video::Column::IsPublished,
                    Expr::col(video::Column::IsPublished).not(),
                )
                .col_expr(video::Column::UpdatedAt, Expr::value(chrono::Utc::now()))
        },
    )
    .await?;

    let message = if updated.is_published {
        "Video published successfully"
    } else {
        "Video unpublished successfully"
    };
    let view = views::video::enrich_one(&state.db, updated).await?;
    Ok(ApiResponse::ok(view, message))
}
