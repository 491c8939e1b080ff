use axum::extract::{Path, Query, State};
use sea_orm::prelude::Expr;
use sea_orm::*;
use tracing::instrument;

use crate::entity::comment;
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::{AuthUser, MaybeAuthUser};
use crate::extractors::json::AppJson;
use crate::models::comment::{CommentPage, CommentRequest, CommentView};
use crate::models::shared::{ApiResponse, Empty, PageQuery};
use crate::mutations::cascade;
use crate::mutations::owned::{OwnedBy, update_owned};
use crate::state::AppState;
use crate::utils::object_id;
use crate::views;
use crate::views::pagination::PageParams;

#[utoipa::path(
    get,
    path = "/{videoId}",
    tag = "Comments",
    operation_id = "getVideoComments",
    summary = "List comments on a video",
    description = "Newest first, each with its owner. Comments on an unpublished video are only \
        listed for its owner.",
    params(("videoId" = String, Path, description = "Video ID"), PageQuery),
    responses(
        (status = 200, description = "Page of comments", body = ApiResponse<CommentPage>),
        (status = 400, description = "Invalid video ID (VALIDATION_ERROR)", body = ErrorBody),
        (status = 403, description = "Unpublished video of another user (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Video not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, viewer, query), fields(video_id = %video_id))]
pub async fn list_comments(
    viewer: MaybeAuthUser,
    State(state): State<AppState>,
    Path(video_id): Path<String>,
    Query(query): Query<PageQuery>,
) -> Result<ApiResponse<CommentPage>, AppError> {
    let video_id = object_id::parse(&video_id, "video")?;
    views::video::find_visible(&state.db, &video_id, viewer.user_id()).await?;

    let params = PageParams::parse(
        query.page.as_deref(),
        query.limit.as_deref(),
        &state.config.pagination,
    );
    let (comments, total) = views::posts::comments_for_video(&state.db, &video_id, params).await?;

    Ok(ApiResponse::ok(
        CommentPage {
            comments,
            total_comments: total,
            meta: params.meta(total),
        },
        "Comments fetched successfully",
    ))
}

#[utoipa::path(
    post,
    path = "/{videoId}",
    tag = "Comments",
    operation_id = "addComment",
    summary = "Comment on a video",
    params(("videoId" = String, Path, description = "Video ID")),
    request_body = CommentRequest,
    responses(
        (status = 201, description = "Comment added", body = ApiResponse<CommentView>),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Unpublished video of another user (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Video not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(user_id = %auth_user.user_id, video_id = %video_id))]
pub async fn add_comment(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(video_id): Path<String>,
    AppJson(payload): AppJson<CommentRequest>,
) -> Result<ApiResponse<CommentView>, AppError> {
    let video_id = object_id::parse(&video_id, "video")?;
    let content = payload.content()?;
    views::video::find_visible(&state.db, &video_id, Some(&auth_user.user_id)).await?;

    let now = chrono::Utc::now();
    let created = comment::ActiveModel {
        id: Set(object_id::generate()),
        content: Set(content),
        video_id: Set(video_id),
        owner_id: Set(auth_user.user_id.clone()),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(&state.db)
    .await?;

    let mut enriched = views::posts::enrich_comments(&state.db, vec![created]).await?;
    let view = enriched
        .pop()
        .ok_or_else(|| AppError::Internal("Created comment vanished".into()))?;
    Ok(ApiResponse::created(view, "Comment added successfully"))
}

#[utoipa::path(
    patch,
    path = "/c/{commentId}",
    tag = "Comments",
    operation_id = "updateComment",
    summary = "Edit a comment",
    params(("commentId" = String, Path, description = "Comment ID")),
    request_body = CommentRequest,
    responses(
        (status = 200, description = "Comment updated", body = ApiResponse<CommentView>),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Comment not found or unauthorized (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(user_id = %auth_user.user_id, comment_id = %comment_id))]
pub async fn update_comment(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(comment_id): Path<String>,
    AppJson(payload): AppJson<CommentRequest>,
) -> Result<ApiResponse<CommentView>, AppError> {
    let comment_id = object_id::parse(&comment_id, "comment")?;
    let content = payload.content()?;

    let updated = update_owned::<comment::Entity, _, _>(
        &state.db,
        OwnedBy::new(&comment_id, &auth_user.user_id),
        |update| {
            update
                .col_expr(comment::Column::Content, Expr::value(content))
                .col_expr(comment::Column::UpdatedAt, Expr::value(chrono::Utc::now()))
        },
    )
    .await?;

    let mut enriched = views::posts::enrich_comments(&state.db, vec![updated]).await?;
    let view = enriched
        .pop()
        .ok_or_else(|| AppError::Internal("Updated comment vanished".into()))?;
    Ok(ApiResponse::ok(view, "Comment updated successfully"))
}

#[utoipa::path(
    delete,
    path = "/c/{commentId}",
    tag = "Comments",
    operation_id = "deleteComment",
    summary = "Delete a comment",
    description = "Likes on the comment are removed with it.",
    params(("commentId" = String, Path, description = "Comment ID")),
    responses(
        (status = 200, description = "Comment deleted", body = ApiResponse<Empty>),
        (status = 400, description = "Invalid comment ID (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Comment not found or unauthorized (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = %auth_user.user_id, comment_id = %comment_id))]
pub async fn delete_comment(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(comment_id): Path<String>,
) -> Result<ApiResponse<Empty>, AppError> {
    let comment_id = object_id::parse(&comment_id, "comment")?;
    cascade::delete_comment(&state.db, OwnedBy::new(&comment_id, &auth_user.user_id)).await?;
    Ok(ApiResponse::ok(Empty {}, "Comment deleted successfully"))
}
