use axum::extract::{Path, State};
use tracing::instrument;

use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::models::like::LikeToggled;
use crate::models::shared::ApiResponse;
use crate::models::video::VideoView;
use crate::mutations::toggle::{LikeTarget, toggle_like};
use crate::state::AppState;
use crate::utils::object_id;
use crate::views;

async fn toggle(
    state: &AppState,
    auth_user: &AuthUser,
    target: LikeTarget,
) -> Result<ApiResponse<LikeToggled>, AppError> {
    let outcome = toggle_like(&state.db, &auth_user.user_id, &target).await?;
    let message = if outcome.active {
        "Liked successfully"
    } else {
        "Unliked successfully"
    };
    Ok(ApiResponse::ok(
        LikeToggled {
            liked: outcome.active,
        },
        message,
    ))
}

#[utoipa::path(
    post,
    path = "/toggle/v/{videoId}",
    tag = "Likes",
    operation_id = "toggleVideoLike",
    summary = "Like or unlike a video",
    params(("videoId" = String, Path, description = "Video ID")),
    responses(
        (status = 200, description = "Toggled", body = ApiResponse<LikeToggled>),
        (status = 400, description = "Invalid video ID (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Unpublished video of another user (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Video not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = %auth_user.user_id, video_id = %video_id))]
pub async fn toggle_video_like(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(video_id): Path<String>,
) -> Result<ApiResponse<LikeToggled>, AppError> {
    let video_id = object_id::parse(&video_id, "video")?;
    toggle(&state, &auth_user, LikeTarget::Video(video_id)).await
}

#[utoipa::path(
    post,
    path = "/toggle/c/{commentId}",
    tag = "Likes",
    operation_id = "toggleCommentLike",
    summary = "Like or unlike a comment",
    params(("commentId" = String, Path, description = "Comment ID")),
    responses(
        (status = 200, description = "Toggled", body = ApiResponse<LikeToggled>),
        (status = 400, description = "Invalid comment ID (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Comment not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = %auth_user.user_id, comment_id = %comment_id))]
pub async fn toggle_comment_like(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(comment_id): Path<String>,
) -> Result<ApiResponse<LikeToggled>, AppError> {
    let comment_id = object_id::parse(&comment_id, "comment")?;
    toggle(&state, &auth_user, LikeTarget::Comment(comment_id)).await
}

#[utoipa::path(
    post,
    path = "/toggle/t/{tweetId}",
    tag = "Likes",
    operation_id = "toggleTweetLike",
    summary = "Like or unlike a tweet",
    params(("tweetId" = String, Path, description = "Tweet ID")),
    responses(
        (status = 200, description = "Toggled", body = ApiResponse<LikeToggled>),
        (status = 400, description = "Invalid tweet ID (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Tweet not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = %auth_user.user_id, tweet_id = %tweet_id))]
pub async fn toggle_tweet_like(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(tweet_id): Path<String>,
) -> Result<ApiResponse<LikeToggled>, AppError> {
    let tweet_id = object_id::parse(&tweet_id, "tweet")?;
    toggle(&state, &auth_user, LikeTarget::Tweet(tweet_id)).await
}

#[utoipa::path(
    get,
    path = "/videos",
    tag = "Likes",
    operation_id = "getLikedVideos",
    summary = "List videos the current user liked",
    description = "Most recent like first. Videos that were deleted, or unpublished by another \
        owner, are left out.",
    responses(
        (status = 200, description = "Liked videos", body = ApiResponse<Vec<VideoView>>),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = %auth_user.user_id))]
pub async fn liked_videos(
    auth_user: AuthUser,
    State(state): State<AppState>,
) -> Result<ApiResponse<Vec<VideoView>>, AppError> {
    let videos = views::video::liked_videos(&state.db, &auth_user.user_id).await?;
    Ok(ApiResponse::ok(videos, "Liked videos fetched successfully"))
}
