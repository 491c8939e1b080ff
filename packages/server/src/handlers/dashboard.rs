use axum::extract::State;
use tracing::instrument;

use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::models::dashboard::{ChannelStats, DashboardVideos};
use crate::models::shared::ApiResponse;
use crate::state::AppState;
use crate::views;

#[utoipa::path(
    get,
    path = "/stats",
    tag = "Dashboard",
    operation_id = "getChannelStats",
    summary = "Statistics of the current user's channel",
    description = "Subscriber count plus totals over all of the user's videos. Every field is 0 for \
        a channel without videos.",
    responses(
        (status = 200, description = "Channel statistics", body = ApiResponse<ChannelStats>),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = %auth_user.user_id))]
pub async fn channel_stats(
    auth_user: AuthUser,
    State(state): State<AppState>,
) -> Result<ApiResponse<ChannelStats>, AppError> {
    let stats = views::channel::channel_stats(&state.db, &auth_user.user_id).await?;
    Ok(ApiResponse::ok(stats, "Channel stats fetched successfully"))
}

#[utoipa::path(
    get,
    path = "/videos",
    tag = "Dashboard",
    operation_id = "getChannelVideos",
    summary = "All videos of the current user's channel",
    description = "Includes unpublished videos; newest first, each with its like count.",
    responses(
        (status = 200, description = "Channel videos", body = ApiResponse<DashboardVideos>),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = %auth_user.user_id))]
pub async fn channel_videos(
    auth_user: AuthUser,
    State(state): State<AppState>,
) -> Result<ApiResponse<DashboardVideos>, AppError> {
    let videos = views::channel::dashboard_videos(&state.db, &auth_user.user_id).await?;
    let total_videos = videos.len() as u64;
    Ok(ApiResponse::ok(
        DashboardVideos {
            videos,
            total_videos,
        },
        "Channel videos fetched successfully",
    ))
}
