use axum::extract::{Path, State};
use tracing::instrument;

use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::models::shared::ApiResponse;
use crate::models::subscription::{SubscribedChannels, SubscriberList, SubscriptionToggled};
use crate::mutations::toggle::toggle_subscription;
use crate::state::AppState;
use crate::utils::object_id;
use crate::views;

#[utoipa::path(
    post,
    path = "/c/{channelId}",
    tag = "Subscriptions",
    operation_id = "toggleSubscription",
    summary = "Subscribe to or unsubscribe from a channel",
    description = "Both users' counters move in the same transaction as the subscription. \
        Subscribing to your own channel is rejected.",
    params(("channelId" = String, Path, description = "Channel (user) ID")),
    responses(
        (status = 200, description = "Toggled", body = ApiResponse<SubscriptionToggled>),
        (status = 400, description = "Invalid ID or own channel (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Channel not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = %auth_user.user_id, channel_id = %channel_id))]
pub async fn toggle(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(channel_id): Path<String>,
) -> Result<ApiResponse<SubscriptionToggled>, AppError> {
    let channel_id = object_id::parse(&channel_id, "channel")?;

    let outcome = toggle_subscription(&state.db, &auth_user.user_id, &channel_id).await?;
    let message = if outcome.active {
        "Subscribed successfully"
    } else {
        "Unsubscribed successfully"
    };
    Ok(ApiResponse::ok(
        SubscriptionToggled {
            subscribed: outcome.active,
        },
        message,
    ))
}

#[utoipa::path(
    get,
    path = "/c/{channelId}",
    tag = "Subscriptions",
    operation_id = "getUserChannelSubscribers",
    summary = "List a channel's subscribers",
    description = "Most recent subscriber first.",
    params(("channelId" = String, Path, description = "Channel (user) ID")),
    responses(
        (status = 200, description = "Subscribers", body = ApiResponse<SubscriberList>),
        (status = 400, description = "Invalid channel ID (VALIDATION_ERROR)", body = ErrorBody),
        (status = 404, description = "Channel not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state), fields(channel_id = %channel_id))]
pub async fn subscribers(
    State(state): State<AppState>,
    Path(channel_id): Path<String>,
) -> Result<ApiResponse<SubscriberList>, AppError> {
    let channel_id = object_id::parse(&channel_id, "channel")?;
    if !views::channel::user_exists(&state.db, &channel_id).await? {
        return Err(AppError::NotFound("Channel not found".into()));
    }

    let subscribers = views::channel::subscribers_of(&state.db, &channel_id).await?;
    let total_subscribers = subscribers.len() as u64;
    Ok(ApiResponse::ok(
        SubscriberList {
            subscribers,
            total_subscribers,
        },
        "Subscribers fetched successfully",
    ))
}

#[utoipa::path(
    get,
    path = "/u/{subscriberId}",
    tag = "Subscriptions",
    operation_id = "getSubscribedChannels",
    summary = "List the channels a user subscribes to",
    description = "Most recent subscription first; each channel carries its live subscriber count.",
    params(("subscriberId" = String, Path, description = "Subscriber (user) ID")),
    responses(
        (status = 200, description = "Channels", body = ApiResponse<SubscribedChannels>),
        (status = 400, description = "Invalid subscriber ID (VALIDATION_ERROR)", body = ErrorBody),
        (status = 404, description = "User not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state), fields(subscriber_id = %subscriber_id))]
pub async fn subscribed_channels(
    State(state): State<AppState>,
    Path(subscriber_id): Path<String>,
) -> Result<ApiResponse<SubscribedChannels>, AppError> {
    let subscriber_id = object_id::parse(&subscriber_id, "subscriber")?;
    if !views::channel::user_exists(&state.db, &subscriber_id).await? {
        return Err(AppError::NotFound("User not found".into()));
    }

    let channels = views::channel::channels_of(&state.db, &subscriber_id).await?;
    let total_channels = channels.len() as u64;
    Ok(ApiResponse::ok(
        SubscribedChannels {
            channels,
            total_channels,
        },
        "Subscribed channels fetched successfully",
    ))
}
