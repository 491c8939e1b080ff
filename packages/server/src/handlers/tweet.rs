use axum::extract::{Path, Query, State};
use sea_orm::prelude::Expr;
use sea_orm::*;
use tracing::instrument;

use crate::entity::tweet;
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::AppJson;
use crate::models::shared::{ApiResponse, Empty, PageQuery};
use crate::models::tweet::{TweetPage, TweetRequest, TweetView};
use crate::mutations::cascade;
use crate::mutations::owned::{OwnedBy, update_owned};
use crate::state::AppState;
use crate::utils::object_id;
use crate::views;
use crate::views::pagination::PageParams;

async fn enrich_one(state: &AppState, model: tweet::Model) -> Result<TweetView, AppError> {
    views::posts::enrich_tweets(&state.db, vec![model])
        .await?
        .pop()
        .ok_or_else(|| AppError::Internal("Tweet vanished during enrichment".into()))
}

#[utoipa::path(
    post,
    path = "/",
    tag = "Tweets",
    operation_id = "createTweet",
    summary = "Post a tweet",
    request_body = TweetRequest,
    responses(
        (status = 201, description = "Tweet created", body = ApiResponse<TweetView>),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(user_id = %auth_user.user_id))]
pub async fn create_tweet(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<TweetRequest>,
) -> Result<ApiResponse<TweetView>, AppError> {
    let content = payload.content()?;

    let now = chrono::Utc::now();
    let created = tweet::ActiveModel {
        id: Set(object_id::generate()),
        content: Set(content),
        owner_id: Set(auth_user.user_id.clone()),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(&state.db)
    .await?;

    let view = enrich_one(&state, created).await?;
    Ok(ApiResponse::created(view, "Tweet created successfully"))
}

#[utoipa::path(
    get,
    path = "/user/{userId}",
    tag = "Tweets",
    operation_id = "getUserTweets",
    summary = "List a user's tweets",
    description = "Newest first, each with its owner.",
    params(("userId" = String, Path, description = "User ID"), PageQuery),
    responses(
        (status = 200, description = "Page of tweets", body = ApiResponse<TweetPage>),
        (status = 400, description = "Invalid user ID (VALIDATION_ERROR)", body = ErrorBody),
        (status = 404, description = "User not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, query), fields(owner_id = %user_id))]
pub async fn user_tweets(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Query(query): Query<PageQuery>,
) -> Result<ApiResponse<TweetPage>, AppError> {
    let user_id = object_id::parse(&user_id, "user")?;
    if !views::channel::user_exists(&state.db, &user_id).await? {
        return Err(AppError::NotFound("User not found".into()));
    }

    let params = PageParams::parse(
        query.page.as_deref(),
        query.limit.as_deref(),
        &state.config.pagination,
    );
    let (tweets, total) = views::posts::tweets_by_user(&state.db, &user_id, params).await?;

    Ok(ApiResponse::ok(
        TweetPage {
            tweets,
            total_tweets: total,
            meta: params.meta(total),
        },
        "Tweets fetched successfully",
    ))
}

#[utoipa::path(
    patch,
    path = "/{tweetId}",
    tag = "Tweets",
    operation_id = "updateTweet",
    summary = "Edit a tweet",
    params(("tweetId" = String, Path, description = "Tweet ID")),
    request_body = TweetRequest,
    responses(
        (status = 200, description = "Tweet updated", body = ApiResponse<TweetView>),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Tweet not found or unauthorized (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(user_id = %auth_user.user_id, tweet_id = %tweet_id))]
pub async fn update_tweet(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(tweet_id): Path<String>,
    AppJson(payload): AppJson<TweetRequest>,
) -> Result<ApiResponse<TweetView>, AppError> {
    let tweet_id = object_id::parse(&tweet_id, "tweet")?;
    let content = payload.content()?;

    let updated = update_owned::<tweet::Entity, _, _>(
        &state.db,
        OwnedBy::new(&tweet_id, &auth_user.user_id),
        |update| {
            update
                .col_expr(tweet::Column::Content, Expr::value(content))
                .col_expr(tweet::Column::UpdatedAt, Expr::value(chrono::Utc::now()))
        },
    )
    .await?;

    let view = enrich_one(&state, updated).await?;
    Ok(ApiResponse::ok(view, "Tweet updated successfully"))
}

#[utoipa::path(
    delete,
    path = "/{tweetId}",
    tag = "Tweets",
    operation_id = "deleteTweet",
    summary = "Delete a tweet",
    description = "Likes on the tweet are removed with it.",
    params(("tweetId" = String, Path, description = "Tweet ID")),
    responses(
        (status = 200, description = "Tweet deleted", body = ApiResponse<Empty>),
        (status = 400, description = "Invalid tweet ID (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Tweet not found or unauthorized (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = %auth_user.user_id, tweet_id = %tweet_id))]
pub async fn delete_tweet(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(tweet_id): Path<String>,
) -> Result<ApiResponse<Empty>, AppError> {
    let tweet_id = object_id::parse(&tweet_id, "tweet")?;
    cascade::delete_tweet(&state.db, OwnedBy::new(&tweet_id, &auth_user.user_id)).await?;
    Ok(ApiResponse::ok(Empty {}, "Tweet deleted successfully"))
}
