use axum::extract::{Path, State};
use sea_orm::prelude::Expr;
use sea_orm::sea_query::Func;
use sea_orm::*;
use tracing::instrument;

use crate::entity::{playlist, playlist_video, video};
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::{AuthUser, MaybeAuthUser};
use crate::extractors::json::AppJson;
use crate::models::playlist::{
    CreatePlaylistRequest, PlaylistDetail, PlaylistResponse, UpdatePlaylistRequest, UserPlaylist,
};
use crate::models::shared::{ApiResponse, Empty};
use crate::mutations::cascade;
use crate::mutations::owned::{OwnedBy, lock_owned, update_owned};
use crate::state::AppState;
use crate::utils::object_id;
use crate::views;

#[utoipa::path(
    post,
    path = "/",
    tag = "Playlists",
    operation_id = "createPlaylist",
    summary = "Create a playlist",
    request_body = CreatePlaylistRequest,
    responses(
        (status = 201, description = "Playlist created", body = ApiResponse<PlaylistResponse>),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(user_id = %auth_user.user_id))]
pub async fn create_playlist(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<CreatePlaylistRequest>,
) -> Result<ApiResponse<PlaylistResponse>, AppError> {
    let (name, description) = payload.validate()?;

    let now = chrono::Utc::now();
    let created = playlist::ActiveModel {
        id: Set(object_id::generate()),
        name: Set(name),
        description: Set(description),
        owner_id: Set(auth_user.user_id.clone()),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(&state.db)
    .await?;

    Ok(ApiResponse::created(
        PlaylistResponse::from(created),
        "Playlist created successfully",
    ))
}

#[utoipa::path(
    get,
    path = "/{playlistId}",
    tag = "Playlists",
    operation_id = "getPlaylistById",
    summary = "Get a playlist with its videos",
    description = "Videos come in playlist order, each with its owner. Unpublished videos are only \
        listed for their owner.",
    params(("playlistId" = String, Path, description = "Playlist ID")),
    responses(
        (status = 200, description = "Playlist", body = ApiResponse<PlaylistDetail>),
        (status = 400, description = "Invalid playlist ID (VALIDATION_ERROR)", body = ErrorBody),
        (status = 404, description = "Playlist not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, viewer), fields(playlist_id = %playlist_id))]
pub async fn get_playlist(
    viewer: MaybeAuthUser,
    State(state): State<AppState>,
    Path(playlist_id): Path<String>,
) -> Result<ApiResponse<PlaylistDetail>, AppError> {
    let playlist_id = object_id::parse(&playlist_id, "playlist")?;

    let playlist = playlist::Entity::find_by_id(playlist_id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Playlist not found".into()))?;

    let detail = views::playlist::playlist_detail(&state.db, playlist, viewer.user_id()).await?;
    Ok(ApiResponse::ok(detail, "Playlist fetched successfully"))
}

#[utoipa::path(
    patch,
    path = "/{playlistId}",
    tag = "Playlists",
    operation_id = "updatePlaylist",
    summary = "Rename a playlist or change its description",
    description = "Absent fields are left unchanged; `description: null` clears the description.",
    params(("playlistId" = String, Path, description = "Playlist ID")),
    request_body = UpdatePlaylistRequest,
    responses(
        (status = 200, description = "Playlist updated", body = ApiResponse<PlaylistResponse>),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Playlist not found or unauthorized (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(user_id = %auth_user.user_id, playlist_id = %playlist_id))]
pub async fn update_playlist(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(playlist_id): Path<String>,
    AppJson(payload): AppJson<UpdatePlaylistRequest>,
) -> Result<ApiResponse<PlaylistResponse>, AppError> {
    let playlist_id = object_id::parse(&playlist_id, "playlist")?;
    let patch = payload.validate()?;

    let updated = update_owned::<playlist::Entity, _, _>(
        &state.db,
        OwnedBy::new(&playlist_id, &auth_user.user_id),
        |mut update| {
            update = update.col_expr(playlist::Column::UpdatedAt, Expr::value(chrono::Utc::now()));
            if let Some(name) = patch.name {
                update = update.col_expr(playlist::Column::Name, Expr::value(name));
            }
            if let Some(description) = patch.description {
                update = update.col_expr(playlist::Column::Description, Expr::value(description));
            }
            update
        },
    )
    .await?;

    Ok(ApiResponse::ok(
        PlaylistResponse::from(updated),
        "Playlist updated successfully",
    ))
}

#[utoipa::path(
    delete,
    path = "/{playlistId}",
    tag = "Playlists",
    operation_id = "deletePlaylist",
    summary = "Delete a playlist",
    description = "The videos in it are not affected.",
    params(("playlistId" = String, Path, description = "Playlist ID")),
    responses(
        (status = 200, description = "Playlist deleted", body = ApiResponse<Empty>),
        (status = 400, description = "Invalid playlist ID (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Playlist not found or unauthorized (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = %auth_user.user_id, playlist_id = %playlist_id))]
pub async fn delete_playlist(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(playlist_id): Path<String>,
) -> Result<ApiResponse<Empty>, AppError> {
    let playlist_id = object_id::parse(&playlist_id, "playlist")?;
    cascade::delete_playlist(&state.db, OwnedBy::new(&playlist_id, &auth_user.user_id)).await?;
    Ok(ApiResponse::ok(Empty {}, "Playlist deleted successfully"))
}

#[utoipa::path(
    patch,
    path = "/add/{videoId}/{playlistId}",
    tag = "Playlists",
    operation_id = "addVideoToPlaylist",
    summary = "Append a video to a playlist",
    description = "Only the playlist owner may add videos. A video can appear in a playlist once.",
    params(
        ("videoId" = String, Path, description = "Video ID"),
        ("playlistId" = String, Path, description = "Playlist ID"),
    ),
    responses(
        (status = 200, description = "Video added", body = ApiResponse<PlaylistDetail>),
        (status = 400, description = "Invalid ID (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Not the playlist owner (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Playlist or video not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Video already in playlist (CONFLICT)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = %auth_user.user_id, video_id = %video_id, playlist_id = %playlist_id))]
pub async fn add_video(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path((video_id, playlist_id)): Path<(String, String)>,
) -> Result<ApiResponse<PlaylistDetail>, AppError> {
    let video_id = object_id::parse(&video_id, "video")?;
    let playlist_id = object_id::parse(&playlist_id, "playlist")?;

    let txn = state.db.begin().await?;

    let playlist = playlist::Entity::find_by_id(playlist_id.clone())
        .lock_exclusive()
        .one(&txn)
        .await?
        .ok_or_else(|| AppError::NotFound("Playlist not found".into()))?;
    if playlist.owner_id != auth_user.user_id {
        return Err(AppError::PermissionDenied(
            "You can only modify your own playlists".into(),
        ));
    }

    let video_exists = video::Entity::find_by_id(video_id.clone()).count(&txn).await? > 0;
    if !video_exists {
        return Err(AppError::NotFound("Video not found".into()));
    }

    let already = playlist_video::Entity::find_by_id((playlist_id.clone(), video_id.clone()))
        .one(&txn)
        .await?;
    if already.is_some() {
        return Err(AppError::Conflict("Video already in playlist".into()));
    }

    let last: Option<Option<i32>> = playlist_video::Entity::find()
        .select_only()
        .column_as(sea_orm::sea_query::SimpleExpr::from(Func::max(Expr::col(playlist_video::Column::Position))), "last")
        .filter(playlist_video::Column::PlaylistId.eq(playlist_id.as_str()))
        .into_tuple()
        .one(&txn)
        .await?;
    let position = last.flatten().map_or(0, |p| p + 1);

    playlist_video::ActiveModel {
        playlist_id: Set(playlist_id.clone()),
        video_id: Set(video_id),
        position: Set(position),
        added_at: Set(chrono::Utc::now()),
    }
    .insert(&txn)
    .await
    .map_err(|e| AppError::conflict_on_unique(e, "Video already in playlist"))?;

    let playlist = touch(&txn, &playlist_id).await?.unwrap_or(playlist);
    txn.commit().await?;

    let detail =
        views::playlist::playlist_detail(&state.db, playlist, Some(&auth_user.user_id)).await?;
    Ok(ApiResponse::ok(detail, "Video added to playlist successfully"))
}

async fn touch<C: ConnectionTrait>(db: &C, playlist_id: &str) -> Result<Option<playlist::Model>, DbErr> {
    Ok(playlist::Entity::update_many()
        .col_expr(playlist::Column::UpdatedAt, Expr::value(chrono::Utc::now()))
        .filter(playlist::Column::Id.eq(playlist_id))
        .exec_with_returning(db)
        .await?
        .into_iter()
        .next())
}

#[utoipa::path(
    patch,
    path = "/remove/{videoId}/{playlistId}",
    tag = "Playlists",
    operation_id = "removeVideoFromPlaylist",
    summary = "Remove a video from a playlist",
    params(
        ("videoId" = String, Path, description = "Video ID"),
        ("playlistId" = String, Path, description = "Playlist ID"),
    ),
    responses(
        (status = 200, description = "Video removed", body = ApiResponse<PlaylistDetail>),
        (status = 400, description = "Invalid ID (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Playlist not found or unauthorized, or video not in playlist (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = %auth_user.user_id, video_id = %video_id, playlist_id = %playlist_id))]
pub async fn remove_video(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path((video_id, playlist_id)): Path<(String, String)>,
) -> Result<ApiResponse<PlaylistDetail>, AppError> {
    let video_id = object_id::parse(&video_id, "video")?;
    let playlist_id = object_id::parse(&playlist_id, "playlist")?;

    let txn = state.db.begin().await?;
    let playlist =
        lock_owned::<playlist::Entity, _>(&txn, OwnedBy::new(&playlist_id, &auth_user.user_id))
            .await?;

    let removed = playlist_video::Entity::delete_many()
        .filter(playlist_video::Column::PlaylistId.eq(playlist_id.as_str()))
        .filter(playlist_video::Column::VideoId.eq(video_id.as_str()))
        .exec(&txn)
        .await?;
    if removed.rows_affected == 0 {
        return Err(AppError::NotFound("Video not found in playlist".into()));
    }

    let playlist = touch(&txn, &playlist_id).await?.unwrap_or(playlist);
    txn.commit().await?;

    let detail =
        views::playlist::playlist_detail(&state.db, playlist, Some(&auth_user.user_id)).await?;
    Ok(ApiResponse::ok(
        detail,
        "Video removed from playlist successfully",
    ))
}

#[utoipa::path(
    get,
    path = "/user/{userId}",
    tag = "Playlists",
    operation_id = "getUserPlaylists",
    summary = "List a user's playlists",
    description = "Newest first, each with short summaries of its videos and the owner.",
    params(("userId" = String, Path, description = "User ID")),
    responses(
        (status = 200, description = "Playlists", body = ApiResponse<Vec<UserPlaylist>>),
        (status = 400, description = "Invalid user ID (VALIDATION_ERROR)", body = ErrorBody),
        (status = 404, description = "User not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, viewer), fields(owner_id = %user_id))]
pub async fn user_playlists(
    viewer: MaybeAuthUser,
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<ApiResponse<Vec<UserPlaylist>>, AppError> {
    let user_id = object_id::parse(&user_id, "user")?;
    if !views::channel::user_exists(&state.db, &user_id).await? {
        return Err(AppError::NotFound("User not found".into()));
    }

    let playlists = views::playlist::playlists_of(&state.db, &user_id, viewer.user_id()).await?;
    Ok(ApiResponse::ok(playlists, "User playlists fetched successfully"))
}
