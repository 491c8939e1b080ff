use axum::body::Bytes;
use axum::extract::{Multipart, Path, State};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use sea_orm::prelude::Expr;
use sea_orm::*;
use tracing::instrument;
use vidhub_common::AssetKind;

use crate::entity::user;
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::{ACCESS_TOKEN_COOKIE, AuthUser, MaybeAuthUser, REFRESH_TOKEN_COOKIE};
use crate::extractors::json::AppJson;
use crate::models::auth::{
    ChangePasswordRequest, LoginIdentifier, LoginRequest, LoginResponse, RefreshRequest, TokenPair,
};
use crate::models::shared::{ApiResponse, Empty, require_text};
use crate::models::user::{
    ChannelProfile, PublicUser, UpdateAccountRequest, normalize_email, normalize_username,
    validate_fullname, validate_password,
};
use crate::models::video::VideoView;
use crate::state::AppState;
use crate::utils::upload::{discard_asset, discard_uploaded, read_form, upload_asset};
use crate::utils::{hash, jwt, object_id};
use crate::views;

#[utoipa::path(
    post,
    path = "/register",
    tag = "Users",
    operation_id = "registerUser",
    summary = "Register a new user",
    description = "Multipart form with `username`, `email`, `fullname`, `password`, an `avatar` \
        image (required) and a `coverImage` (optional). Username and email are stored lowercased.",
    request_body(content_type = "multipart/form-data", description = "Account fields and images"),
    responses(
        (status = 201, description = "User registered", body = ApiResponse<PublicUser>),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 409, description = "Username or email taken (CONFLICT)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, multipart))]
pub async fn register(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<ApiResponse<PublicUser>, AppError> {
    let storage = &state.config.storage;
    let mut form = read_form(
        multipart,
        &["avatar", "coverImage"],
        &storage.temp_dir,
        storage.max_file_size,
    )
    .await?;

    let username = normalize_username(&require_text(form.text("username"), "Username is required")?)?;
    let email = normalize_email(&require_text(form.text("email"), "Email is required")?)?;
    let fullname = validate_fullname(&require_text(form.text("fullname"), "Fullname is required")?)?;
    let password = form
        .text("password")
        .ok_or_else(|| AppError::Validation("Password is required".into()))?
        .to_owned();
    validate_password(&password)?;
    let avatar_file = form.require_file("avatar")?;
    let cover_file = form.take_file("coverImage");

    let taken = user::Entity::find()
        .filter(
            Condition::any()
                .add(user::Column::Username.eq(username.as_str()))
                .add(user::Column::Email.eq(email.as_str())),
        )
        .count(&state.db)
        .await?;
    if taken > 0 {
        return Err(AppError::Conflict("Username or email already exists".into()));
    }

    let password_hash = hash::hash_password(&password)
        .map_err(|e| AppError::Internal(format!("Password hash error: {}", e)))?;

    let avatar = upload_asset(&state, &avatar_file, AssetKind::Image).await?;
    let cover = match &cover_file {
        Some(file) => match upload_asset(&state, file, AssetKind::Image).await {
            Ok(cover) => Some(cover),
            Err(e) => {
                discard_uploaded(&state, &[(&avatar, AssetKind::Image)]).await;
                return Err(e);
            }
        },
        None => None,
    };

    let now = chrono::Utc::now();
    let new_user = user::ActiveModel {
        id: Set(object_id::generate()),
        username: Set(username),
        email: Set(email),
        fullname: Set(fullname),
        avatar_url: Set(avatar.url.clone()),
        avatar_key: Set(Some(avatar.key.to_string())),
        cover_image_url: Set(cover.as_ref().map(|c| c.url.clone())),
        cover_image_key: Set(cover.as_ref().map(|c| c.key.to_string())),
        password: Set(password_hash),
        refresh_token: Set(None),
        subscribers_count: Set(0),
        channels_subscribed_to_count: Set(0),
        created_at: Set(now),
        updated_at: Set(now),
    };

    let created = match new_user.insert(&state.db).await {
        Ok(created) => created,
        Err(e) => {
            let mut uploaded = vec![(&avatar, AssetKind::Image)];
            if let Some(cover) = &cover {
                uploaded.push((cover, AssetKind::Image));
            }
            discard_uploaded(&state, &uploaded).await;
            return Err(AppError::conflict_on_unique(e, "Username or email already exists"));
        }
    };

    tracing::info!(user_id = %created.id, username = %created.username, "User registered");
    Ok(ApiResponse::created(
        PublicUser::from(created),
        "User registered successfully",
    ))
}

fn auth_cookie(name: &'static str, value: String, max_age: time::Duration, secure: bool) -> Cookie<'static> {
    Cookie::build((name, value))
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax)
        .path("/")
        .max_age(max_age)
        .build()
}

fn removal_cookie(name: &'static str) -> Cookie<'static> {
    Cookie::build(name).path("/").build()
}

/// Sign a fresh token pair, persist the refresh token and set both cookies.
///
/// With `expected_refresh` the stored token is only replaced if it still
/// equals that value, so a refresh token can be used once.
async fn issue_tokens(
    state: &AppState,
    user: &user::Model,
    expected_refresh: Option<&str>,
    jar: CookieJar,
) -> Result<(CookieJar, TokenPair), AppError> {
    let auth = &state.config.auth;
    let access_token = jwt::sign_access(user, &auth.access_token_secret, auth.access_token_ttl_minutes)
        .map_err(|e| AppError::Internal(format!("JWT sign error: {}", e)))?;
    let refresh_token = jwt::sign_refresh(&user.id, &auth.refresh_token_secret, auth.refresh_token_ttl_days)
        .map_err(|e| AppError::Internal(format!("JWT sign error: {}", e)))?;

    let mut update = user::Entity::update_many()
        .col_expr(user::Column::RefreshToken, Expr::value(Some(refresh_token.clone())))
        .filter(user::Column::Id.eq(user.id.as_str()));
    if let Some(expected) = expected_refresh {
        update = update.filter(user::Column::RefreshToken.eq(expected));
    }
    let result = update.exec(&state.db).await?;
    if result.rows_affected == 0 {
        return Err(AppError::InvalidCredentials(
            "Refresh token is expired or used".into(),
        ));
    }

    let jar = jar
        .add(auth_cookie(
            ACCESS_TOKEN_COOKIE,
            access_token.clone(),
            time::Duration::minutes(auth.access_token_ttl_minutes),
            auth.secure_cookies,
        ))
        .add(auth_cookie(
            REFRESH_TOKEN_COOKIE,
            refresh_token.clone(),
            time::Duration::days(auth.refresh_token_ttl_days),
            auth.secure_cookies,
        ));

    Ok((
        jar,
        TokenPair {
            access_token,
            refresh_token,
        },
    ))
}

#[utoipa::path(
    post,
    path = "/login",
    tag = "Users",
    operation_id = "loginUser",
    summary = "Log in with username or email",
    description = "Verifies the password and issues an access token and a refresh token. Both are \
        returned in the body and set as httpOnly cookies.",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Logged in", body = ApiResponse<LoginResponse>),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Wrong password (INVALID_CREDENTIALS)", body = ErrorBody),
        (status = 404, description = "Unknown user (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, jar, payload))]
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    AppJson(payload): AppJson<LoginRequest>,
) -> Result<(CookieJar, ApiResponse<LoginResponse>), AppError> {
    let filter = match payload.identifier()? {
        LoginIdentifier::Username(username) => user::Column::Username.eq(username),
        LoginIdentifier::Email(email) => user::Column::Email.eq(email),
    };

    let user = user::Entity::find()
        .filter(filter)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".into()))?;

    let is_valid = hash::verify_password(&payload.password, &user.password)
        .map_err(|e| AppError::Internal(format!("Password verify error: {}", e)))?;
    if !is_valid {
        return Err(AppError::InvalidCredentials("Invalid password".into()));
    }

    let (jar, tokens) = issue_tokens(&state, &user, None, jar).await?;
    tracing::info!(user_id = %user.id, "User logged in");

    Ok((
        jar,
        ApiResponse::ok(
            LoginResponse {
                user: PublicUser::from(user),
                access_token: tokens.access_token,
                refresh_token: tokens.refresh_token,
            },
            "User logged in successfully",
        ),
    ))
}

#[utoipa::path(
    post,
    path = "/logout",
    tag = "Users",
    operation_id = "logoutUser",
    summary = "Log out",
    description = "Forgets the stored refresh token and clears both auth cookies.",
    responses(
        (status = 200, description = "Logged out", body = ApiResponse<Empty>),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, jar), fields(user_id = %auth_user.user_id))]
pub async fn logout(
    auth_user: AuthUser,
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<(CookieJar, ApiResponse<Empty>), AppError> {
    user::Entity::update_many()
        .col_expr(user::Column::RefreshToken, Expr::value(Option::<String>::None))
        .filter(user::Column::Id.eq(auth_user.user_id.as_str()))
        .exec(&state.db)
        .await?;

    let jar = jar
        .remove(removal_cookie(ACCESS_TOKEN_COOKIE))
        .remove(removal_cookie(REFRESH_TOKEN_COOKIE));

    Ok((jar, ApiResponse::ok(Empty {}, "User logged out successfully")))
}

#[utoipa::path(
    post,
    path = "/refresh-token",
    tag = "Users",
    operation_id = "refreshAccessToken",
    summary = "Rotate the token pair",
    description = "Takes the refresh token from the `refreshToken` cookie or the JSON body. The token \
        must verify and match the one stored for the user; it is replaced by a new one.",
    request_body(content = RefreshRequest, content_type = "application/json", description = "Optional when the cookie is present"),
    responses(
        (status = 200, description = "Tokens rotated", body = ApiResponse<TokenPair>),
        (status = 401, description = "Missing, invalid or reused refresh token (TOKEN_MISSING, TOKEN_INVALID, INVALID_CREDENTIALS)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, jar, body))]
pub async fn refresh_token(
    State(state): State<AppState>,
    jar: CookieJar,
    body: Bytes,
) -> Result<(CookieJar, ApiResponse<TokenPair>), AppError> {
    let from_body = if body.iter().all(u8::is_ascii_whitespace) {
        RefreshRequest::default()
    } else {
        serde_json::from_slice::<RefreshRequest>(&body)
            .map_err(|e| AppError::Validation(format!("Invalid request body: {e}")))?
    };

    let token = jar
        .get(REFRESH_TOKEN_COOKIE)
        .map(|c| c.value().to_owned())
        .filter(|v| !v.is_empty())
        .or(from_body.refresh_token)
        .ok_or(AppError::TokenMissing)?;

    let claims = jwt::verify_refresh(&token, &state.config.auth.refresh_token_secret)
        .map_err(|_| AppError::TokenInvalid)?;

    let user = user::Entity::find_by_id(claims.sub)
        .one(&state.db)
        .await?
        .ok_or(AppError::TokenInvalid)?;
    if user.refresh_token.as_deref() != Some(token.as_str()) {
        return Err(AppError::InvalidCredentials(
            "Refresh token is expired or used".into(),
        ));
    }

    let (jar, tokens) = issue_tokens(&state, &user, Some(&token), jar).await?;
    Ok((jar, ApiResponse::ok(tokens, "Access token refreshed")))
}

#[utoipa::path(
    post,
    path = "/change-password",
    tag = "Users",
    operation_id = "changePassword",
    summary = "Change the current user's password",
    request_body = ChangePasswordRequest,
    responses(
        (status = 200, description = "Password changed", body = ApiResponse<Empty>),
        (status = 400, description = "New password out of bounds (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Old password wrong (INVALID_CREDENTIALS) or unauthorized", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(user_id = %auth_user.user_id))]
pub async fn change_password(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<ChangePasswordRequest>,
) -> Result<ApiResponse<Empty>, AppError> {
    let user = find_self(&state.db, &auth_user).await?;

    let is_valid = hash::verify_password(&payload.old_password, &user.password)
        .map_err(|e| AppError::Internal(format!("Password verify error: {}", e)))?;
    if !is_valid {
        return Err(AppError::InvalidCredentials(
            "Current password is incorrect".into(),
        ));
    }
    validate_password(&payload.new_password)?;

    let new_hash = hash::hash_password(&payload.new_password)
        .map_err(|e| AppError::Internal(format!("Password hash error: {}", e)))?;

    user::Entity::update_many()
        .col_expr(user::Column::Password, Expr::value(new_hash))
        .col_expr(user::Column::UpdatedAt, Expr::value(chrono::Utc::now()))
        .filter(user::Column::Id.eq(user.id.as_str()))
        .exec(&state.db)
        .await?;

    Ok(ApiResponse::ok(Empty {}, "Password changed successfully"))
}

async fn find_self(db: &DatabaseConnection, auth_user: &AuthUser) -> Result<user::Model, AppError> {
    user::Entity::find_by_id(auth_user.user_id.clone())
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".into()))
}

#[utoipa::path(
    get,
    path = "/current-user",
    tag = "Users",
    operation_id = "getCurrentUser",
    summary = "Get the current user",
    responses(
        (status = 200, description = "Current user", body = ApiResponse<PublicUser>),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = %auth_user.user_id))]
pub async fn current_user(
    auth_user: AuthUser,
    State(state): State<AppState>,
) -> Result<ApiResponse<PublicUser>, AppError> {
    let user = find_self(&state.db, &auth_user).await?;
    Ok(ApiResponse::ok(PublicUser::from(user), "Current user fetched successfully"))
}

#[utoipa::path(
    patch,
    path = "/update-account",
    tag = "Users",
    operation_id = "updateAccountDetails",
    summary = "Update fullname and/or email",
    description = "Absent fields are left unchanged; present fields must not be empty.",
    request_body = UpdateAccountRequest,
    responses(
        (status = 200, description = "Account updated", body = ApiResponse<PublicUser>),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 409, description = "Email taken (CONFLICT)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(user_id = %auth_user.user_id))]
pub async fn update_account(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<UpdateAccountRequest>,
) -> Result<ApiResponse<PublicUser>, AppError> {
    let patch = payload.validate()?;

    if let Some(email) = &patch.email {
        let taken = user::Entity::find()
            .filter(user::Column::Email.eq(email.as_str()))
            .filter(user::Column::Id.ne(auth_user.user_id.as_str()))
            .count(&state.db)
            .await?;
        if taken > 0 {
            return Err(AppError::Conflict("Email already in use".into()));
        }
    }

    let mut update = user::Entity::update_many()
        .col_expr(user::Column::UpdatedAt, Expr::value(chrono::Utc::now()))
        .filter(user::Column::Id.eq(auth_user.user_id.as_str()));
    if let Some(fullname) = patch.fullname {
        update = update.col_expr(user::Column::Fullname, Expr::value(fullname));
    }
    if let Some(email) = patch.email {
        update = update.col_expr(user::Column::Email, Expr::value(email));
    }

    let updated = update
        .exec_with_returning(&state.db)
        .await
        .map_err(|e| AppError::conflict_on_unique(e, "Email already in use"))?
        .into_iter()
        .next()
        .ok_or_else(|| AppError::NotFound("User not found".into()))?;

    Ok(ApiResponse::ok(
        PublicUser::from(updated),
        "Account details updated successfully",
    ))
}

/// Which of a user's images to replace.
#[derive(Clone, Copy, Debug)]
enum ProfileImage {
    Avatar,
    CoverImage,
}

impl ProfileImage {
    fn field(self) -> &'static str {
        match self {
            ProfileImage::Avatar => "avatar",
            ProfileImage::CoverImage => "coverImage",
        }
    }

    fn current_key(self, user: &user::Model) -> Option<String> {
        match self {
            ProfileImage::Avatar => user.avatar_key.clone(),
            ProfileImage::CoverImage => user.cover_image_key.clone(),
        }
    }

    fn columns(self) -> (user::Column, user::Column) {
        match self {
            ProfileImage::Avatar => (user::Column::AvatarUrl, user::Column::AvatarKey),
            ProfileImage::CoverImage => (user::Column::CoverImageUrl, user::Column::CoverImageKey),
        }
    }
}

/// Upload the new image, swap it in, then drop the previous one best-effort.
async fn replace_profile_image(
    state: &AppState,
    auth_user: &AuthUser,
    multipart: Multipart,
    image: ProfileImage,
) -> Result<user::Model, AppError> {
    let storage = &state.config.storage;
    let mut form = read_form(multipart, &[image.field()], &storage.temp_dir, storage.max_file_size).await?;
    let file = form.require_file(image.field())?;

    let uploaded = upload_asset(state, &file, AssetKind::Image).await?;

    let swap = async {
        let txn = state.db.begin().await?;
        let current = user::Entity::find_by_id(auth_user.user_id.clone())
            .lock_exclusive()
            .one(&txn)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".into()))?;
        let old_key = image.current_key(&current);

        let (url_col, key_col) = image.columns();
        let updated = user::Entity::update_many()
            .col_expr(url_col, Expr::value(uploaded.url.clone()))
            .col_expr(key_col, Expr::value(Some(uploaded.key.to_string())))
            .col_expr(user::Column::UpdatedAt, Expr::value(chrono::Utc::now()))
            .filter(user::Column::Id.eq(current.id.as_str()))
            .exec_with_returning(&txn)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| AppError::NotFound("User not found".into()))?;
        txn.commit().await?;
        Ok::<_, AppError>((updated, old_key))
    }
    .await;

    match swap {
        Ok((updated, old_key)) => {
            if let Some(old_key) = old_key {
                discard_asset(state, &state.db, &old_key, AssetKind::Image).await;
            }
            Ok(updated)
        }
        Err(e) => {
            discard_uploaded(state, &[(&uploaded, AssetKind::Image)]).await;
            Err(e)
        }
    }
}

#[utoipa::path(
    patch,
    path = "/avatar",
    tag = "Users",
    operation_id = "updateAvatar",
    summary = "Replace the avatar",
    request_body(content_type = "multipart/form-data", description = "`avatar` image"),
    responses(
        (status = 200, description = "Avatar updated", body = ApiResponse<PublicUser>),
        (status = 400, description = "Missing or oversized image (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, multipart), fields(user_id = %auth_user.user_id))]
pub async fn update_avatar(
    auth_user: AuthUser,
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<ApiResponse<PublicUser>, AppError> {
    let updated = replace_profile_image(&state, &auth_user, multipart, ProfileImage::Avatar).await?;
    Ok(ApiResponse::ok(PublicUser::from(updated), "Avatar updated successfully"))
}

#[utoipa::path(
    patch,
    path = "/cover-image",
    tag = "Users",
    operation_id = "updateCoverImage",
    summary = "Replace the cover image",
    request_body(content_type = "multipart/form-data", description = "`coverImage` image"),
    responses(
        (status = 200, description = "Cover image updated", body = ApiResponse<PublicUser>),
        (status = 400, description = "Missing or oversized image (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, multipart), fields(user_id = %auth_user.user_id))]
pub async fn update_cover_image(
    auth_user: AuthUser,
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<ApiResponse<PublicUser>, AppError> {
    let updated =
        replace_profile_image(&state, &auth_user, multipart, ProfileImage::CoverImage).await?;
    Ok(ApiResponse::ok(
        PublicUser::from(updated),
        "Cover image updated successfully",
    ))
}

#[utoipa::path(
    get,
    path = "/c/{username}",
    tag = "Users",
    operation_id = "getUserChannelProfile",
    summary = "Get a channel profile",
    description = "Subscriber counts are computed from subscriptions. `isSubscribed` reflects the \
        requesting user and is `false` for anonymous requests.",
    params(("username" = String, Path, description = "Channel username")),
    responses(
        (status = 200, description = "Channel profile", body = ApiResponse<ChannelProfile>),
        (status = 400, description = "Malformed username (VALIDATION_ERROR)", body = ErrorBody),
        (status = 404, description = "Channel not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, viewer))]
pub async fn channel_profile(
    viewer: MaybeAuthUser,
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> Result<ApiResponse<ChannelProfile>, AppError> {
    let username = normalize_username(&username)?;
    let profile = views::channel::channel_profile(&state.db, &username, viewer.user_id())
        .await?
        .ok_or_else(|| AppError::NotFound("Channel not found".into()))?;
    Ok(ApiResponse::ok(profile, "Channel profile fetched successfully"))
}

#[utoipa::path(
    get,
    path = "/history",
    tag = "Users",
    operation_id = "getWatchHistory",
    summary = "Get the current user's watch history",
    description = "Most recently watched first; each video carries its owner.",
    responses(
        (status = 200, description = "Watch history", body = ApiResponse<Vec<VideoView>>),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = %auth_user.user_id))]
pub async fn watch_history(
    auth_user: AuthUser,
    State(state): State<AppState>,
) -> Result<ApiResponse<Vec<VideoView>>, AppError> {
    let videos = views::video::watch_history(&state.db, &auth_user.user_id).await?;
    Ok(ApiResponse::ok(videos, "Watch history fetched successfully"))
}
