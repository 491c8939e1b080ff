use axum::extract::DefaultBodyLimit;
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

use crate::config::AppConfig;
use crate::handlers::{comment, dashboard, like, playlist, subscription, tweet, user, video};
use crate::state::AppState;

/// Room for multipart framing and the text fields next to the files.
const MULTIPART_SLACK: u64 = 1024 * 1024;

pub fn routes(config: &AppConfig) -> OpenApiRouter<AppState> {
    let upload_limit = upload_body_limit(config);

    OpenApiRouter::new()
        .nest("/users", user_routes(upload_limit.clone()))
        .nest("/videos", video_routes(upload_limit))
        .nest("/comments", comment_routes())
        .nest("/likes", like_routes())
        .nest("/subscriptions", subscription_routes())
        .nest("/playlist", playlist_routes())
        .nest("/tweets", tweet_routes())
        .nest("/dashboard", dashboard_routes())
}

/// Body limit of routes that accept files: one file at the storage limit per
/// file field, plus slack.
fn upload_body_limit(config: &AppConfig) -> DefaultBodyLimit {
    let per_file = config.storage.max_file_size;
    let total = per_file.saturating_mul(2).saturating_add(MULTIPART_SLACK);
    DefaultBodyLimit::max(usize::try_from(total).unwrap_or(usize::MAX))
}

fn user_routes(upload_limit: DefaultBodyLimit) -> OpenApiRouter<AppState> {
    let json = OpenApiRouter::new()
        .routes(routes!(user::login))
        .routes(routes!(user::logout))
        .routes(routes!(user::refresh_token))
        .routes(routes!(user::change_password))
        .routes(routes!(user::current_user))
        .routes(routes!(user::update_account))
        .routes(routes!(user::channel_profile))
        .routes(routes!(user::watch_history));

    let upload = OpenApiRouter::new()
        .routes(routes!(user::register))
        .routes(routes!(user::update_avatar))
        .routes(routes!(user::update_cover_image))
        .layer(upload_limit);

    json.merge(upload)
}

fn video_routes(upload_limit: DefaultBodyLimit) -> OpenApiRouter<AppState> {
    let crud = OpenApiRouter::new()
        .routes(routes!(video::list_videos))
        .routes(routes!(video::get_video, video::delete_video))
        .routes(routes!(video::toggle_publish));

    let upload = OpenApiRouter::new()
        .routes(routes!(video::publish_video))
        .routes(routes!(video::update_video))
        .layer(upload_limit);

    crud.merge(upload)
}

fn comment_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(comment::list_comments, comment::add_comment))
        .routes(routes!(comment::update_comment, comment::delete_comment))
}

fn like_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(like::toggle_video_like))
        .routes(routes!(like::toggle_comment_like))
        .routes(routes!(like::toggle_tweet_like))
        .routes(routes!(like::liked_videos))
}

fn subscription_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(subscription::toggle, subscription::subscribers))
        .routes(routes!(subscription::subscribed_channels))
}

fn playlist_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(playlist::create_playlist))
        .routes(routes!(
            playlist::get_playlist,
            playlist::update_playlist,
            playlist::delete_playlist
        ))
        .routes(routes!(playlist::add_video))
        .routes(routes!(playlist::remove_video))
        .routes(routes!(playlist::user_playlists))
}

fn tweet_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(tweet::create_tweet))
        .routes(routes!(tweet::user_tweets))
        .routes(routes!(tweet::update_tweet, tweet::delete_tweet))
}

fn dashboard_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(dashboard::channel_stats))
        .routes(routes!(dashboard::channel_videos))
}
