pub mod comment;
pub mod like;
pub mod orphaned_asset;
pub mod playlist;
pub mod playlist_video;
pub mod subscription;
pub mod tweet;
pub mod user;
pub mod video;
pub mod watch_history;
