mod common;
mod playlists;
mod tweets;
mod users;
mod videos;
