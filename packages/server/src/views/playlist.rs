use std::collections::HashMap;

use sea_orm::*;

use crate::entity::{playlist, playlist_video, video};
use crate::models::playlist::{PlaylistDetail, PlaylistVideoSummary, UserPlaylist};
use crate::views::owner::load_owner;
use crate::views::video::load_in_order;

/// Video ids of a playlist in position order.
pub async fn entry_ids<C: ConnectionTrait>(db: &C, playlist_id: &str) -> Result<Vec<String>, DbErr> {
    playlist_video::Entity::find()
        .select_only()
        .column(playlist_video::Column::VideoId)
        .filter(playlist_video::Column::PlaylistId.eq(playlist_id))
        .order_by_asc(playlist_video::Column::Position)
        .into_tuple()
        .all(db)
        .await
}

/// Two-level view: the playlist with its owner, and its videos with theirs.
pub async fn playlist_detail<C: ConnectionTrait>(
    db: &C,
    playlist: playlist::Model,
    viewer: Option<&str>,
) -> Result<PlaylistDetail, DbErr> {
    let ids = entry_ids(db, &playlist.id).await?;
    let videos = load_in_order(db, &ids, viewer).await?;
    let owner = load_owner(db, &playlist.owner_id).await?;

    Ok(PlaylistDetail {
        id: playlist.id,
        name: playlist.name,
        description: playlist.description,
        owner,
        total_videos: videos.len() as u64,
        videos,
        created_at: playlist.created_at,
        updated_at: playlist.updated_at,
    })
}

/// All playlists of `owner_id`, newest first, with short video summaries.
pub async fn playlists_of<C: ConnectionTrait>(
    db: &C,
    owner_id: &str,
    viewer: Option<&str>,
) -> Result<Vec<UserPlaylist>, DbErr> {
    let playlists = playlist::Entity::find()
        .filter(playlist::Column::OwnerId.eq(owner_id))
        .order_by_desc(playlist::Column::CreatedAt)
        .order_by_desc(playlist::Column::Id)
        .all(db)
        .await?;
    if playlists.is_empty() {
        return Ok(Vec::new());
    }

    let entries = playlist_video::Entity::find()
        .filter(playlist_video::Column::PlaylistId.is_in(playlists.iter().map(|p| p.id.as_str())))
        .order_by_asc(playlist_video::Column::Position)
        .all(db)
        .await?;

    let summaries: HashMap<String, PlaylistVideoSummary> = if entries.is_empty() {
        HashMap::new()
    } else {
        let mut visible = Condition::any().add(video::Column::IsPublished.eq(true));
        if let Some(viewer) = viewer {
            visible = visible.add(video::Column::OwnerId.eq(viewer));
        }
        video::Entity::find()
            .select_only()
            .column(video::Column::Id)
            .column(video::Column::Title)
            .column_as(video::Column::ThumbnailUrl, "thumbnail")
            .column(video::Column::Duration)
            .column(video::Column::Views)
            .column(video::Column::CreatedAt)
            .filter(video::Column::Id.is_in(entries.iter().map(|e| e.video_id.as_str())))
            .filter(visible)
            .into_model::<PlaylistVideoSummary>()
            .all(db)
            .await?
            .into_iter()
            .map(|v| (v.id.clone(), v))
            .collect()
    };

    let mut by_playlist: HashMap<&str, Vec<PlaylistVideoSummary>> = HashMap::new();
    for entry in &entries {
        if let Some(summary) = summaries.get(&entry.video_id) {
            by_playlist
                .entry(entry.playlist_id.as_str())
                .or_default()
                .push(summary.clone());
        }
    }

    let owner = load_owner(db, owner_id).await?;

    Ok(playlists
        .into_iter()
        .map(|p| {
            let videos = by_playlist.remove(p.id.as_str()).unwrap_or_default();
            UserPlaylist {
                total_videos: videos.len() as u64,
                videos,
                owner: owner.clone(),
                id: p.id,
                name: p.name,
                description: p.description,
                created_at: p.created_at,
                updated_at: p.updated_at,
            }
        })
        .collect())
}
