use serde_json::json;

use crate::common::{TestApp, UNKNOWN_ID, routes};

#[tokio::test]
async fn playlist_is_created_empty() {
    let app = TestApp::spawn().await;
    let alice = app.create_user("alice").await;

    let res = app
        .post_with_token(
            routes::PLAYLISTS,
            &json!({"name": "Rust talks", "description": "Conference picks"}),
            &alice.token,
        )
        .await;

    assert_eq!(res.status, 201, "{}", res.text);
    assert_eq!(res.data()["name"], "Rust talks");
    assert_eq!(res.data()["ownerId"], alice.id.as_str());
}

#[tokio::test]
async fn playlist_name_is_required() {
    let app = TestApp::spawn().await;
    let alice = app.create_user("alice").await;

    let res = app
        .post_with_token(routes::PLAYLISTS, &json!({"name": "  "}), &alice.token)
        .await;

    assert_eq!(res.status, 400);
}

#[tokio::test]
async fn videos_keep_insertion_order_and_cannot_repeat() {
    let app = TestApp::spawn().await;
    let alice = app.create_user("alice").await;
    let playlist = app.create_playlist(&alice.token, "Mix").await;
    let first = app.create_video(&alice.token, "First").await;
    let second = app.create_video(&alice.token, "Second").await;

    let add = app
        .patch_empty(&routes::playlist_add(&second, &playlist), &alice.token)
        .await;
    assert_eq!(add.status, 200, "{}", add.text);
    app.patch_empty(&routes::playlist_add(&first, &playlist), &alice.token)
        .await;

    let again = app
        .patch_empty(&routes::playlist_add(&second, &playlist), &alice.token)
        .await;
    assert_eq!(again.status, 409);
    assert_eq!(again.body["code"], "CONFLICT");

    let res = app.get_without_token(&routes::playlist(&playlist)).await;
    assert_eq!(res.status, 200, "{}", res.text);
    assert_eq!(res.data()["totalVideos"], 2);
    assert_eq!(res.data()["videos"][0]["id"], second.as_str());
    assert_eq!(res.data()["videos"][1]["id"], first.as_str());
    assert_eq!(res.data()["videos"][0]["owner"]["username"], "alice");
    assert_eq!(res.data()["owner"]["username"], "alice");
}

#[tokio::test]
async fn only_the_owner_can_change_membership() {
    let app = TestApp::spawn().await;
    let alice = app.create_user("alice").await;
    let bob = app.create_user("bob").await;
    let playlist = app.create_playlist(&alice.token, "Mine").await;
    let video = app.create_video(&bob.token, "Bob's video").await;

    let add = app
        .patch_empty(&routes::playlist_add(&video, &playlist), &bob.token)
        .await;
    assert_eq!(add.status, 403);

    let own = app
        .patch_empty(&routes::playlist_add(&video, &playlist), &alice.token)
        .await;
    assert_eq!(own.status, 200, "{}", own.text);

    let remove = app
        .patch_empty(&routes::playlist_remove(&video, &playlist), &bob.token)
        .await;
    assert_eq!(remove.status, 404);

    let res = app.get_without_token(&routes::playlist(&playlist)).await;
    assert_eq!(res.data()["totalVideos"], 1);
}

#[tokio::test]
async fn adding_a_missing_video_is_not_found() {
    let app = TestApp::spawn().await;
    let alice = app.create_user("alice").await;
    let playlist = app.create_playlist(&alice.token, "Mix").await;

    let res = app
        .patch_empty(&routes::playlist_add(UNKNOWN_ID, &playlist), &alice.token)
        .await;

    assert_eq!(res.status, 404);
}

#[tokio::test]
async fn removing_a_video_that_is_not_there_is_not_found() {
    let app = TestApp::spawn().await;
    let alice = app.create_user("alice").await;
    let playlist = app.create_playlist(&alice.token, "Mix").await;
    let video = app.create_video(&alice.token, "Loose").await;

    let res = app
        .patch_empty(&routes::playlist_remove(&video, &playlist), &alice.token)
        .await;
    assert_eq!(res.status, 404);

    app.patch_empty(&routes::playlist_add(&video, &playlist), &alice.token)
        .await;
    let removed = app
        .patch_empty(&routes::playlist_remove(&video, &playlist), &alice.token)
        .await;
    assert_eq!(removed.status, 200, "{}", removed.text);
    assert_eq!(removed.data()["totalVideos"], 0);
}

#[tokio::test]
async fn update_and_delete_are_owner_only() {
    let app = TestApp::spawn().await;
    let alice = app.create_user("alice").await;
    let bob = app.create_user("bob").await;
    let playlist = app.create_playlist(&alice.token, "Mix").await;

    let hijack = app
        .patch_with_token(&routes::playlist(&playlist), &json!({"name": "Bob's"}), &bob.token)
        .await;
    assert_eq!(hijack.status, 404);

    let rename = app
        .patch_with_token(
            &routes::playlist(&playlist),
            &json!({"name": "Renamed", "description": null}),
            &alice.token,
        )
        .await;
    assert_eq!(rename.status, 200, "{}", rename.text);
    assert_eq!(rename.data()["name"], "Renamed");
    assert!(rename.data()["description"].is_null());

    let delete = app.delete_with_token(&routes::playlist(&playlist), &bob.token).await;
    assert_eq!(delete.status, 404);

    let own_delete = app
        .delete_with_token(&routes::playlist(&playlist), &alice.token)
        .await;
    assert_eq!(own_delete.status, 200);

    let gone = app.get_without_token(&routes::playlist(&playlist)).await;
    assert_eq!(gone.status, 404);
}

#[tokio::test]
async fn user_playlists_summarize_their_videos() {
    let app = TestApp::spawn().await;
    let alice = app.create_user("alice").await;
    let first = app.create_playlist(&alice.token, "First").await;
    app.create_playlist(&alice.token, "Second").await;
    let video = app.create_video(&alice.token, "Clip").await;
    app.patch_empty(&routes::playlist_add(&video, &first), &alice.token)
        .await;

    let res = app.get_without_token(&routes::user_playlists(&alice.id)).await;

    assert_eq!(res.status, 200, "{}", res.text);
    let playlists = res.data().as_array().unwrap();
    assert_eq!(playlists.len(), 2);
    assert_eq!(playlists[0]["name"], "Second");
    assert_eq!(playlists[0]["totalVideos"], 0);
    assert_eq!(playlists[1]["totalVideos"], 1);
    assert_eq!(playlists[1]["videos"][0]["title"], "Clip");
}

#[tokio::test]
async fn deleting_a_video_removes_it_from_playlists() {
    let app = TestApp::spawn().await;
    let alice = app.create_user("alice").await;
    let playlist = app.create_playlist(&alice.token, "Mix").await;
    let video = app.create_video(&alice.token, "Doomed").await;
    app.patch_empty(&routes::playlist_add(&video, &playlist), &alice.token)
        .await;

    app.delete_with_token(&routes::video(&video), &alice.token).await;

    let res = app.get_without_token(&routes::playlist(&playlist)).await;
    assert_eq!(res.data()["totalVideos"], 0);
}
