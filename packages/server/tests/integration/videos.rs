use reqwest::Method;
use reqwest::multipart::Form;

use crate::common::{TestApp, UNKNOWN_ID, image_part, routes, video_form};

mod publishing {
    use super::*;

    #[tokio::test]
    async fn owner_can_publish_a_video() {
        let app = TestApp::spawn().await;
        let alice = app.create_user("alice").await;

        let res = app
            .multipart(
                Method::POST,
                routes::VIDEOS,
                video_form("Parsing in an afternoon", "Recursive descent"),
                Some(&alice.token),
            )
            .await;

        assert_eq!(res.status, 201, "{}", res.text);
        assert_eq!(res.data()["title"], "Parsing in an afternoon");
        assert_eq!(res.data()["duration"], 42.5);
        assert_eq!(res.data()["views"], 0);
        assert_eq!(res.data()["isPublished"], true);
        assert_eq!(res.data()["owner"]["id"], alice.id.as_str());
        assert!(res.data()["videoFile"].as_str().unwrap().contains("/assets/video/"));
        assert!(res.data()["thumbnail"].as_str().unwrap().contains("/assets/image/"));
    }

    #[tokio::test]
    async fn publishing_requires_authentication() {
        let app = TestApp::spawn().await;

        let res = app
            .multipart(Method::POST, routes::VIDEOS, video_form("t", "d"), None)
            .await;

        assert_eq!(res.status, 401);
    }

    #[tokio::test]
    async fn video_file_is_required() {
        let app = TestApp::spawn().await;
        let alice = app.create_user("alice").await;
        let form = Form::new()
            .text("title", "No file")
            .text("description", "Nothing attached")
            .part("thumbnail", image_part("thumb.png"));

        let res = app
            .multipart(Method::POST, routes::VIDEOS, form, Some(&alice.token))
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn blank_title_is_rejected() {
        let app = TestApp::spawn().await;
        let alice = app.create_user("alice").await;

        let res = app
            .multipart(
                Method::POST,
                routes::VIDEOS,
                video_form("   ", "description"),
                Some(&alice.token),
            )
            .await;

        assert_eq!(res.status, 400);
    }
}

mod viewing {
    use super::*;

    #[tokio::test]
    async fn fetching_a_video_counts_a_view() {
        let app = TestApp::spawn().await;
        let alice = app.create_user("alice").await;
        let id = app.create_video(&alice.token, "Counted").await;

        let first = app.get_without_token(&routes::video(&id)).await;
        assert_eq!(first.status, 200, "{}", first.text);
        assert_eq!(first.data()["views"], 1);

        let second = app.get_with_token(&routes::video(&id), &alice.token).await;
        assert_eq!(second.data()["views"], 2);
    }

    #[tokio::test]
    async fn unpublished_video_is_only_visible_to_its_owner() {
        let app = TestApp::spawn().await;
        let alice = app.create_user("alice").await;
        let bob = app.create_user("bob").await;
        let id = app.create_unpublished_video(&alice.token, "Draft").await;

        let as_bob = app.get_with_token(&routes::video(&id), &bob.token).await;
        assert_eq!(as_bob.status, 403);
        assert_eq!(as_bob.body["code"], "PERMISSION_DENIED");

        let anonymous = app.get_without_token(&routes::video(&id)).await;
        assert_eq!(anonymous.status, 403);

        let as_alice = app.get_with_token(&routes::video(&id), &alice.token).await;
        assert_eq!(as_alice.status, 200, "{}", as_alice.text);
        assert_eq!(as_alice.data()["isPublished"], false);
    }

    #[tokio::test]
    async fn unknown_video_is_not_found_and_bad_id_is_rejected() {
        let app = TestApp::spawn().await;

        let missing = app.get_without_token(&routes::video(UNKNOWN_ID)).await;
        assert_eq!(missing.status, 404);

        let malformed = app.get_without_token(&routes::video("not-an-id")).await;
        assert_eq!(malformed.status, 400);
    }
}

mod listing {
    use super::*;

    #[tokio::test]
    async fn total_is_independent_of_paging() {
        let app = TestApp::spawn().await;
        let alice = app.create_user("alice").await;
        for i in 0..3 {
            app.create_video(&alice.token, &format!("Video {i}")).await;
        }

        let res = app
            .get_without_token(&format!("{}?page=2&limit=2", routes::VIDEOS))
            .await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.data()["totalVideos"], 3);
        assert_eq!(res.data()["videos"].as_array().unwrap().len(), 1);
        assert_eq!(res.data()["page"], 2);
        assert_eq!(res.data()["limit"], 2);
        assert_eq!(res.data()["totalPages"], 2);
    }

    #[tokio::test]
    async fn unpublished_videos_are_not_listed() {
        let app = TestApp::spawn().await;
        let alice = app.create_user("alice").await;
        app.create_video(&alice.token, "Public").await;
        app.create_unpublished_video(&alice.token, "Hidden").await;

        let res = app.get_without_token(routes::VIDEOS).await;

        assert_eq!(res.data()["totalVideos"], 1);
        assert_eq!(res.data()["videos"][0]["title"], "Public");
    }

    #[tokio::test]
    async fn search_and_owner_filter_narrow_the_list() {
        let app = TestApp::spawn().await;
        let alice = app.create_user("alice").await;
        let bob = app.create_user("bob").await;
        app.create_video(&alice.token, "Rust parsers").await;
        app.create_video(&alice.token, "Gardening").await;
        app.create_video(&bob.token, "More rust").await;

        let search = app
            .get_without_token(&format!("{}?query=RUST", routes::VIDEOS))
            .await;
        assert_eq!(search.data()["totalVideos"], 2);

        let by_owner = app
            .get_without_token(&format!("{}?query=rust&userId={}", routes::VIDEOS, alice.id))
            .await;
        assert_eq!(by_owner.data()["totalVideos"], 1);
        assert_eq!(by_owner.data()["videos"][0]["title"], "Rust parsers");
    }

    #[tokio::test]
    async fn sorting_by_title_ascending() {
        let app = TestApp::spawn().await;
        let alice = app.create_user("alice").await;
        app.create_video(&alice.token, "Bravo").await;
        app.create_video(&alice.token, "Alpha").await;
        app.create_video(&alice.token, "Charlie").await;

        let res = app
            .get_without_token(&format!("{}?sortBy=title&sortType=asc", routes::VIDEOS))
            .await;

        let titles: Vec<&str> = res.data()["videos"]
            .as_array()
            .unwrap()
            .iter()
            .map(|v| v["title"].as_str().unwrap())
            .collect();
        assert_eq!(titles, vec!["Alpha", "Bravo", "Charlie"]);
    }
}

mod ownership {
    use super::*;

    #[tokio::test]
    async fn owner_can_update_title_and_thumbnail() {
        let app = TestApp::spawn().await;
        let alice = app.create_user("alice").await;
        let id = app.create_video(&alice.token, "Old title").await;
        let before = app.get_with_token(&routes::video(&id), &alice.token).await;

        let form = Form::new()
            .text("title", "New title")
            .part("thumbnail", image_part("fresh.png"));
        let res = app
            .multipart(Method::PATCH, &routes::video(&id), form, Some(&alice.token))
            .await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.data()["title"], "New title");
        assert_eq!(res.data()["description"], before.data()["description"]);
        assert_ne!(res.data()["thumbnail"], before.data()["thumbnail"]);
    }

    #[tokio::test]
    async fn update_with_nothing_to_change_is_rejected() {
        let app = TestApp::spawn().await;
        let alice = app.create_user("alice").await;
        let id = app.create_video(&alice.token, "Title").await;

        let res = app
            .multipart(
                Method::PATCH,
                &routes::video(&id),
                Form::new().text("tags", "ignored"),
                Some(&alice.token),
            )
            .await;

        assert_eq!(res.status, 400);
    }

    #[tokio::test]
    async fn non_owner_update_looks_like_a_missing_video() {
        let app = TestApp::spawn().await;
        let alice = app.create_user("alice").await;
        let bob = app.create_user("bob").await;
        let id = app.create_video(&alice.token, "Mine").await;

        let form = Form::new().text("title", "Stolen");
        let res = app
            .multipart(Method::PATCH, &routes::video(&id), form, Some(&bob.token))
            .await;
        let missing = app
            .multipart(
                Method::PATCH,
                &routes::video(UNKNOWN_ID),
                Form::new().text("title", "Stolen"),
                Some(&bob.token),
            )
            .await;

        assert_eq!(res.status, 404);
        assert_eq!(res.body, missing.body);
    }

    #[tokio::test]
    async fn non_owner_cannot_delete_and_the_video_survives() {
        let app = TestApp::spawn().await;
        let alice = app.create_user("alice").await;
        let bob = app.create_user("bob").await;
        let id = app.create_video(&alice.token, "Keep me").await;

        let res = app.delete_with_token(&routes::video(&id), &bob.token).await;
        assert_eq!(res.status, 404);

        let still_there = app.get_without_token(&routes::video(&id)).await;
        assert_eq!(still_there.status, 200);
        for field in ["videoFile", "thumbnail"] {
            let url = still_there.data()[field].as_str().unwrap().to_string();
            let file = app.client.get(&url).send().await.unwrap();
            assert_eq!(file.status().as_u16(), 200, "{field} should still be served");
        }
    }

    #[tokio::test]
    async fn deleting_a_video_removes_its_comments_and_file() {
        let app = TestApp::spawn().await;
        let alice = app.create_user("alice").await;
        let id = app.create_video(&alice.token, "Short lived").await;
        app.create_comment(&alice.token, &id, "First!").await;
        let video = app.get_without_token(&routes::video(&id)).await;
        let file_url = video.data()["videoFile"].as_str().unwrap().to_string();

        let res = app.delete_with_token(&routes::video(&id), &alice.token).await;
        assert_eq!(res.status, 200, "{}", res.text);

        let gone = app.get_without_token(&routes::video(&id)).await;
        assert_eq!(gone.status, 404);
        let comments = app.get_without_token(&routes::video_comments(&id)).await;
        assert_eq!(comments.status, 404);
        let file = app.client.get(&file_url).send().await.unwrap();
        assert_eq!(file.status().as_u16(), 404);
    }

    #[tokio::test]
    async fn toggling_publish_twice_restores_the_state() {
        let app = TestApp::spawn().await;
        let alice = app.create_user("alice").await;
        let bob = app.create_user("bob").await;
        let id = app.create_video(&alice.token, "Flip").await;

        let off = app.patch_empty(&routes::toggle_publish(&id), &alice.token).await;
        assert_eq!(off.data()["isPublished"], false);
        let on = app.patch_empty(&routes::toggle_publish(&id), &alice.token).await;
        assert_eq!(on.data()["isPublished"], true);

        let by_bob = app.patch_empty(&routes::toggle_publish(&id), &bob.token).await;
        assert_eq!(by_bob.status, 404);
    }
}
