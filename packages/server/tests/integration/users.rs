use reqwest::Method;
use reqwest::multipart::Form;
use serde_json::json;

use crate::common::{TestApp, image_part, routes};

mod registration {
    use super::*;

    #[tokio::test]
    async fn new_user_can_register_with_an_avatar() {
        let app = TestApp::spawn().await;

        let res = app.register("Alice", "Alice@Example.com", "securepass").await;

        assert_eq!(res.status, 201, "{}", res.text);
        assert_eq!(res.body["success"], true);
        assert_eq!(res.body["statusCode"], 201);
        assert_eq!(res.data()["username"], "alice");
        assert_eq!(res.data()["email"], "alice@example.com");
        assert_eq!(res.data()["id"].as_str().unwrap().len(), 24);
        assert!(res.data()["avatar"].as_str().unwrap().contains("/assets/image/"));
        assert!(res.data()["coverImage"].is_null());
        assert!(res.data().get("password").is_none());
        assert!(res.data().get("refreshToken").is_none());
    }

    #[tokio::test]
    async fn uploaded_avatar_is_served() {
        let app = TestApp::spawn().await;
        let res = app.register("alice", "alice@example.com", "securepass").await;
        assert_eq!(res.status, 201, "{}", res.text);

        let avatar = res.data()["avatar"].as_str().unwrap().to_string();
        let fetched = app.client.get(&avatar).send().await.unwrap();

        assert_eq!(fetched.status().as_u16(), 200);
        assert_eq!(
            fetched.headers()["content-type"].to_str().unwrap(),
            "image/png"
        );
    }

    #[tokio::test]
    async fn cannot_register_a_taken_username_or_email() {
        let app = TestApp::spawn().await;
        let first = app.register("alice", "alice@example.com", "securepass").await;
        assert_eq!(first.status, 201, "{}", first.text);

        let same_name = app.register("ALICE", "other@example.com", "securepass").await;
        assert_eq!(same_name.status, 409);
        assert_eq!(same_name.body["code"], "CONFLICT");

        let same_email = app.register("bob", "alice@example.com", "securepass").await;
        assert_eq!(same_email.status, 409);
    }

    #[tokio::test]
    async fn avatar_is_required() {
        let app = TestApp::spawn().await;
        let form = Form::new()
            .text("username", "alice")
            .text("email", "alice@example.com")
            .text("fullname", "Alice")
            .text("password", "securepass");

        let res = app
            .multipart(Method::POST, routes::REGISTER, form, None)
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
        assert_eq!(res.body["success"], false);
        assert!(res.body["data"].is_null());
    }

    #[tokio::test]
    async fn short_password_is_rejected() {
        let app = TestApp::spawn().await;

        let res = app.register("alice", "alice@example.com", "short").await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
    }
}

mod login {
    use super::*;

    #[tokio::test]
    async fn login_by_email_returns_tokens_and_sets_cookies() {
        let app = TestApp::spawn().await;
        app.register("alice", "alice@example.com", "securepass").await;

        let res = app
            .post_without_token(
                routes::LOGIN,
                &json!({"email": "ALICE@example.com", "password": "securepass"}),
            )
            .await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert!(res.data()["accessToken"].is_string());
        assert!(res.data()["refreshToken"].is_string());
        assert_eq!(res.data()["user"]["username"], "alice");
        assert!(res.cookies.iter().any(|c| c.starts_with("accessToken=")));
        assert!(
            res.cookies
                .iter()
                .any(|c| c.starts_with("refreshToken=") && c.contains("HttpOnly"))
        );
    }

    #[tokio::test]
    async fn wrong_password_is_unauthorized() {
        let app = TestApp::spawn().await;
        app.register("alice", "alice@example.com", "securepass").await;

        let res = app
            .post_without_token(
                routes::LOGIN,
                &json!({"username": "alice", "password": "wrongpass"}),
            )
            .await;

        assert_eq!(res.status, 401);
        assert_eq!(res.body["code"], "INVALID_CREDENTIALS");
    }

    #[tokio::test]
    async fn unknown_user_is_not_found() {
        let app = TestApp::spawn().await;

        let res = app
            .post_without_token(
                routes::LOGIN,
                &json!({"username": "nobody", "password": "securepass"}),
            )
            .await;

        assert_eq!(res.status, 404);
    }

    #[tokio::test]
    async fn identifier_is_required() {
        let app = TestApp::spawn().await;

        let res = app
            .post_without_token(routes::LOGIN, &json!({"password": "securepass"}))
            .await;

        assert_eq!(res.status, 400);
    }
}

mod tokens {
    use super::*;

    #[tokio::test]
    async fn refresh_rotates_and_old_token_is_rejected() {
        let app = TestApp::spawn().await;
        let alice = app.create_user("alice").await;

        let first = app
            .post_without_token(
                routes::REFRESH_TOKEN,
                &json!({"refreshToken": alice.refresh_token}),
            )
            .await;
        assert_eq!(first.status, 200, "{}", first.text);
        let rotated = first.data()["refreshToken"].as_str().unwrap().to_string();
        assert_ne!(rotated, alice.refresh_token);

        let replay = app
            .post_without_token(
                routes::REFRESH_TOKEN,
                &json!({"refreshToken": alice.refresh_token}),
            )
            .await;
        assert_eq!(replay.status, 401);

        let again = app
            .post_without_token(routes::REFRESH_TOKEN, &json!({"refreshToken": rotated}))
            .await;
        assert_eq!(again.status, 200, "{}", again.text);
    }

    #[tokio::test]
    async fn refresh_without_token_is_unauthorized() {
        let app = TestApp::spawn().await;

        let res = app.post_without_token(routes::REFRESH_TOKEN, &json!({})).await;

        assert_eq!(res.status, 401);
        assert_eq!(res.body["code"], "TOKEN_MISSING");
    }

    #[tokio::test]
    async fn logout_invalidates_the_refresh_token() {
        let app = TestApp::spawn().await;
        let alice = app.create_user("alice").await;

        let res = app.post_empty(routes::LOGOUT, &alice.token).await;
        assert_eq!(res.status, 200, "{}", res.text);

        let refresh = app
            .post_without_token(
                routes::REFRESH_TOKEN,
                &json!({"refreshToken": alice.refresh_token}),
            )
            .await;
        assert_eq!(refresh.status, 401);
    }

    #[tokio::test]
    async fn protected_route_requires_a_token() {
        let app = TestApp::spawn().await;

        let res = app.get_without_token(routes::CURRENT_USER).await;
        assert_eq!(res.status, 401);
        assert_eq!(res.body["code"], "TOKEN_MISSING");

        let res = app.get_with_token(routes::CURRENT_USER, "garbage").await;
        assert_eq!(res.status, 401);
        assert_eq!(res.body["code"], "TOKEN_INVALID");
    }
}

mod account {
    use super::*;

    #[tokio::test]
    async fn current_user_returns_self() {
        let app = TestApp::spawn().await;
        let alice = app.create_user("alice").await;

        let res = app.get_with_token(routes::CURRENT_USER, &alice.token).await;

        assert_eq!(res.status, 200);
        assert_eq!(res.data()["id"], alice.id.as_str());
        assert_eq!(res.data()["username"], "alice");
    }

    #[tokio::test]
    async fn change_password_requires_the_old_one() {
        let app = TestApp::spawn().await;
        let alice = app.create_user("alice").await;

        let wrong = app
            .post_with_token(
                routes::CHANGE_PASSWORD,
                &json!({"oldPassword": "not-it-at-all", "newPassword": "brandnewpass"}),
                &alice.token,
            )
            .await;
        assert_eq!(wrong.status, 401);

        let ok = app
            .post_with_token(
                routes::CHANGE_PASSWORD,
                &json!({"oldPassword": "securepass", "newPassword": "brandnewpass"}),
                &alice.token,
            )
            .await;
        assert_eq!(ok.status, 200, "{}", ok.text);

        let login = app
            .post_without_token(
                routes::LOGIN,
                &json!({"username": "alice", "password": "brandnewpass"}),
            )
            .await;
        assert_eq!(login.status, 200);
    }

    #[tokio::test]
    async fn update_account_changes_only_given_fields() {
        let app = TestApp::spawn().await;
        let alice = app.create_user("alice").await;

        let res = app
            .patch_with_token(
                routes::UPDATE_ACCOUNT,
                &json!({"fullname": "Alice Liddell"}),
                &alice.token,
            )
            .await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.data()["fullname"], "Alice Liddell");
        assert_eq!(res.data()["email"], "alice@example.com");
    }

    #[tokio::test]
    async fn update_account_rejects_an_email_in_use() {
        let app = TestApp::spawn().await;
        let alice = app.create_user("alice").await;
        app.create_user("bob").await;

        let res = app
            .patch_with_token(
                routes::UPDATE_ACCOUNT,
                &json!({"email": "bob@example.com"}),
                &alice.token,
            )
            .await;

        assert_eq!(res.status, 409);
    }

    #[tokio::test]
    async fn update_account_requires_a_field() {
        let app = TestApp::spawn().await;
        let alice = app.create_user("alice").await;

        let res = app
            .patch_with_token(routes::UPDATE_ACCOUNT, &json!({}), &alice.token)
            .await;

        assert_eq!(res.status, 400);
    }

    #[tokio::test]
    async fn avatar_can_be_replaced() {
        let app = TestApp::spawn().await;
        let alice = app.create_user("alice").await;
        let before = app.get_with_token(routes::CURRENT_USER, &alice.token).await;
        let old_avatar = before.data()["avatar"].as_str().unwrap().to_string();

        let form = Form::new().part("avatar", image_part("new.png"));
        let res = app
            .multipart(Method::PATCH, routes::AVATAR, form, Some(&alice.token))
            .await;

        assert_eq!(res.status, 200, "{}", res.text);
        let new_avatar = res.data()["avatar"].as_str().unwrap();
        assert_ne!(new_avatar, old_avatar);

        let old = app.client.get(&old_avatar).send().await.unwrap();
        assert_eq!(old.status().as_u16(), 404);
    }
}

mod channel {
    use super::*;

    #[tokio::test]
    async fn channel_profile_reflects_the_viewer() {
        let app = TestApp::spawn().await;
        let alice = app.create_user("alice").await;
        let bob = app.create_user("bob").await;

        let sub = app
            .post_empty(&routes::subscription(&alice.id), &bob.token)
            .await;
        assert_eq!(sub.status, 200, "{}", sub.text);

        let as_bob = app.get_with_token(&routes::channel("alice"), &bob.token).await;
        assert_eq!(as_bob.status, 200, "{}", as_bob.text);
        assert_eq!(as_bob.data()["subscribersCount"], 1);
        assert_eq!(as_bob.data()["channelsSubscribedToCount"], 0);
        assert_eq!(as_bob.data()["isSubscribed"], true);

        let anonymous = app.get_without_token(&routes::channel("alice")).await;
        assert_eq!(anonymous.status, 200);
        assert_eq!(anonymous.data()["isSubscribed"], false);
    }

    #[tokio::test]
    async fn unknown_channel_is_not_found() {
        let app = TestApp::spawn().await;

        let res = app.get_without_token(&routes::channel("ghost")).await;

        assert_eq!(res.status, 404);
    }

    #[tokio::test]
    async fn watch_history_lists_most_recent_first() {
        let app = TestApp::spawn().await;
        let alice = app.create_user("alice").await;
        let bob = app.create_user("bob").await;
        let first = app.create_video(&alice.token, "First").await;
        let second = app.create_video(&alice.token, "Second").await;

        app.get_with_token(&routes::video(&first), &bob.token).await;
        app.get_with_token(&routes::video(&second), &bob.token).await;
        app.get_with_token(&routes::video(&first), &bob.token).await;

        let res = app.get_with_token(routes::HISTORY, &bob.token).await;

        assert_eq!(res.status, 200, "{}", res.text);
        let history = res.data().as_array().unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0]["id"], first.as_str());
        assert_eq!(history[1]["id"], second.as_str());
        assert_eq!(history[0]["owner"]["username"], "alice");
    }
}
