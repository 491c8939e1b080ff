use serde_json::json;

use crate::common::{TestApp, UNKNOWN_ID, routes};

#[tokio::test]
async fn tweet_is_created_with_its_owner() {
    let app = TestApp::spawn().await;
    let alice = app.create_user("alice").await;

    let res = app
        .post_with_token(routes::TWEETS, &json!({"content": "New video tomorrow"}), &alice.token)
        .await;

    assert_eq!(res.status, 201, "{}", res.text);
    assert_eq!(res.data()["content"], "New video tomorrow");
    assert_eq!(res.data()["owner"]["id"], alice.id.as_str());
}

#[tokio::test]
async fn overlong_tweet_is_rejected() {
    let app = TestApp::spawn().await;
    let alice = app.create_user("alice").await;

    let res = app
        .post_with_token(
            routes::TWEETS,
            &json!({"content": "x".repeat(501)}),
            &alice.token,
        )
        .await;

    assert_eq!(res.status, 400);
}

#[tokio::test]
async fn user_tweets_are_paged_newest_first() {
    let app = TestApp::spawn().await;
    let alice = app.create_user("alice").await;
    let bob = app.create_user("bob").await;
    for i in 0..3 {
        app.create_tweet(&alice.token, &format!("tweet {i}")).await;
    }
    app.create_tweet(&bob.token, "not alice").await;

    let res = app
        .get_without_token(&format!("{}?page=1&limit=2", routes::user_tweets(&alice.id)))
        .await;

    assert_eq!(res.status, 200, "{}", res.text);
    assert_eq!(res.data()["totalTweets"], 3);
    let tweets = res.data()["tweets"].as_array().unwrap();
    assert_eq!(tweets.len(), 2);
    assert_eq!(tweets[0]["content"], "tweet 2");
}

#[tokio::test]
async fn tweets_of_a_missing_user_are_not_found() {
    let app = TestApp::spawn().await;

    let res = app.get_without_token(&routes::user_tweets(UNKNOWN_ID)).await;

    assert_eq!(res.status, 404);
}

#[tokio::test]
async fn only_the_author_can_edit_or_delete() {
    let app = TestApp::spawn().await;
    let alice = app.create_user("alice").await;
    let bob = app.create_user("bob").await;
    let tweet = app.create_tweet(&alice.token, "original").await;

    let edit = app
        .patch_with_token(&routes::tweet(&tweet), &json!({"content": "mine now"}), &bob.token)
        .await;
    assert_eq!(edit.status, 404);

    let delete = app.delete_with_token(&routes::tweet(&tweet), &bob.token).await;
    assert_eq!(delete.status, 404);

    let own_edit = app
        .patch_with_token(&routes::tweet(&tweet), &json!({"content": "edited"}), &alice.token)
        .await;
    assert_eq!(own_edit.status, 200, "{}", own_edit.text);
    assert_eq!(own_edit.data()["content"], "edited");

    let own_delete = app.delete_with_token(&routes::tweet(&tweet), &alice.token).await;
    assert_eq!(own_delete.status, 200);

    let list = app.get_without_token(&routes::user_tweets(&alice.id)).await;
    assert_eq!(list.data()["totalTweets"], 0);
}
