//! Comments and tweets: short text posts listed newest first with their owners.

use sea_orm::*;

use crate::entity::{comment, tweet};
use crate::models::comment::CommentView;
use crate::models::tweet::TweetView;
use crate::views::owner::load_owners;
use crate::views::pagination::{PageParams, fetch_page};

pub async fn comments_for_video<C: ConnectionTrait>(
    db: &C,
    video_id: &str,
    params: PageParams,
) -> Result<(Vec<CommentView>, u64), DbErr> {
    let select = comment::Entity::find()
        .filter(comment::Column::VideoId.eq(video_id))
        .order_by_desc(comment::Column::CreatedAt)
        .order_by_desc(comment::Column::Id);

    let (rows, total) = fetch_page(db, select, params).await?;
    Ok((enrich_comments(db, rows).await?, total))
}

pub async fn enrich_comments<C: ConnectionTrait>(
    db: &C,
    comments: Vec<comment::Model>,
) -> Result<Vec<CommentView>, DbErr> {
    let owners = load_owners(db, comments.iter().map(|c| c.owner_id.as_str())).await?;
    Ok(comments
        .into_iter()
        .map(|c| {
            let owner = owners.get(&c.owner_id).cloned();
            CommentView::new(c, owner)
        })
        .collect())
}

pub async fn tweets_by_user<C: ConnectionTrait>(
    db: &C,
    user_id: &str,
    params: PageParams,
) -> Result<(Vec<TweetView>, u64), DbErr> {
    let select = tweet::Entity::find()
        .filter(tweet::Column::OwnerId.eq(user_id))
        .order_by_desc(tweet::Column::CreatedAt)
        .order_by_desc(tweet::Column::Id);

    let (rows, total) = fetch_page(db, select, params).await?;
    Ok((enrich_tweets(db, rows).await?, total))
}

pub async fn enrich_tweets<C: ConnectionTrait>(
    db: &C,
    tweets: Vec<tweet::Model>,
) -> Result<Vec<TweetView>, DbErr> {
    let owners = load_owners(db, tweets.iter().map(|t| t.owner_id.as_str())).await?;
    Ok(tweets
        .into_iter()
        .map(|t| {
            let owner = owners.get(&t.owner_id).cloned();
            TweetView::new(t, owner)
        })
        .collect())
}
