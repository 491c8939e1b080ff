use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// A like on exactly one of a video, a comment or a tweet.
///
/// Rows are only ever written through `mutations::toggle::LikeTarget`, which
/// guarantees a single target column is set.
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "like")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    pub video_id: Option<String>,
    pub comment_id: Option<String>,
    pub tweet_id: Option<String>,
    pub liked_by: String,

    pub created_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
