use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "video")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    pub video_file_url: String,
    pub video_file_key: String,
    pub thumbnail_url: String,
    pub thumbnail_key: String,

    pub title: String,
    #[sea_orm(column_type = "Text")]
    pub description: String,
    /// Seconds.
    pub duration: f64,
    #[sea_orm(default_value = 0)]
    pub views: i64,
    #[sea_orm(default_value = true)]
    pub is_published: bool,

    #[sea_orm(indexed)]
    pub owner_id: String,

    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
