use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "user")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// Lowercase, trimmed.
    #[sea_orm(unique)]
    pub username: String,
    #[sea_orm(unique)]
    pub email: String,
    pub fullname: String,

    pub avatar_url: String,
    pub avatar_key: Option<String>,
    pub cover_image_url: Option<String>,
    pub cover_image_key: Option<String>,

    /// Argon2 PHC string.
    pub password: String,
    pub refresh_token: Option<String>,

    /// Denormalized; reconciled by the maintenance task.
    #[sea_orm(default_value = 0)]
    pub subscribers_count: i64,
    #[sea_orm(default_value = 0)]
    pub channels_subscribed_to_count: i64,

    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
