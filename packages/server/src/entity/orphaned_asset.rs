use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// A stored asset whose deletion failed and is retried by the maintenance sweep.
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "orphaned_asset")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// Asset key as rendered by `AssetKey`.
    pub key: String,
    /// `image` or `video`.
    pub kind: String,

    pub attempts: i32,
    #[sea_orm(column_type = "Text", nullable)]
    pub last_error: Option<String>,
    #[sea_orm(indexed)]
    pub next_attempt_at: DateTimeUtc,

    pub created_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
