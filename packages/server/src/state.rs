use std::sync::Arc;

use sea_orm::DatabaseConnection;
use vidhub_common::AssetStore;

use crate::config::AppConfig;

#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub config: AppConfig,
    pub assets: Arc<dyn AssetStore>,
}
