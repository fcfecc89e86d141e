use std::sync::Arc;

use sea_orm::DatabaseConnection;

use crate::config::AppConfig;
use crate::coordinator::BlobSide;

#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub blobs: BlobSide,
    pub config: Arc<AppConfig>,
}
