use engine::ContestEngine;
use sea_orm::DatabaseConnection;

use crate::config::AppConfig;

#[derive(Clone)]
pub struct AppState {
    pub engine: ContestEngine,
    pub db: DatabaseConnection,
    pub config: AppConfig,
}
