use std::sync::Arc;

use common::storage::ObjectStore;
use sea_orm::DatabaseConnection;

use crate::cache::CacheStore;
use crate::config::AppConfig;
use crate::mail::Mailer;

/// Process-wide handles, built once in `main` and cloned into handlers.
#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub config: Arc<AppConfig>,
    pub cache: Arc<dyn CacheStore>,
    pub storage: Arc<dyn ObjectStore>,
    pub mailer: Arc<dyn Mailer>,
}
