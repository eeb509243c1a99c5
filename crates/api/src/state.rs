use std::sync::Arc;

use fleetlog_db::PgCatalog;

use crate::catalog::AccountAwareCatalog;
use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable: the pool is reference-counted and the config is behind `Arc`.
#[derive(Clone)]
pub struct AppState {
    pub pool: fleetlog_db::DbPool,
    pub config: Arc<ServerConfig>,
}

impl AppState {
    pub fn new(pool: fleetlog_db::DbPool, config: ServerConfig) -> Self {
        Self {
            pool,
            config: Arc::new(config),
        }
    }

    /// Catalog store for the duplicate guard and the import pipeline.
    pub fn catalog(&self) -> AccountAwareCatalog {
        AccountAwareCatalog::new(PgCatalog::new(self.pool.clone()))
    }
}
