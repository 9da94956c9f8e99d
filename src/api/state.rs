use std::sync::Arc;
use std::time::Duration;

use sqlx::MySqlPool;

use crate::config::Config;
use crate::db::{MySqlProvider, SessionSettings};
use crate::middleware::ConnectionScope;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub scope: Arc<ConnectionScope<MySqlProvider>>,
    /// Whether `PUT /addcolumn` is mounted
    pub enable_admin_routes: bool,
}

impl AppState {
    pub fn new(
        pool: MySqlPool,
        session: SessionSettings,
        request_timeout: Duration,
        enable_admin_routes: bool,
    ) -> Self {
        let provider = MySqlProvider::new(pool, session);
        Self {
            scope: Arc::new(ConnectionScope::new(provider, request_timeout)),
            enable_admin_routes,
        }
    }

    pub fn from_config(config: &Config, pool: MySqlPool) -> Self {
        Self::new(
            pool,
            config.session_settings(),
            config.request_timeout(),
            config.enable_admin_routes,
        )
    }

    pub fn pool(&self) -> &MySqlPool {
        self.scope.provider().pool()
    }
}
