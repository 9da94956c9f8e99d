use async_trait::async_trait;
use sqlx::{pool::PoolConnection, MySql, MySqlPool};

use super::SessionSettings;
use crate::error::{acquire_error, AppError, AppResult};

/// Source of request-scoped connections
///
/// The connection middleware only talks to this trait, so the lease lifecycle
/// can run against something other than a live database.
#[async_trait]
pub trait ConnectionProvider: Send + Sync + 'static {
    type Connection: Send + 'static;

    /// Takes one connection out of the pool
    async fn acquire(&self) -> AppResult<Self::Connection>;

    /// Applies session-level settings before any handler sees the connection
    async fn configure(&self, conn: &mut Self::Connection) -> AppResult<()>;
}

/// Leases connections from the shared MySQL pool
#[derive(Debug, Clone)]
pub struct MySqlProvider {
    pool: MySqlPool,
    session: SessionSettings,
}

impl MySqlProvider {
    pub fn new(pool: MySqlPool, session: SessionSettings) -> Self {
        Self { pool, session }
    }

    pub fn pool(&self) -> &MySqlPool {
        &self.pool
    }
}

#[async_trait]
impl ConnectionProvider for MySqlProvider {
    type Connection = PoolConnection<MySql>;

    async fn acquire(&self) -> AppResult<Self::Connection> {
        self.pool.acquire().await.map_err(acquire_error)
    }

    async fn configure(&self, conn: &mut Self::Connection) -> AppResult<()> {
        self.session
            .apply(&mut **conn)
            .await
            .map_err(AppError::Session)
    }
}
