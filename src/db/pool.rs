use std::time::Duration;

use sqlx::mysql::{MySqlConnectOptions, MySqlPool, MySqlPoolOptions};

use crate::config::Config;

/// Connection settings for the pool, split out of [`Config`] so tests can
/// point a pool anywhere.
#[derive(Debug, Clone)]
pub struct PoolSettings {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub database: String,
    pub max_connections: u32,
    pub acquire_timeout: Duration,
}

impl From<&Config> for PoolSettings {
    fn from(config: &Config) -> Self {
        Self {
            host: config.db_host.clone(),
            port: config.db_port,
            user: config.db_user.clone(),
            password: config.db_password.clone(),
            database: config.db_name.clone(),
            max_connections: config.db_max_connections,
            acquire_timeout: config.acquire_timeout(),
        }
    }
}

/// Creates the process-wide MySQL connection pool
///
/// Connections are opened on first use, so the server can start before the
/// database is reachable; requests arriving while it is down fail at
/// acquisition instead. Session state is not set here: every request
/// configures the connection it leases.
pub fn create_pool(settings: &PoolSettings) -> MySqlPool {
    let options = MySqlConnectOptions::new()
        .host(&settings.host)
        .port(settings.port)
        .username(&settings.user)
        .password(&settings.password)
        .database(&settings.database);

    MySqlPoolOptions::new()
        .max_connections(settings.max_connections)
        .acquire_timeout(settings.acquire_timeout)
        .connect_lazy_with(options)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> PoolSettings {
        PoolSettings {
            host: "127.0.0.1".into(),
            port: 1,
            user: "cars".into(),
            password: "secret".into(),
            database: "garage".into(),
            max_connections: 3,
            acquire_timeout: Duration::from_millis(200),
        }
    }

    #[tokio::test]
    async fn lazy_pool_starts_empty() {
        let pool = create_pool(&settings());

        assert_eq!(pool.size(), 0);
        assert_eq!(pool.options().get_max_connections(), 3);
        pool.close().await;
    }

    #[tokio::test]
    async fn unreachable_database_fails_at_acquire() {
        let pool = create_pool(&settings());

        assert!(pool.acquire().await.is_err());
        pool.close().await;
    }
}
