use std::net::SocketAddr;
use std::time::Duration;

use serde::Deserialize;

use crate::db::SessionSettings;

/// Application configuration loaded from environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Port the HTTP server listens on
    pub port: u16,

    /// Address the HTTP server binds to
    #[serde(default = "default_host")]
    pub host: String,

    /// MySQL host
    pub db_host: String,

    /// MySQL port
    #[serde(default = "default_db_port")]
    pub db_port: u16,

    /// MySQL user
    pub db_user: String,

    /// MySQL password
    pub db_password: String,

    /// MySQL schema holding the `cars` table
    pub db_name: String,

    /// Upper bound on pooled connections
    #[serde(default = "default_max_connections")]
    pub db_max_connections: u32,

    /// How long a request waits for a free connection
    #[serde(default = "default_acquire_timeout_secs")]
    pub db_acquire_timeout_secs: u64,

    /// Upper bound on a request's time inside the handler pipeline
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// `sql_mode` applied to every leased connection
    #[serde(default = "default_sql_mode")]
    pub sql_mode: String,

    /// `time_zone` applied to every leased connection
    #[serde(default = "default_session_time_zone")]
    pub session_time_zone: String,

    /// Mounts `PUT /addcolumn` when set
    #[serde(default)]
    pub enable_admin_routes: bool,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_db_port() -> u16 {
    3306
}

fn default_max_connections() -> u32 {
    10
}

fn default_acquire_timeout_secs() -> u64 {
    10
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_sql_mode() -> String {
    "TRADITIONAL".to_string()
}

fn default_session_time_zone() -> String {
    "-08:00".to_string()
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        let config = envy::from_env::<Config>()
            .map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects values that would produce a broken pool or unsafe session statements.
    ///
    /// Session settings are interpolated into `SET` statements, so they are
    /// restricted to the characters MySQL mode lists and offsets use.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.db_max_connections == 0 {
            anyhow::bail!("DB_MAX_CONNECTIONS must be at least 1");
        }
        if self.db_acquire_timeout_secs == 0 {
            anyhow::bail!("DB_ACQUIRE_TIMEOUT_SECS must be at least 1");
        }
        if self.request_timeout_secs == 0 {
            anyhow::bail!("REQUEST_TIMEOUT_SECS must be at least 1");
        }
        check_session_value("SQL_MODE", &self.sql_mode)?;
        check_session_value("SESSION_TIME_ZONE", &self.session_time_zone)?;
        Ok(())
    }

    pub fn bind_addr(&self) -> anyhow::Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| anyhow::anyhow!("Invalid bind address {}:{}: {}", self.host, self.port, e))
    }

    pub fn acquire_timeout(&self) -> Duration {
        Duration::from_secs(self.db_acquire_timeout_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn session_settings(&self) -> SessionSettings {
        SessionSettings {
            sql_mode: self.sql_mode.clone(),
            time_zone: self.session_time_zone.clone(),
        }
    }
}

fn check_session_value(name: &str, value: &str) -> anyhow::Result<()> {
    let allowed = |c: char| c.is_ascii_alphanumeric() || "_,:+-/".contains(c);
    if value.is_empty() || !value.chars().all(allowed) {
        anyhow::bail!("{} contains unsupported characters: {:?}", name, value);
    }
    Ok(())
}
