//! Database connection settings from the environment
//!
//! `DATABASE_URL` wins when present. Otherwise the connection is assembled
//! from the individual `PSQL_*` variables with TLS disabled.

use std::fmt;
use std::str::FromStr;

use sqlx::postgres::{PgConnectOptions, PgSslMode};

pub const ENV_HOST: &str = "PSQL_HOST";
pub const ENV_PORT: &str = "PSQL_PORT";
pub const ENV_USER: &str = "PSQL_USER";
pub const ENV_PASSWORD: &str = "PSQL_PASSWORD";
pub const ENV_DB_NAME: &str = "PSQL_DB_NAME";

/// Configuration error
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("environment variable {0} is not set")]
    Missing(&'static str),

    #[error("{var} must be a port number, got '{value}'")]
    InvalidPort { var: &'static str, value: String },

    #[error("invalid database url: {0}")]
    InvalidUrl(#[source] sqlx::Error),
}

/// Connection parameters for the prices database.
#[derive(Clone)]
pub struct DbConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub database: String,
}

impl fmt::Debug for DbConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DbConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .field("database", &self.database)
            .finish()
    }
}

impl DbConfig {
    /// Read `PSQL_HOST`, `PSQL_PORT`, `PSQL_USER`, `PSQL_PASSWORD` and
    /// `PSQL_DB_NAME` from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`DbConfig::from_env`] with a pluggable variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let require = |key: &'static str| lookup(key).ok_or(ConfigError::Missing(key));

        let port_raw = require(ENV_PORT)?;
        let port = port_raw.trim().parse().map_err(|_| ConfigError::InvalidPort {
            var: ENV_PORT,
            value: port_raw.clone(),
        })?;

        Ok(Self {
            host: require(ENV_HOST)?,
            port,
            user: require(ENV_USER)?,
            password: require(ENV_PASSWORD)?,
            database: require(ENV_DB_NAME)?,
        })
    }

    pub fn connect_options(&self) -> PgConnectOptions {
        PgConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .username(&self.user)
            .password(&self.password)
            .database(&self.database)
            .ssl_mode(PgSslMode::Disable)
    }
}

/// Pick connection options: an explicit URL if given, else the `PSQL_*` variables.
pub fn resolve_connect_options(database_url: Option<&str>) -> Result<PgConnectOptions, ConfigError> {
    match database_url {
        Some(url) => PgConnectOptions::from_str(url).map_err(ConfigError::InvalidUrl),
        None => Ok(DbConfig::from_env()?.connect_options()),
    }
}
