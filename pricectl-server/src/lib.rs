//! pricectl-server: zip/CSV export and import over HTTP
//!
//! - `config`: database connection settings from the environment
//! - `db`: connection pool and the price repository
//! - `http`: axum router, handlers, and error mapping

pub mod config;
pub mod db;
pub mod http;

pub use config::{resolve_connect_options, ConfigError, DbConfig};
pub use http::{build_router, run_server, AppState, ServerConfig, ServerError};
