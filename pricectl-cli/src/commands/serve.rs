//! HTTP server command for the prices API
//!
//! Connects to PostgreSQL, then serves `/api/v0/prices` until shutdown.

use anyhow::{Context, Result};
use clap::Parser;
use std::net::SocketAddr;

use pricectl_server::db::create_pool;
use pricectl_server::{resolve_connect_options, run_server, ServerConfig};

/// Arguments for the serve command
#[derive(Parser, Debug)]
pub struct ServeArgs {
    /// Address to bind to
    #[arg(long, short = 'b', default_value = "0.0.0.0:8080")]
    pub bind: SocketAddr,

    /// Allow permissive CORS (all origins) - use with caution
    #[arg(long)]
    pub cors_permissive: bool,

    /// Largest accepted upload in MiB
    #[arg(long, default_value_t = 32)]
    pub max_upload_mb: usize,

    /// Database URL (falls back to PSQL_HOST, PSQL_PORT, PSQL_USER, PSQL_PASSWORD, PSQL_DB_NAME)
    #[arg(long, env = "DATABASE_URL")]
    pub database_url: Option<String>,
}

impl ServeArgs {
    fn server_config(&self) -> ServerConfig {
        ServerConfig {
            bind_addr: self.bind,
            cors_permissive: self.cors_permissive,
            max_upload_bytes: self.max_upload_mb.saturating_mul(1024 * 1024),
        }
    }
}

/// Run the HTTP server
pub async fn run_serve(args: ServeArgs) -> Result<()> {
    let options = resolve_connect_options(args.database_url.as_deref())
        .context("Database not configured. Set --database-url, DATABASE_URL, or the PSQL_* variables")?;

    tracing::info!("Starting pricectl server on {}", args.bind);

    let pool = create_pool(options)
        .await
        .context("Failed to connect to database")?;

    // Run server (blocks until shutdown)
    run_server(pool, args.server_config())
        .await
        .context("Server error")?;

    Ok(())
}
