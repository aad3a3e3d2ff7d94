//! Application configuration from the environment.

use anyhow::Context;

/// Runtime configuration, read once at startup
#[derive(Debug, Clone)]
pub struct Config {
    /// Postgres connection string (required)
    pub database_url: String,
    /// Address the HTTP server binds to
    pub bind_addr: String,
    /// Connection pool size
    pub database_max_connections: u32,
}

impl Config {
    /// Load configuration from the environment, after `.env` has been read.
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL is not set")?;

        let bind_addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8801".to_string());

        let database_max_connections = match std::env::var("DATABASE_MAX_CONNECTIONS") {
            Ok(raw) => raw
                .parse()
                .context("DATABASE_MAX_CONNECTIONS is not a number")?,
            Err(_) => 5,
        };

        Ok(Self {
            database_url,
            bind_addr,
            database_max_connections,
        })
    }
}
