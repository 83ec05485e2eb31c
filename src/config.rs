//! Server configuration.
//!
//! Read once from environment variables at startup:
//! - `HOST` - bind address (default `0.0.0.0`)
//! - `PORT` - bind port (default `8080`)
//! - `DB_PATH` - SQLite database file (default `tasks.db`)

use std::path::PathBuf;

/// Runtime configuration for the server.
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub db_path: PathBuf,
}

impl Config {
    /// Load configuration from environment variables, falling back to
    /// defaults for anything unset or unparseable.
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = std::env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(8080);
        let db_path = std::env::var("DB_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("tasks.db"));

        Self {
            host,
            port,
            db_path,
        }
    }
}
