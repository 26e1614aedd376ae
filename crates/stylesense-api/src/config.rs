//! Server configuration from the environment.

use std::net::SocketAddr;
use std::path::PathBuf;

use stylesense_core::defaults::{BODY_LIMIT_BYTES, DATABASE_URL, HOST, PORT};
use stylesense_core::{Error, Result};

/// HTTP server settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    /// Built SPA bundle to serve alongside the API.
    pub static_dir: Option<PathBuf>,
    pub body_limit_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: HOST.to_string(),
            port: PORT,
            database_url: DATABASE_URL.to_string(),
            static_dir: None,
            body_limit_bytes: BODY_LIMIT_BYTES,
        }
    }
}

impl ServerConfig {
    /// Environment variables:
    ///   HOST, PORT, DATABASE_URL, STATIC_DIR, BODY_LIMIT_BYTES
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            host: std::env::var("HOST").unwrap_or(defaults.host),
            port: std::env::var("PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.port),
            database_url: std::env::var("DATABASE_URL").unwrap_or(defaults.database_url),
            static_dir: std::env::var("STATIC_DIR")
                .ok()
                .filter(|v| !v.trim().is_empty())
                .map(PathBuf::from),
            body_limit_bytes: std::env::var("BODY_LIMIT_BYTES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.body_limit_bytes),
        }
    }

    pub fn socket_addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| Error::Config(format!("Invalid listen address: {}", e)))
    }
}
