//! Runtime server configuration
//!
//! ServerConfig is rebuilt from environment variables on every launch and is
//! immutable for the process lifetime.
//!
//! # Environment Variables
//!
//! - `ORGCHART_DB_PATH`: database file (default: `~/.orgchart/database/orgchart.db`)
//! - `ORGCHART_HOST`: bind address (default: `127.0.0.1`)
//! - `ORGCHART_PORT`: port (default: 5063)
//! - `CORS_ALLOW_ORIGIN`: comma-separated allowed origins (default: `http://localhost:4200`)

use anyhow::{anyhow, Context, Result};
use axum::http::HeaderValue;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;

pub const DEFAULT_PORT: u16 = 5063;
pub const DEFAULT_CORS_ORIGIN: &str = "http://localhost:4200";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Resolved path to the libsql database file
    pub db_path: PathBuf,

    pub host: IpAddr,

    pub port: u16,

    /// Origins allowed by the CORS layer, already checked to be valid header values
    pub cors_origins: Vec<String>,
}

impl ServerConfig {
    /// Build config from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build config from an arbitrary variable lookup
    ///
    /// # Errors
    ///
    /// Returns error if a variable is set to an unparseable value, or if no
    /// database path is given and the home directory cannot be resolved.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let db_path = match lookup("ORGCHART_DB_PATH").filter(|p| !p.trim().is_empty()) {
            Some(path) => PathBuf::from(path),
            None => default_db_path()?,
        };

        let host = match lookup("ORGCHART_HOST") {
            Some(host) => host
                .trim()
                .parse::<IpAddr>()
                .with_context(|| format!("Invalid ORGCHART_HOST '{}'", host))?,
            None => IpAddr::V4(Ipv4Addr::LOCALHOST),
        };

        let port = match lookup("ORGCHART_PORT") {
            Some(port) => port
                .trim()
                .parse::<u16>()
                .with_context(|| format!("Invalid ORGCHART_PORT '{}'", port))?,
            None => DEFAULT_PORT,
        };

        let cors_origins = match lookup("CORS_ALLOW_ORIGIN") {
            Some(raw) => parse_origins(&raw)?,
            None => vec![DEFAULT_CORS_ORIGIN.to_string()],
        };

        Ok(Self {
            db_path,
            host,
            port,
            cors_origins,
        })
    }

    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

/// Default: ~/.orgchart/database/orgchart.db
fn default_db_path() -> Result<PathBuf> {
    let home_dir = dirs::home_dir().ok_or_else(|| anyhow!("Failed to get home directory"))?;

    Ok(home_dir
        .join(".orgchart")
        .join("database")
        .join("orgchart.db"))
}

fn parse_origins(raw: &str) -> Result<Vec<String>> {
    let origins: Vec<String> = raw
        .split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .map(str::to_string)
        .collect();

    if origins.is_empty() {
        return Err(anyhow!("CORS_ALLOW_ORIGIN is set but names no origin"));
    }

    for origin in &origins {
        HeaderValue::from_str(origin)
            .with_context(|| format!("Invalid CORS_ALLOW_ORIGIN entry '{}'", origin))?;
    }

    Ok(origins)
}
