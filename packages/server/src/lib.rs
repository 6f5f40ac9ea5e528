//! OrgChart HTTP Server
//!
//! Serves the position hierarchy from `orgchart-core` over a JSON REST API.
//!
//! # Modules
//!
//! - [`api`] - Router, endpoints and error bodies
//! - [`config`] - Environment-driven runtime configuration

pub mod api;
pub mod config;

pub use config::ServerConfig;
