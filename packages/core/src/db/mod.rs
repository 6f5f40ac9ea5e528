//! Database Layer
//!
//! This module handles all database interactions using libsql:
//!
//! - Database initialization and connection management (`DatabaseService`)
//! - The `PositionStore` persistence abstraction
//! - `TursoStore`, the libsql implementation of `PositionStore`

mod database;
mod error;
mod position_store;
mod turso_store;

pub use database::{DatabaseService, DbPositionParams};
pub use error::DatabaseError;
pub use position_store::{PositionStore, ReassignResult};
pub use turso_store::TursoStore;
