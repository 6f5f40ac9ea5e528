//! OrgChart Core Business Logic Layer
//!
//! This crate provides data management and hierarchy rules for an
//! organizational chart of positions, each of which reports to at most one
//! parent position.
//!
//! # Architecture
//!
//! - **Forest of positions**: the non-null parent relation never forms a cycle
//! - **Id-based relations**: records store `parent_id`; trees are assembled per request
//! - **libsql**: Embedded SQLite-compatible database with a foreign key on `parent_id`
//! - **Serialized writes**: one in-process lock orders every mutation
//!
//! # Modules
//!
//! - [`models`] - Data structures (PositionRecord, Position, PositionInput)
//! - [`services`] - Hierarchy manager and in-memory forest algorithms
//! - [`db`] - Database layer with libsql integration

pub mod db;
pub mod models;
pub mod services;

// Re-export commonly used types
pub use models::*;
pub use services::*;
