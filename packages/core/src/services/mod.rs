//! Business Services
//!
//! - `PositionService` - hierarchy manager: CRUD, re-parenting and delete policies
//! - `hierarchy` - in-memory forest assembly and traversal over a record snapshot
//!
//! Services coordinate between the database layer and callers, enforcing the
//! hierarchy rules before anything is written.

pub mod error;
pub mod hierarchy;
pub mod position_service;

pub use error::PositionServiceError;
pub use hierarchy::{HierarchyIndex, IntegrityReport};
pub use position_service::PositionService;
