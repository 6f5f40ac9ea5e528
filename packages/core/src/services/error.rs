//! Service Layer Error Types
//!
//! This module defines error types for hierarchy manager operations.
//! Not-found is not an error here: lookups return `Option` and deletes
//! return `bool`.

use crate::models::ValidationError;
use thiserror::Error;

/// Position service errors
#[derive(Error, Debug)]
pub enum PositionServiceError {
    /// Input failed field validation
    #[error("Position validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),

    /// Parent does not exist, or the new parent would create a cycle or exceed the depth limit
    #[error("Invalid parent reference: {reason}")]
    InvalidReference { reason: String },

    /// Simple delete attempted on a position that still has children
    #[error("Cannot delete position {id}: it has {child_count} child position(s)")]
    HasChildren { id: String, child_count: u64 },

    /// Store call failed
    #[error("Store operation failed: {0}")]
    StoreFailed(String),
}

impl PositionServiceError {
    /// Parent id names no existing position
    pub fn parent_not_found(parent_id: impl AsRef<str>) -> Self {
        Self::InvalidReference {
            reason: format!("parent position '{}' not found", parent_id.as_ref()),
        }
    }

    /// Re-parenting `id` under `parent_id` would make `id` its own ancestor
    pub fn circular_reference(id: impl AsRef<str>, parent_id: impl AsRef<str>) -> Self {
        Self::InvalidReference {
            reason: format!(
                "moving '{}' under '{}' would create a circular reference",
                id.as_ref(),
                parent_id.as_ref()
            ),
        }
    }

    /// Placing `id` would push part of its tree below `max_depth` levels
    pub fn too_deep(id: impl AsRef<str>, max_depth: usize) -> Self {
        Self::InvalidReference {
            reason: format!(
                "placing '{}' there would nest the hierarchy deeper than {} levels",
                id.as_ref(),
                max_depth
            ),
        }
    }

    /// Create a has-children error
    pub fn has_children(id: impl Into<String>, child_count: u64) -> Self {
        Self::HasChildren {
            id: id.into(),
            child_count,
        }
    }

    /// Create a store failure error
    pub fn store_failed(msg: impl Into<String>) -> Self {
        Self::StoreFailed(msg.into())
    }
}
