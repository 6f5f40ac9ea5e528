//! Data Models
//!
//! - `PositionRecord` - a stored row of the `positions` table
//! - `Position` - the view returned to callers (resolved parent name, children)
//! - `PositionInput` - create/update payload with validation

mod position;

pub use position::{
    Position, PositionInput, PositionRecord, ValidationError, MAX_DESCRIPTION_LENGTH,
    MAX_HIERARCHY_DEPTH, MAX_NAME_LENGTH,
};
