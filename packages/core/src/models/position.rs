//! Position Data Structures
//!
//! This module defines the stored `PositionRecord`, the `Position` view
//! returned to callers, and the `PositionInput` accepted for create/update.
//!
//! # Architecture
//!
//! - **Id-based relations**: a record only knows its `parent_id`; no record
//!   holds a reference to another record
//! - **Derived views**: `parent_name` and `children` are assembled per request
//!   and never persisted
//!
//! # Examples
//!
//! ```rust
//! use orgchart_core::models::PositionInput;
//!
//! let input = PositionInput::new("CEO", "Chief Executive Officer", None);
//! assert!(input.validate().is_ok());
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Maximum length of a position name, in characters
pub const MAX_NAME_LENGTH: usize = 100;

/// Maximum length of a position description, in characters
pub const MAX_DESCRIPTION_LENGTH: usize = 500;

/// Maximum number of levels in one tree, counting the root as level 1
pub const MAX_HIERARCHY_DEPTH: usize = 64;

/// Validation errors for position input
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Field '{field}' exceeds {max} characters (got {actual})")]
    TooLong {
        field: String,
        max: usize,
        actual: usize,
    },
}

/// A position as stored in the `positions` table.
///
/// # Fields
///
/// - `id`: UUID string, immutable once created
/// - `name`: non-empty, at most 100 characters
/// - `description`: at most 500 characters, may be empty
/// - `parent_id`: `None` marks a root
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionRecord {
    pub id: String,
    pub name: String,
    pub description: String,
    pub parent_id: Option<String>,
}

impl PositionRecord {
    /// Create a new record with an auto-generated UUID
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        parent_id: Option<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            description: description.into(),
            parent_id,
        }
    }

    /// Build a record from validated input with a fresh id
    pub fn from_input(input: PositionInput) -> Self {
        Self::new(input.name, input.description, input.parent_id)
    }

    /// Whether this record is a root (no parent)
    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }
}

/// Position view returned by the hierarchy manager and the HTTP API.
///
/// Serializes as `{id, name, description, parentId, parentName, children}`.
/// `children` is only populated for hierarchy-shaped responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Position {
    pub id: String,
    pub name: String,
    pub description: String,
    pub parent_id: Option<String>,
    pub parent_name: Option<String>,
    #[serde(default)]
    pub children: Vec<Position>,
}

impl Position {
    /// View of a record with `parent_name` left unresolved
    pub fn from_record(record: PositionRecord) -> Self {
        Self {
            id: record.id,
            name: record.name,
            description: record.description,
            parent_id: record.parent_id,
            parent_name: None,
            children: Vec::new(),
        }
    }

    /// View of a record with the given parent name
    pub fn with_parent_name(record: PositionRecord, parent_name: Option<String>) -> Self {
        Self {
            parent_name,
            ..Self::from_record(record)
        }
    }

    /// Total number of positions in this subtree, including this one
    pub fn subtree_len(&self) -> usize {
        let mut len = 0;
        let mut stack = vec![self];
        while let Some(position) = stack.pop() {
            len += 1;
            stack.extend(position.children.iter());
        }
        len
    }
}

/// Create/update payload: `{name, description?, parentId?}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionInput {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub parent_id: Option<String>,
}

impl PositionInput {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        parent_id: Option<String>,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            parent_id,
        }
    }

    /// Validate field constraints
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if:
    /// - `name` is empty or whitespace only
    /// - `name` is longer than 100 characters
    /// - `description` is longer than 500 characters
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use orgchart_core::models::{PositionInput, ValidationError};
    /// let input = PositionInput::new("", "", None);
    /// assert_eq!(
    ///     input.validate(),
    ///     Err(ValidationError::MissingField("name".to_string()))
    /// );
    /// ```
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::MissingField("name".to_string()));
        }

        check_length("name", &self.name, MAX_NAME_LENGTH)?;
        check_length("description", &self.description, MAX_DESCRIPTION_LENGTH)?;

        Ok(())
    }
}

fn check_length(field: &str, value: &str, max: usize) -> Result<(), ValidationError> {
    let actual = value.chars().count();
    if actual > max {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max,
            actual,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_validate_accepts_minimal_input() {
        let input = PositionInput::new("CTO", "", None);
        assert!(input.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_blank_name() {
        for name in ["", "   ", "\t\n"] {
            let input = PositionInput::new(name, "desc", None);
            assert_eq!(
                input.validate(),
                Err(ValidationError::MissingField("name".to_string()))
            );
        }
    }

    #[test]
    fn test_validate_length_limits_count_characters() {
        let at_limit = PositionInput::new("é".repeat(MAX_NAME_LENGTH), "", None);
        assert!(at_limit.validate().is_ok());

        let too_long = PositionInput::new("a".repeat(MAX_NAME_LENGTH + 1), "", None);
        assert!(matches!(
            too_long.validate(),
            Err(ValidationError::TooLong { ref field, actual: 101, .. }) if field == "name"
        ));

        let long_description =
            PositionInput::new("Lead", "d".repeat(MAX_DESCRIPTION_LENGTH + 1), None);
        assert!(matches!(
            long_description.validate(),
            Err(ValidationError::TooLong { ref field, .. }) if field == "description"
        ));
    }

    #[test]
    fn test_input_defaults_optional_fields() {
        let input: PositionInput = serde_json::from_value(json!({ "name": "CEO" })).unwrap();
        assert_eq!(input.description, "");
        assert_eq!(input.parent_id, None);

        let input: PositionInput =
            serde_json::from_value(json!({ "name": "CTO", "parentId": "abc" })).unwrap();
        assert_eq!(input.parent_id.as_deref(), Some("abc"));
    }

    #[test]
    fn test_position_wire_shape() {
        let record = PositionRecord {
            id: "p1".to_string(),
            name: "CTO".to_string(),
            description: "Tech".to_string(),
            parent_id: Some("p0".to_string()),
        };
        let position = Position::with_parent_name(record, Some("CEO".to_string()));

        let value = serde_json::to_value(&position).unwrap();
        assert_eq!(
            value,
            json!({
                "id": "p1",
                "name": "CTO",
                "description": "Tech",
                "parentId": "p0",
                "parentName": "CEO",
                "children": []
            })
        );
    }

    #[test]
    fn test_new_record_gets_unique_uuid() {
        let a = PositionRecord::new("A", "", None);
        let b = PositionRecord::new("B", "", None);
        assert_ne!(a.id, b.id);
        assert!(Uuid::parse_str(&a.id).is_ok());
        assert!(a.is_root());
    }
}
