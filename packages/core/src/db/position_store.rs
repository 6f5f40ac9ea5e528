//! PositionStore Trait - Persistence Abstraction
//!
//! The `PositionStore` trait sits between `PositionService` (hierarchy rules)
//! and the database implementation. The service never issues SQL; it asks the
//! store for records and for the two multi-record writes that must be atomic.
//!
//! # Design Decisions
//!
//! 1. **Async-First**: all methods are async
//! 2. **Ownership Semantics**: writes take ownership of the record
//! 3. **Error Handling**: `anyhow::Result` for flexible error context
//! 4. **Atomic batches**: `delete_positions` and `reassign_children_and_delete`
//!    must apply all-or-nothing
//!
//! # Examples
//!
//! ```rust,no_run
//! use orgchart_core::db::{DatabaseService, PositionStore, TursoStore};
//! use orgchart_core::models::PositionRecord;
//! use std::path::PathBuf;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let db = Arc::new(DatabaseService::new(PathBuf::from("./data/orgchart.db")).await?);
//!     let store: Arc<dyn PositionStore> = Arc::new(TursoStore::new(db));
//!
//!     let ceo = store.insert_position(PositionRecord::new("CEO", "", None)).await?;
//!     let children = store.list_children(&ceo.id).await?;
//!     assert!(children.is_empty());
//!     Ok(())
//! }
//! ```

use crate::models::PositionRecord;
use anyhow::Result;
use async_trait::async_trait;

/// Outcome of a reassign-and-delete batch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReassignResult {
    /// Number of direct children whose parent was rewritten
    pub reassigned_children: u64,
    /// Whether the target position was removed
    pub deleted: bool,
}

/// Abstraction layer for position persistence
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync` so the store can be shared across
/// request handlers.
#[async_trait]
pub trait PositionStore: Send + Sync {
    //
    // CORE CRUD OPERATIONS
    //

    /// Insert a new position
    ///
    /// # Errors
    ///
    /// Returns error if the id already exists or `parent_id` names a missing
    /// position (foreign key violation).
    async fn insert_position(&self, record: PositionRecord) -> Result<PositionRecord>;

    /// Get a position by id, `None` if absent
    async fn get_position(&self, id: &str) -> Result<Option<PositionRecord>>;

    /// Overwrite name, description and parent of an existing position
    ///
    /// # Returns
    ///
    /// `false` if no position has `record.id`
    async fn update_position(&self, record: PositionRecord) -> Result<bool>;

    /// Delete one position
    ///
    /// # Returns
    ///
    /// `false` if no position has this id
    async fn delete_position(&self, id: &str) -> Result<bool>;

    //
    // QUERYING
    //

    /// All positions in stable storage order
    async fn list_positions(&self) -> Result<Vec<PositionRecord>>;

    /// Direct children of `parent_id` in storage order
    async fn list_children(&self, parent_id: &str) -> Result<Vec<PositionRecord>>;

    /// Number of direct children of `parent_id`
    async fn count_children(&self, parent_id: &str) -> Result<u64>;

    //
    // ATOMIC BATCHES
    //

    /// Delete all `ids` in one transaction
    ///
    /// `ids` are ordered children-before-parents.
    ///
    /// # Returns
    ///
    /// Number of positions removed
    async fn delete_positions(&self, ids: &[String]) -> Result<u64>;

    /// Re-parent the direct children of `id` to `new_parent_id` and delete
    /// `id`, in one transaction
    async fn reassign_children_and_delete(
        &self,
        id: &str,
        new_parent_id: Option<&str>,
    ) -> Result<ReassignResult>;
}
