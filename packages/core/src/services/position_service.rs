//! Position Service - Hierarchy Manager
//!
//! This module provides the business logic layer for positions:
//!
//! - CRUD operations with resolved parent names
//! - Forest assembly (`get_hierarchy`) and direct-children queries
//! - Re-parenting with circular reference detection
//! - Three delete policies: restrict, cascade, reassign-to-grandparent
//!
//! # Invariants
//!
//! - The non-null parent relation forms a forest (no position is its own ancestor)
//! - A `parent_id` always names an existing position
//! - Creates and moves never nest a tree deeper than `MAX_HIERARCHY_DEPTH` levels
//!
//! # Write Serialization
//!
//! Every mutating operation holds `write_lock` from its first validation read
//! until its last write. The ancestor walk in `update_position` and the
//! descendant snapshot in `delete_position_cascade` therefore cannot race
//! another writer in this process. Reads never take the lock.

use crate::db::PositionStore;
use crate::models::{Position, PositionInput, PositionRecord, MAX_HIERARCHY_DEPTH};
use crate::services::error::PositionServiceError;
use crate::services::hierarchy::{HierarchyIndex, IntegrityReport};
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Log a store failure with its full context chain and convert it
fn store_error(context: &str, err: anyhow::Error) -> PositionServiceError {
    tracing::error!("{}: {:?}", context, err);
    PositionServiceError::store_failed(format!("{}: {}", context, err))
}

/// Hierarchy manager over a `PositionStore`
///
/// # Examples
///
/// ```no_run
/// # use orgchart_core::db::{DatabaseService, TursoStore};
/// # use orgchart_core::models::PositionInput;
/// # use orgchart_core::services::PositionService;
/// # use std::path::PathBuf;
/// # use std::sync::Arc;
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let db = Arc::new(DatabaseService::new(PathBuf::from("./orgchart.db")).await?);
/// let service = PositionService::new(Arc::new(TursoStore::new(db)));
///
/// let ceo = service
///     .create_position(PositionInput::new("CEO", "Chief Executive Officer", None))
///     .await?;
/// let cto = service
///     .create_position(PositionInput::new("CTO", "", Some(ceo.id.clone())))
///     .await?;
/// assert_eq!(cto.parent_name.as_deref(), Some("CEO"));
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct PositionService {
    store: Arc<dyn PositionStore>,
    write_lock: Arc<Mutex<()>>,
}

impl PositionService {
    pub fn new(store: Arc<dyn PositionStore>) -> Self {
        Self {
            store,
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Load every record once
    async fn snapshot(&self) -> Result<Vec<PositionRecord>, PositionServiceError> {
        self.store
            .list_positions()
            .await
            .map_err(|e| store_error("Failed to load positions", e))
    }

    async fn fetch(&self, id: &str) -> Result<Option<PositionRecord>, PositionServiceError> {
        self.store
            .get_position(id)
            .await
            .map_err(|e| store_error("Failed to fetch position", e))
    }

    /// Fetch the proposed parent, rejecting ids that do not exist
    async fn require_parent(&self, parent_id: &str) -> Result<PositionRecord, PositionServiceError> {
        self.fetch(parent_id)
            .await?
            .ok_or_else(|| PositionServiceError::parent_not_found(parent_id))
    }

    /// Create a new position
    ///
    /// Input is validated before any store call. The new position gets a fresh
    /// UUID and no children.
    ///
    /// # Errors
    ///
    /// - `ValidationFailed` if name/description violate their constraints
    /// - `InvalidReference` if `parent_id` names no existing position, or the
    ///   new position would sit deeper than `MAX_HIERARCHY_DEPTH` levels
    pub async fn create_position(
        &self,
        input: PositionInput,
    ) -> Result<Position, PositionServiceError> {
        input.validate()?;

        let _guard = self.write_lock.lock().await;

        let parent_name = match input.parent_id.as_deref() {
            Some(parent_id) => {
                let parent = self.require_parent(parent_id).await?;
                if self.depth_of(parent_id, None).await? >= MAX_HIERARCHY_DEPTH {
                    return Err(PositionServiceError::too_deep(&input.name, MAX_HIERARCHY_DEPTH));
                }
                Some(parent.name)
            }
            None => None,
        };

        let record = self
            .store
            .insert_position(PositionRecord::from_input(input))
            .await
            .map_err(|e| store_error("Failed to create position", e))?;

        tracing::info!("Created position '{}' ({})", record.name, record.id);

        Ok(Position::with_parent_name(record, parent_name))
    }

    /// Get a position by id with its parent name resolved
    pub async fn get_position(&self, id: &str) -> Result<Option<Position>, PositionServiceError> {
        let Some(record) = self.fetch(id).await? else {
            return Ok(None);
        };

        let parent_name = match record.parent_id.as_deref() {
            Some(parent_id) => self.fetch(parent_id).await?.map(|parent| parent.name),
            None => None,
        };

        Ok(Some(Position::with_parent_name(record, parent_name)))
    }

    /// Every position with its parent name resolved, in storage order
    pub async fn list_positions(&self) -> Result<Vec<Position>, PositionServiceError> {
        let records = self.snapshot().await?;
        let index = HierarchyIndex::build(&records);

        Ok(records
            .iter()
            .map(|record| Position::with_parent_name(record.clone(), index.parent_name(record)))
            .collect())
    }

    /// Positions whose name or description contains `term`, case-insensitively
    ///
    /// A blank term returns every position.
    pub async fn search_positions(&self, term: &str) -> Result<Vec<Position>, PositionServiceError> {
        let term = term.trim().to_lowercase();
        let positions = self.list_positions().await?;
        if term.is_empty() {
            return Ok(positions);
        }

        Ok(positions
            .into_iter()
            .filter(|position| {
                position.name.to_lowercase().contains(&term)
                    || position.description.to_lowercase().contains(&term)
            })
            .collect())
    }

    /// The whole forest: one nested tree per root
    ///
    /// Records that cannot be reached from a root (a corrupted parent cycle or
    /// a dangling parent) are left out and logged.
    pub async fn get_hierarchy(&self) -> Result<Vec<Position>, PositionServiceError> {
        let records = self.snapshot().await?;
        let index = HierarchyIndex::build(&records);
        let forest = index.forest();

        let placed: usize = forest.iter().map(Position::subtree_len).sum();
        if placed < records.len() {
            tracing::warn!(
                "Hierarchy omits {} of {} positions unreachable from any root",
                records.len() - placed,
                records.len()
            );
        }

        Ok(forest)
    }

    /// Direct children of `parent_id`
    ///
    /// Returns raw fields only: `parent_name` is not resolved on this path.
    pub async fn get_children(&self, parent_id: &str) -> Result<Vec<Position>, PositionServiceError> {
        let children = self
            .store
            .list_children(parent_id)
            .await
            .map_err(|e| store_error("Failed to list children", e))?;

        Ok(children.into_iter().map(Position::from_record).collect())
    }

    /// Update name, description and parent of a position
    ///
    /// # Returns
    ///
    /// `None` if no position has `id`
    ///
    /// # Errors
    ///
    /// - `ValidationFailed` if name/description violate their constraints
    /// - `InvalidReference` if the new parent does not exist, is `id` itself,
    ///   is a descendant of `id`, or would push the subtree of `id` deeper than
    ///   `MAX_HIERARCHY_DEPTH` levels
    pub async fn update_position(
        &self,
        id: &str,
        input: PositionInput,
    ) -> Result<Option<Position>, PositionServiceError> {
        input.validate()?;

        let _guard = self.write_lock.lock().await;

        let Some(existing) = self.fetch(id).await? else {
            return Ok(None);
        };

        let parent_name = match input.parent_id.as_deref() {
            Some(parent_id) => {
                if parent_id == id {
                    return Err(PositionServiceError::circular_reference(id, parent_id));
                }
                let parent = self.require_parent(parent_id).await?;
                let parent_depth = self.depth_of(parent_id, Some(id)).await?;
                if existing.parent_id.as_deref() != Some(parent_id) {
                    let records = self.snapshot().await?;
                    let height = HierarchyIndex::build(&records).height(id);
                    if parent_depth + height > MAX_HIERARCHY_DEPTH {
                        return Err(PositionServiceError::too_deep(id, MAX_HIERARCHY_DEPTH));
                    }
                }
                Some(parent.name)
            }
            None => None,
        };

        let record = PositionRecord {
            id: existing.id,
            name: input.name,
            description: input.description,
            parent_id: input.parent_id,
        };

        let updated = self
            .store
            .update_position(record.clone())
            .await
            .map_err(|e| store_error("Failed to update position", e))?;
        if !updated {
            return Ok(None);
        }

        tracing::info!("Updated position '{}' ({})", record.name, record.id);

        Ok(Some(Position::with_parent_name(record, parent_name)))
    }

    /// Level of `start` in its tree, counting the root as level 1
    ///
    /// Walks parent pointers upward from `start` until a root. O(depth) store
    /// reads.
    ///
    /// # Errors
    ///
    /// - `InvalidReference` if the walk reaches `moving`, so making `start` the
    ///   parent of `moving` would close a cycle
    /// - `InvalidReference` if the ancestor chain of `start` already loops
    ///   without passing through `moving`
    async fn depth_of(
        &self,
        start: &str,
        moving: Option<&str>,
    ) -> Result<usize, PositionServiceError> {
        let mut visited: HashSet<String> = HashSet::new();
        let mut current = Some(start.to_string());

        while let Some(current_id) = current {
            if let Some(moving) = moving.filter(|moving| *moving == current_id) {
                return Err(PositionServiceError::circular_reference(moving, start));
            }
            if !visited.insert(current_id.clone()) {
                tracing::warn!("Ancestor chain of '{}' loops at '{}'", start, current_id);
                return Err(PositionServiceError::InvalidReference {
                    reason: format!("ancestor chain of '{}' contains a cycle", start),
                });
            }
            current = self.fetch(&current_id).await?.and_then(|p| p.parent_id);
        }

        Ok(visited.len())
    }

    /// Delete a position that has no children
    ///
    /// # Returns
    ///
    /// `false` if no position has `id`
    ///
    /// # Errors
    ///
    /// `HasChildren` if any position reports to `id`; nothing is removed.
    pub async fn delete_position(&self, id: &str) -> Result<bool, PositionServiceError> {
        let _guard = self.write_lock.lock().await;

        if self.fetch(id).await?.is_none() {
            return Ok(false);
        }

        let child_count = self
            .store
            .count_children(id)
            .await
            .map_err(|e| store_error("Failed to count children", e))?;
        if child_count > 0 {
            return Err(PositionServiceError::has_children(id, child_count));
        }

        let deleted = self
            .store
            .delete_position(id)
            .await
            .map_err(|e| store_error("Failed to delete position", e))?;

        if deleted {
            tracing::info!("Deleted position {}", id);
        }
        Ok(deleted)
    }

    /// Delete a position together with all of its transitive descendants
    ///
    /// The descendant set is computed from one snapshot, then removed in a
    /// single store transaction, deepest positions first.
    ///
    /// # Returns
    ///
    /// `false` if no position has `id`
    pub async fn delete_position_cascade(&self, id: &str) -> Result<bool, PositionServiceError> {
        let _guard = self.write_lock.lock().await;

        let records = self.snapshot().await?;
        let index = HierarchyIndex::build(&records);
        if index.get(id).is_none() {
            return Ok(false);
        }

        let mut batch = index.descendants(id);
        batch.reverse();
        batch.push(id.to_string());

        let removed = self
            .store
            .delete_positions(&batch)
            .await
            .map_err(|e| store_error("Failed to cascade delete position", e))?;

        tracing::info!(
            "Cascade deleted position {} and {} descendant(s)",
            id,
            removed.saturating_sub(1)
        );
        Ok(true)
    }

    /// Delete a position and hand its direct children to its former parent
    ///
    /// Children of a root become roots. Grandchildren keep their parent. The
    /// re-parenting and the delete run in one store transaction.
    ///
    /// # Returns
    ///
    /// `false` if no position has `id`
    pub async fn delete_position_with_reassignment(
        &self,
        id: &str,
    ) -> Result<bool, PositionServiceError> {
        let _guard = self.write_lock.lock().await;

        let Some(record) = self.fetch(id).await? else {
            return Ok(false);
        };

        let result = self
            .store
            .reassign_children_and_delete(id, record.parent_id.as_deref())
            .await
            .map_err(|e| store_error("Failed to delete position with reassignment", e))?;

        tracing::info!(
            "Deleted position {} and reassigned {} child(ren) to {}",
            id,
            result.reassigned_children,
            record.parent_id.as_deref().unwrap_or("<root>")
        );
        Ok(result.deleted)
    }

    /// Read-only sweep for dangling parents and unreachable positions
    pub async fn check_integrity(&self) -> Result<IntegrityReport, PositionServiceError> {
        let records = self.snapshot().await?;
        Ok(HierarchyIndex::build(&records).integrity())
    }
}

// Scenario tests in separate module
#[cfg(test)]
#[path = "position_service_test.rs"]
mod position_service_test;
