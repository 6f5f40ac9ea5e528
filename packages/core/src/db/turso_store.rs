//! TursoStore - PositionStore Implementation for the libsql Backend
//!
//! TursoStore wraps `DatabaseService` and delegates every operation to its
//! `db_*` methods. It owns row conversion and nothing else: no hierarchy rules
//! live here.
//!
//! # Examples
//!
//! ```rust,no_run
//! use orgchart_core::db::{DatabaseService, PositionStore, TursoStore};
//! use std::path::PathBuf;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let db = Arc::new(DatabaseService::new(PathBuf::from("./data/test.db")).await?);
//!     let store: Arc<dyn PositionStore> = Arc::new(TursoStore::new(db));
//!     let positions = store.list_positions().await?;
//!     println!("{} positions", positions.len());
//!     Ok(())
//! }
//! ```

use crate::db::position_store::{PositionStore, ReassignResult};
use crate::db::{DatabaseService, DbPositionParams};
use crate::models::PositionRecord;
use anyhow::{Context, Result};
use async_trait::async_trait;
use libsql::Row;
use std::sync::Arc;

/// TursoStore implements PositionStore for the libsql backend
pub struct TursoStore {
    db: Arc<DatabaseService>,
}

impl TursoStore {
    /// Create a new TursoStore wrapper
    pub fn new(db: Arc<DatabaseService>) -> Self {
        Self { db }
    }

    /// Convert libsql::Row to PositionRecord
    ///
    /// # Row Format
    ///
    /// Expected columns (in order):
    /// - id (TEXT)
    /// - name (TEXT)
    /// - description (TEXT)
    /// - parent_id (TEXT, nullable)
    fn row_to_position(row: &Row) -> Result<PositionRecord> {
        let id: String = row.get(0).context("Failed to get id")?;
        let name: String = row.get(1).context("Failed to get name")?;
        let description: String = row.get(2).context("Failed to get description")?;
        let parent_id: Option<String> = row.get(3).context("Failed to get parent_id")?;

        Ok(PositionRecord {
            id,
            name,
            description,
            parent_id,
        })
    }

    async fn collect_rows(mut rows: libsql::Rows) -> Result<Vec<PositionRecord>> {
        let mut positions = Vec::new();
        while let Some(row) = rows.next().await.context("Failed to read row")? {
            positions.push(Self::row_to_position(&row)?);
        }
        Ok(positions)
    }
}

#[async_trait]
impl PositionStore for TursoStore {
    async fn insert_position(&self, record: PositionRecord) -> Result<PositionRecord> {
        let params = DbPositionParams {
            id: &record.id,
            name: &record.name,
            description: &record.description,
            parent_id: record.parent_id.as_deref(),
        };

        self.db
            .db_insert_position(params)
            .await
            .with_context(|| format!("Failed to insert position '{}'", record.id))?;

        Ok(record)
    }

    async fn get_position(&self, id: &str) -> Result<Option<PositionRecord>> {
        let row = self
            .db
            .db_get_position(id)
            .await
            .with_context(|| format!("Failed to get position '{}'", id))?;

        row.as_ref().map(Self::row_to_position).transpose()
    }

    async fn update_position(&self, record: PositionRecord) -> Result<bool> {
        let params = DbPositionParams {
            id: &record.id,
            name: &record.name,
            description: &record.description,
            parent_id: record.parent_id.as_deref(),
        };

        let rows_affected = self
            .db
            .db_update_position(params)
            .await
            .with_context(|| format!("Failed to update position '{}'", record.id))?;

        Ok(rows_affected > 0)
    }

    async fn delete_position(&self, id: &str) -> Result<bool> {
        let rows_affected = self
            .db
            .db_delete_position(id)
            .await
            .with_context(|| format!("Failed to delete position '{}'", id))?;

        Ok(rows_affected > 0)
    }

    async fn list_positions(&self) -> Result<Vec<PositionRecord>> {
        let rows = self
            .db
            .db_list_positions()
            .await
            .context("Failed to list positions")?;

        Self::collect_rows(rows).await
    }

    async fn list_children(&self, parent_id: &str) -> Result<Vec<PositionRecord>> {
        let rows = self
            .db
            .db_list_children(parent_id)
            .await
            .with_context(|| format!("Failed to list children of '{}'", parent_id))?;

        Self::collect_rows(rows).await
    }

    async fn count_children(&self, parent_id: &str) -> Result<u64> {
        self.db
            .db_count_children(parent_id)
            .await
            .with_context(|| format!("Failed to count children of '{}'", parent_id))
    }

    async fn delete_positions(&self, ids: &[String]) -> Result<u64> {
        self.db
            .db_delete_positions(ids)
            .await
            .with_context(|| format!("Failed to delete {} positions", ids.len()))
    }

    async fn reassign_children_and_delete(
        &self,
        id: &str,
        new_parent_id: Option<&str>,
    ) -> Result<ReassignResult> {
        let (reassigned_children, deleted) = self
            .db
            .db_reassign_children_and_delete(id, new_parent_id)
            .await
            .with_context(|| format!("Failed to reassign children and delete '{}'", id))?;

        Ok(ReassignResult {
            reassigned_children,
            deleted: deleted > 0,
        })
    }
}
