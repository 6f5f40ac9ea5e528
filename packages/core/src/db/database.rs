//! Database Connection Management
//!
//! This module provides the database connection and schema initialization
//! for the `positions` table using libsql.
//!
//! # Architecture
//!
//! - **Path-agnostic**: Accepts any valid PathBuf
//! - **WAL mode**: Write-Ahead Logging for concurrent readers
//! - **Foreign keys**: `parent_id` references `positions(id)`, enabled on every connection
//! - **Insertion order**: listings are ordered by `rowid`, giving stable iteration
//!
//! # Database Connection Patterns
//!
//! Always use `connect_with_timeout()` in async functions. The 5-second busy
//! timeout lets concurrent operations wait instead of failing immediately with
//! `SQLITE_BUSY`.
//!
//! ```no_run
//! # use orgchart_core::db::DatabaseService;
//! # use std::path::PathBuf;
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let db_service = DatabaseService::new(PathBuf::from("./data/orgchart.db")).await?;
//! let conn = db_service.connect_with_timeout().await?;
//! # Ok(())
//! # }
//! ```

use crate::db::error::DatabaseError;
use libsql::{Builder, Database};
use std::path::PathBuf;
use std::sync::Arc;

/// Columns selected for every position query, in `row_to_position` order
const POSITION_COLUMNS: &str = "id, name, description, parent_id";

/// Database service for managing the libsql connection and schema
#[derive(Debug, Clone)]
pub struct DatabaseService {
    /// libsql database handle (wrapped in Arc for sharing)
    pub db: Arc<Database>,

    /// Path to the database file
    pub db_path: PathBuf,
}

/// Parameters for position insertion and update
pub struct DbPositionParams<'a> {
    pub id: &'a str,
    pub name: &'a str,
    pub description: &'a str,
    pub parent_id: Option<&'a str>,
}

impl DatabaseService {
    /// Create a new DatabaseService with the specified database path
    ///
    /// This will:
    /// 1. Ensure the parent directory exists (create if needed)
    /// 2. Open/create the database file
    /// 3. Initialize the schema (CREATE TABLE IF NOT EXISTS)
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if:
    /// - Parent directory cannot be created
    /// - Database connection fails
    /// - Schema initialization fails
    pub async fn new(db_path: PathBuf) -> Result<Self, DatabaseError> {
        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    if e.kind() == std::io::ErrorKind::PermissionDenied {
                        DatabaseError::permission_denied(db_path.clone())
                    } else {
                        DatabaseError::DirectoryCreationFailed(e)
                    }
                })?;
            }
        }

        let db = Builder::new_local(&db_path)
            .build()
            .await
            .map_err(|e| DatabaseError::connection_failed(db_path.clone(), e))?;

        let service = Self {
            db: Arc::new(db),
            db_path,
        };

        service.initialize_schema().await?;

        tracing::debug!("Database ready at {}", service.db_path.display());

        Ok(service)
    }

    /// Execute a PRAGMA statement
    ///
    /// PRAGMA statements return rows, so we must use query() instead of execute().
    async fn execute_pragma(
        &self,
        conn: &libsql::Connection,
        pragma: &str,
    ) -> Result<(), DatabaseError> {
        let mut stmt = conn.prepare(pragma).await.map_err(|e| {
            DatabaseError::sql_execution(format!("Failed to execute '{}': {}", pragma, e))
        })?;
        let _ = stmt.query(()).await.map_err(|e| {
            DatabaseError::sql_execution(format!("Failed to execute '{}': {}", pragma, e))
        })?;
        Ok(())
    }

    /// Initialize database schema and configuration
    ///
    /// Idempotent: safe to call against an existing database.
    ///
    /// # Schema
    ///
    /// - `positions` table with a self-referencing `parent_id` foreign key
    /// - `idx_positions_parent` index for child lookups
    async fn initialize_schema(&self) -> Result<(), DatabaseError> {
        let conn = self.connect_with_timeout().await?;

        self.execute_pragma(&conn, "PRAGMA journal_mode = WAL")
            .await?;

        // NO ACTION (not RESTRICT) so multi-statement deletes are checked per
        // statement, which the leaf-first cascade relies on.
        conn.execute(
            "CREATE TABLE IF NOT EXISTS positions (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                description TEXT NOT NULL DEFAULT '',
                parent_id TEXT,
                created_at DATETIME DEFAULT CURRENT_TIMESTAMP,
                modified_at DATETIME DEFAULT CURRENT_TIMESTAMP,
                FOREIGN KEY (parent_id) REFERENCES positions(id)
            )",
            (),
        )
        .await
        .map_err(|e| {
            DatabaseError::initialization_failed(format!(
                "Failed to create positions table: {}",
                e
            ))
        })?;

        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_positions_parent ON positions(parent_id)",
            (),
        )
        .await
        .map_err(|e| {
            DatabaseError::initialization_failed(format!(
                "Failed to create index 'idx_positions_parent': {}",
                e
            ))
        })?;

        Ok(())
    }

    /// Get a synchronous connection handle
    ///
    /// Prefer `connect_with_timeout()` in async code; this handle has neither
    /// the busy timeout nor foreign keys enabled.
    pub fn connect(&self) -> Result<libsql::Connection, DatabaseError> {
        self.db.connect().map_err(DatabaseError::LibsqlError)
    }

    /// Get a connection with busy timeout and foreign keys configured
    ///
    /// `foreign_keys` is a per-connection setting in SQLite, so it is applied
    /// here rather than once at schema initialization.
    pub async fn connect_with_timeout(&self) -> Result<libsql::Connection, DatabaseError> {
        let conn = self.connect()?;

        self.execute_pragma(&conn, "PRAGMA busy_timeout = 5000")
            .await?;
        self.execute_pragma(&conn, "PRAGMA foreign_keys = ON")
            .await?;

        Ok(conn)
    }

    //
    // POSITION OPERATIONS
    // Raw SQL, wrapped by the PositionStore trait implementation.
    //

    /// Insert a position row
    pub async fn db_insert_position(
        &self,
        params: DbPositionParams<'_>,
    ) -> Result<(), DatabaseError> {
        let conn = self.connect_with_timeout().await?;

        conn.execute(
            "INSERT INTO positions (id, name, description, parent_id) VALUES (?, ?, ?, ?)",
            (params.id, params.name, params.description, params.parent_id),
        )
        .await
        .map_err(|e| DatabaseError::sql_execution(format!("Failed to insert position: {}", e)))?;

        Ok(())
    }

    /// Retrieve a single position row by ID
    ///
    /// # Returns
    ///
    /// * `Ok(Some(row))` - Position found
    /// * `Ok(None)` - No such position
    pub async fn db_get_position(&self, id: &str) -> Result<Option<libsql::Row>, DatabaseError> {
        let conn = self.connect_with_timeout().await?;

        let mut stmt = conn
            .prepare(&format!(
                "SELECT {} FROM positions WHERE id = ?",
                POSITION_COLUMNS
            ))
            .await
            .map_err(|e| {
                DatabaseError::sql_execution(format!(
                    "Failed to prepare get_position query: {}",
                    e
                ))
            })?;

        let mut rows = stmt.query([id]).await.map_err(|e| {
            DatabaseError::sql_execution(format!("Failed to execute get_position query: {}", e))
        })?;

        rows.next()
            .await
            .map_err(|e| DatabaseError::sql_execution(e.to_string()))
    }

    /// All position rows in insertion order
    pub async fn db_list_positions(&self) -> Result<libsql::Rows, DatabaseError> {
        let conn = self.connect_with_timeout().await?;

        conn.query(
            &format!("SELECT {} FROM positions ORDER BY rowid", POSITION_COLUMNS),
            (),
        )
        .await
        .map_err(|e| DatabaseError::sql_execution(format!("Failed to list positions: {}", e)))
    }

    /// Direct children of `parent_id` in insertion order
    pub async fn db_list_children(&self, parent_id: &str) -> Result<libsql::Rows, DatabaseError> {
        let conn = self.connect_with_timeout().await?;

        conn.query(
            &format!(
                "SELECT {} FROM positions WHERE parent_id = ? ORDER BY rowid",
                POSITION_COLUMNS
            ),
            [parent_id],
        )
        .await
        .map_err(|e| DatabaseError::sql_execution(format!("Failed to list children: {}", e)))
    }

    /// Number of direct children of `parent_id`
    pub async fn db_count_children(&self, parent_id: &str) -> Result<u64, DatabaseError> {
        let conn = self.connect_with_timeout().await?;

        let mut rows = conn
            .query(
                "SELECT COUNT(*) FROM positions WHERE parent_id = ?",
                [parent_id],
            )
            .await
            .map_err(|e| {
                DatabaseError::sql_execution(format!("Failed to count children: {}", e))
            })?;

        let count: i64 = match rows
            .next()
            .await
            .map_err(|e| DatabaseError::sql_execution(e.to_string()))?
        {
            Some(row) => row.get(0)?,
            None => 0,
        };

        Ok(count.max(0) as u64)
    }

    /// Update name, description and parent of a position
    ///
    /// # Returns
    ///
    /// Number of rows affected (0 = position didn't exist)
    pub async fn db_update_position(
        &self,
        params: DbPositionParams<'_>,
    ) -> Result<u64, DatabaseError> {
        let conn = self.connect_with_timeout().await?;

        conn.execute(
            "UPDATE positions SET name = ?, description = ?, parent_id = ?, modified_at = CURRENT_TIMESTAMP WHERE id = ?",
            (params.name, params.description, params.parent_id, params.id),
        )
        .await
        .map_err(|e| DatabaseError::sql_execution(format!("Failed to update position: {}", e)))
    }

    /// Delete a single position row
    ///
    /// Fails with a foreign key violation if the position still has children.
    pub async fn db_delete_position(&self, id: &str) -> Result<u64, DatabaseError> {
        let conn = self.connect_with_timeout().await?;

        conn.execute("DELETE FROM positions WHERE id = ?", [id])
            .await
            .map_err(|e| DatabaseError::sql_execution(format!("Failed to delete position: {}", e)))
    }

    /// Delete many positions in one transaction
    ///
    /// `ids` must be ordered so that every child precedes its parent; each
    /// DELETE is checked against the foreign key when it completes.
    ///
    /// # Returns
    ///
    /// Total number of rows deleted
    ///
    /// # Errors
    ///
    /// Any failed DELETE rolls back the whole batch.
    pub async fn db_delete_positions(&self, ids: &[String]) -> Result<u64, DatabaseError> {
        if ids.is_empty() {
            return Ok(0);
        }

        let conn = self.connect_with_timeout().await?;

        conn.execute("BEGIN IMMEDIATE", ()).await.map_err(|e| {
            DatabaseError::sql_execution(format!("Failed to begin transaction: {}", e))
        })?;

        let mut deleted = 0;
        for id in ids {
            match conn
                .execute("DELETE FROM positions WHERE id = ?", [id.as_str()])
                .await
            {
                Ok(rows) => deleted += rows,
                Err(e) => {
                    let _rollback = conn.execute("ROLLBACK", ()).await;
                    return Err(DatabaseError::transaction_failed(format!(
                        "Failed to delete position {}: {}",
                        id, e
                    )));
                }
            }
        }

        Self::commit(&conn).await?;

        Ok(deleted)
    }

    /// Re-parent the direct children of `id` to `new_parent_id`, then delete `id`
    ///
    /// Both statements run in one transaction.
    ///
    /// # Returns
    ///
    /// `(children_reassigned, rows_deleted)`
    pub async fn db_reassign_children_and_delete(
        &self,
        id: &str,
        new_parent_id: Option<&str>,
    ) -> Result<(u64, u64), DatabaseError> {
        let conn = self.connect_with_timeout().await?;

        conn.execute("BEGIN IMMEDIATE", ()).await.map_err(|e| {
            DatabaseError::sql_execution(format!("Failed to begin transaction: {}", e))
        })?;

        let reassigned = match conn
            .execute(
                "UPDATE positions SET parent_id = ?, modified_at = CURRENT_TIMESTAMP WHERE parent_id = ?",
                (new_parent_id, id),
            )
            .await
        {
            Ok(rows) => rows,
            Err(e) => {
                let _rollback = conn.execute("ROLLBACK", ()).await;
                return Err(DatabaseError::transaction_failed(format!(
                    "Failed to reassign children of {}: {}",
                    id, e
                )));
            }
        };

        let deleted = match conn
            .execute("DELETE FROM positions WHERE id = ?", [id])
            .await
        {
            Ok(rows) => rows,
            Err(e) => {
                let _rollback = conn.execute("ROLLBACK", ()).await;
                return Err(DatabaseError::transaction_failed(format!(
                    "Failed to delete position {}: {}",
                    id, e
                )));
            }
        };

        Self::commit(&conn).await?;

        Ok((reassigned, deleted))
    }

    async fn commit(conn: &libsql::Connection) -> Result<(), DatabaseError> {
        if let Err(e) = conn.execute("COMMIT", ()).await {
            let _rollback = conn.execute("ROLLBACK", ()).await;
            return Err(DatabaseError::transaction_failed(format!(
                "Failed to commit transaction: {}",
                e
            )));
        }
        Ok(())
    }
}
