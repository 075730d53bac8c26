//! Database provider trait
//!
//! This trait defines the interface that all database implementations must provide.

use crate::schema::{ColumnInfo, TableSchema};
use crate::statements::{Dialect, Statement};
use async_trait::async_trait;
use thiserror::Error;

/// Database provider trait for schema discovery and statement execution
///
/// Implementations know how to read their database's catalog and how to run
/// statements produced by [`crate::statements`] for their [`Dialect`].
#[async_trait]
pub trait DatabaseProvider: Send + Sync + 'static {
    /// Placeholder dialect statements for this database must use
    fn dialect(&self) -> Dialect;

    /// List base table names, sorted by name
    async fn list_tables(&self) -> Result<Vec<String>, DatabaseError>;

    /// Get the ordered columns and primary key of a table
    ///
    /// # Errors
    ///
    /// [`DatabaseError::TableNotFound`] when the catalog reports no columns.
    async fn get_table_schema(&self, table: &str) -> Result<TableSchema, DatabaseError>;

    /// Look up the column deletes are keyed on
    ///
    /// Returns `None` when the table has no primary key.
    async fn find_primary_key(&self, table: &str) -> Result<Option<ColumnInfo>, DatabaseError>;

    /// Run a query and return each row as a JSON array of its cells
    async fn fetch_rows(&self, statement: &Statement) -> Result<Vec<serde_json::Value>, DatabaseError>;

    /// Run a statement in its own transaction and return the affected row count
    ///
    /// The transaction is committed on success and rolled back on error.
    async fn execute(&self, statement: &Statement) -> Result<u64, DatabaseError>;
}

/// Database error type
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// Generic database error
    #[error("Database error: {0}")]
    Query(String),

    /// Table not found
    #[error("Table not found: {0}")]
    TableNotFound(String),

    /// Invalid column name
    #[error("Invalid column: {0}")]
    InvalidColumn(String),
}

impl From<sqlx::Error> for DatabaseError {
    fn from(error: sqlx::Error) -> Self {
        DatabaseError::Query(error.to_string())
    }
}
