//! SQLite database provider implementation

use crate::database::traits::{DatabaseError, DatabaseProvider};
use crate::schema::{ColumnInfo, TableSchema};
use crate::statements::{quote_identifier, Dialect, Statement};
use async_trait::async_trait;
use serde_json::Value;
use sqlx::sqlite::{SqliteArguments, SqliteRow};
use sqlx::{Column, Row, Sqlite, SqlitePool, TypeInfo, ValueRef};

/// SQLite database provider
pub struct SqliteProvider {
    pool: SqlitePool,
}

impl SqliteProvider {
    /// Create a new SQLite provider
    ///
    /// # Arguments
    ///
    /// * `pool` - SQLite connection pool
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Convert a SQLite row to a JSON array of its cells
    fn row_to_cells(row: &SqliteRow) -> Result<Value, DatabaseError> {
        let mut cells = Vec::with_capacity(row.len());

        for column in row.columns() {
            cells.push(Self::extract_column_value(row, column)?);
        }

        Ok(Value::Array(cells))
    }

    /// Extract a column value from a SQLite row and convert to JSON
    fn extract_column_value(
        row: &SqliteRow,
        column: &sqlx::sqlite::SqliteColumn,
    ) -> Result<Value, DatabaseError> {
        let index = column.ordinal();

        if row
            .try_get_raw(index)
            .map_err(|e| DatabaseError::Query(e.to_string()))?
            .is_null()
        {
            return Ok(Value::Null);
        }

        // SQLite reports storage classes per value: INTEGER, REAL, TEXT, BLOB
        match column.type_info().name() {
            "INTEGER" | "BIGINT" | "INT" => {
                if let Ok(value) = row.try_get::<i64, _>(index) {
                    return Ok(Value::Number(value.into()));
                }
            }
            "REAL" | "FLOAT" | "DOUBLE" => {
                if let Ok(value) = row.try_get::<f64, _>(index) {
                    if let Some(number) = serde_json::Number::from_f64(value) {
                        return Ok(Value::Number(number));
                    }
                }
            }
            "BLOB" => {
                if let Ok(value) = row.try_get::<Vec<u8>, _>(index) {
                    return Ok(Value::String(format!("[BLOB: {} bytes]", value.len())));
                }
            }
            "BOOLEAN" | "BOOL" => {
                if let Ok(value) = row.try_get::<bool, _>(index) {
                    return Ok(Value::Bool(value));
                }
            }
            _ => {}
        }

        if let Ok(value) = row.try_get::<String, _>(index) {
            return Ok(Value::String(value));
        }
        if let Ok(value) = row.try_get::<i64, _>(index) {
            return Ok(Value::Number(value.into()));
        }
        if let Ok(value) = row.try_get::<f64, _>(index) {
            if let Some(number) = serde_json::Number::from_f64(value) {
                return Ok(Value::Number(number));
            }
        }

        Ok(Value::Null)
    }

    fn bind_statement(statement: &Statement) -> sqlx::query::Query<'_, Sqlite, SqliteArguments<'_>> {
        let mut query = sqlx::query(&statement.sql);
        for value in &statement.parameters {
            query = query.bind(value.as_str());
        }
        query
    }
}

#[async_trait]
impl DatabaseProvider for SqliteProvider {
    fn dialect(&self) -> Dialect {
        Dialect::Sqlite
    }

    async fn list_tables(&self) -> Result<Vec<String>, DatabaseError> {
        let query = "SELECT name FROM sqlite_master WHERE type='table' AND name NOT LIKE 'sqlite_%' ORDER BY name";

        let tables: Vec<String> = sqlx::query_scalar(query).fetch_all(&self.pool).await?;
        Ok(tables)
    }

    async fn get_table_schema(&self, table: &str) -> Result<TableSchema, DatabaseError> {
        // PRAGMA table_info returns: cid, name, type, notnull, dflt_value, pk
        let table_info_query = format!("PRAGMA table_info({})", quote_identifier(table));
        let column_rows = sqlx::query(&table_info_query)
            .fetch_all(&self.pool)
            .await?;

        if column_rows.is_empty() {
            return Err(DatabaseError::TableNotFound(table.to_string()));
        }

        let mut columns = Vec::with_capacity(column_rows.len());
        let mut primary_key_columns = Vec::new();

        for row in column_rows {
            let name: String = row.try_get("name")?;
            let data_type: String = row.try_get("type")?;
            let not_null: i32 = row.try_get("notnull")?;
            let primary_key: i32 = row.try_get("pk")?;

            let is_primary_key = primary_key > 0;
            if is_primary_key {
                primary_key_columns.push((primary_key, name.clone()));
            }

            columns.push(ColumnInfo {
                name,
                data_type,
                cast_type: None,
                nullable: not_null == 0,
                is_primary_key,
            });
        }

        // Composite keys: the first column of the key wins
        primary_key_columns.sort_by_key(|(order, _)| *order);
        let primary_key = primary_key_columns.into_iter().next().map(|(_, name)| name);

        for column in &mut columns {
            column.is_primary_key = primary_key.as_deref() == Some(column.name.as_str());
        }

        Ok(TableSchema {
            name: table.to_string(),
            columns,
            primary_key,
        })
    }

    async fn find_primary_key(&self, table: &str) -> Result<Option<ColumnInfo>, DatabaseError> {
        let schema = self.get_table_schema(table).await?;
        Ok(schema.columns.into_iter().find(|column| column.is_primary_key))
    }

    async fn fetch_rows(&self, statement: &Statement) -> Result<Vec<Value>, DatabaseError> {
        let rows = Self::bind_statement(statement).fetch_all(&self.pool).await?;

        let mut cells = Vec::with_capacity(rows.len());
        for row in &rows {
            cells.push(Self::row_to_cells(row)?);
        }
        Ok(cells)
    }

    async fn execute(&self, statement: &Statement) -> Result<u64, DatabaseError> {
        let mut transaction = self.pool.begin().await?;

        match Self::bind_statement(statement).execute(&mut *transaction).await {
            Ok(result) => {
                transaction.commit().await?;
                Ok(result.rows_affected())
            }
            Err(error) => {
                if let Err(rollback_error) = transaction.rollback().await {
                    tracing::warn!(%rollback_error, "rollback failed");
                }
                Err(error.into())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::sqlite::SqlitePoolOptions;

    /// One connection, since every `sqlite::memory:` connection is its own database
    async fn provider() -> SqliteProvider {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();

        sqlx::query(
            "CREATE TABLE books (title TEXT NOT NULL, book_id INTEGER PRIMARY KEY, price REAL, cover BLOB)",
        )
        .execute(&pool)
        .await
        .unwrap();
        sqlx::query("CREATE TABLE authors (author_id INTEGER PRIMARY KEY, name TEXT)")
            .execute(&pool)
            .await
            .unwrap();

        SqliteProvider::new(pool)
    }

    #[tokio::test]
    async fn test_list_tables_sorted() {
        let provider = provider().await;
        assert_eq!(provider.list_tables().await.unwrap(), vec!["authors", "books"]);
    }

    #[tokio::test]
    async fn test_schema_keeps_column_order() {
        let provider = provider().await;
        let schema = provider.get_table_schema("books").await.unwrap();

        assert_eq!(schema.column_names(), vec!["title", "book_id", "price", "cover"]);
        assert_eq!(schema.primary_key.as_deref(), Some("book_id"));
        assert!(!schema.columns[0].nullable);
        assert!(schema.columns[1].is_primary_key);
    }

    #[tokio::test]
    async fn test_unknown_table() {
        let provider = provider().await;
        assert!(matches!(
            provider.get_table_schema("missing").await,
            Err(DatabaseError::TableNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_find_primary_key() {
        let provider = provider().await;
        let key = provider.find_primary_key("books").await.unwrap().unwrap();
        assert_eq!(key.name, "book_id");
    }

    #[tokio::test]
    async fn test_fetch_rows_as_cells() {
        let provider = provider().await;
        provider
            .execute(&Statement {
                sql: "INSERT INTO books (title, book_id, price, cover) VALUES (?, ?, ?, x'0102')".to_string(),
                parameters: vec!["Dune".to_string(), "1".to_string(), "9.5".to_string()],
            })
            .await
            .unwrap();

        let rows = provider
            .fetch_rows(&Statement {
                sql: "SELECT * FROM books".to_string(),
                parameters: Vec::new(),
            })
            .await
            .unwrap();

        assert_eq!(rows, vec![serde_json::json!(["Dune", 1, 9.5, "[BLOB: 2 bytes]"])]);
    }

    #[tokio::test]
    async fn test_failed_statement_rolls_back() {
        let provider = provider().await;
        let result = provider
            .execute(&Statement {
                sql: "INSERT INTO books (title, book_id) VALUES (NULL, 1)".to_string(),
                parameters: Vec::new(),
            })
            .await;
        assert!(matches!(result, Err(DatabaseError::Query(_))));

        let rows = provider
            .fetch_rows(&Statement {
                sql: "SELECT * FROM books".to_string(),
                parameters: Vec::new(),
            })
            .await
            .unwrap();
        assert!(rows.is_empty());
    }
}
