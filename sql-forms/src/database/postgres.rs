//! PostgreSQL database provider implementation

use crate::database::traits::{DatabaseError, DatabaseProvider};
use crate::schema::{ColumnInfo, TableSchema};
use crate::statements::{Dialect, Statement};
use async_trait::async_trait;
use serde_json::Value;
use sqlx::{postgres::PgRow, PgPool, Row};

/// PostgreSQL database provider
pub struct PostgresProvider {
    pool: PgPool,
}

impl PostgresProvider {
    /// Create a new PostgreSQL provider
    ///
    /// # Arguments
    ///
    /// * `pool` - PostgreSQL connection pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Name of the primary key constraint PostgreSQL generates by default
    fn conventional_constraint_name(table: &str) -> String {
        format!("{}_pkey", table)
    }

    /// Convert a row into a JSON array of its cells
    ///
    /// Views cast every column to text, so cells are normally strings. Other
    /// common types are tried for statements that were not cast.
    fn row_to_cells(row: &PgRow) -> Value {
        let cells = (0..row.len())
            .map(|index| {
                if let Ok(value) = row.try_get::<Option<String>, _>(index) {
                    return value.map(Value::String).unwrap_or(Value::Null);
                }
                if let Ok(value) = row.try_get::<Option<i64>, _>(index) {
                    return value.map(|v| Value::Number(v.into())).unwrap_or(Value::Null);
                }
                if let Ok(value) = row.try_get::<Option<i32>, _>(index) {
                    return value.map(|v| Value::Number(v.into())).unwrap_or(Value::Null);
                }
                if let Ok(value) = row.try_get::<Option<bool>, _>(index) {
                    return value.map(Value::Bool).unwrap_or(Value::Null);
                }
                if let Ok(Some(value)) = row.try_get::<Option<f64>, _>(index) {
                    if let Some(number) = serde_json::Number::from_f64(value) {
                        return Value::Number(number);
                    }
                }
                Value::Null
            })
            .collect();

        Value::Array(cells)
    }

    /// Primary key column name through the `{table}_pkey` naming convention
    async fn primary_key_by_convention(&self, table: &str) -> Result<Option<String>, DatabaseError> {
        let query = r#"
            SELECT column_name::text AS column_name
            FROM information_schema.key_column_usage
            WHERE table_schema = 'public'
              AND table_name = $1
              AND constraint_name = $2
            ORDER BY ordinal_position
            LIMIT 1
        "#;

        let name: Option<String> = sqlx::query_scalar(query)
            .bind(table)
            .bind(Self::conventional_constraint_name(table))
            .fetch_optional(&self.pool)
            .await?;

        Ok(name)
    }

    /// Primary key column name through the constraint type
    async fn primary_key_by_constraint(&self, table: &str) -> Result<Option<String>, DatabaseError> {
        let query = r#"
            SELECT kcu.column_name::text AS column_name
            FROM information_schema.table_constraints tc
            JOIN information_schema.key_column_usage kcu
              ON tc.constraint_name = kcu.constraint_name
              AND tc.table_schema = kcu.table_schema
            WHERE tc.table_schema = 'public'
              AND tc.table_name = $1
              AND tc.constraint_type = 'PRIMARY KEY'
            ORDER BY kcu.ordinal_position
            LIMIT 1
        "#;

        let name: Option<String> = sqlx::query_scalar(query)
            .bind(table)
            .fetch_optional(&self.pool)
            .await?;

        Ok(name)
    }

    fn bind_statement(statement: &Statement) -> sqlx::query::Query<'_, sqlx::Postgres, sqlx::postgres::PgArguments> {
        let mut query = sqlx::query(&statement.sql);
        for value in &statement.parameters {
            query = query.bind(value.as_str());
        }
        query
    }
}

#[async_trait]
impl DatabaseProvider for PostgresProvider {
    fn dialect(&self) -> Dialect {
        Dialect::Postgres
    }

    async fn list_tables(&self) -> Result<Vec<String>, DatabaseError> {
        let query = r#"
            SELECT table_name::text AS table_name
            FROM information_schema.tables
            WHERE table_schema = 'public'
              AND table_type = 'BASE TABLE'
            ORDER BY table_name
        "#;

        let tables: Vec<String> = sqlx::query_scalar(query).fetch_all(&self.pool).await?;
        Ok(tables)
    }

    async fn get_table_schema(&self, table: &str) -> Result<TableSchema, DatabaseError> {
        let column_query = r#"
            SELECT
                column_name::text AS column_name,
                data_type::text AS data_type,
                udt_name::text AS udt_name,
                is_nullable::text AS is_nullable
            FROM information_schema.columns
            WHERE table_schema = 'public'
              AND table_name = $1
            ORDER BY ordinal_position
        "#;

        let column_rows = sqlx::query(column_query)
            .bind(table)
            .fetch_all(&self.pool)
            .await?;

        if column_rows.is_empty() {
            return Err(DatabaseError::TableNotFound(table.to_string()));
        }

        let primary_key = self.primary_key_by_constraint(table).await?;

        let columns = column_rows
            .iter()
            .map(|row| {
                let name: String = row.try_get("column_name")?;
                let is_nullable: String = row.try_get("is_nullable")?;

                Ok(ColumnInfo {
                    is_primary_key: primary_key.as_deref() == Some(name.as_str()),
                    name,
                    data_type: row.try_get("data_type")?,
                    cast_type: Some(row.try_get("udt_name")?),
                    nullable: is_nullable == "YES",
                })
            })
            .collect::<Result<Vec<_>, sqlx::Error>>()?;

        Ok(TableSchema {
            name: table.to_string(),
            columns,
            primary_key,
        })
    }

    async fn find_primary_key(&self, table: &str) -> Result<Option<ColumnInfo>, DatabaseError> {
        let name = match self.primary_key_by_convention(table).await? {
            Some(name) => Some(name),
            None => {
                tracing::debug!(
                    table,
                    "no {} constraint, falling back to constraint type",
                    Self::conventional_constraint_name(table)
                );
                self.primary_key_by_constraint(table).await?
            }
        };

        let Some(name) = name else {
            return Ok(None);
        };

        let schema = self.get_table_schema(table).await?;
        schema
            .columns
            .into_iter()
            .find(|column| column.name == name)
            .map(Some)
            .ok_or(DatabaseError::InvalidColumn(name))
    }

    async fn fetch_rows(&self, statement: &Statement) -> Result<Vec<Value>, DatabaseError> {
        let rows = Self::bind_statement(statement).fetch_all(&self.pool).await?;
        Ok(rows.iter().map(Self::row_to_cells).collect())
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
