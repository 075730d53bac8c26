//! CRUD form controller
//!
//! Turns form submissions into statements, runs them, and reports every
//! outcome as a [`Notice`]. Database errors stop here: they are logged and
//! become failed notices instead of propagating.

use std::sync::Arc;

use crate::database::traits::DatabaseProvider;
use crate::schema::{Notice, RecordForm, RowsResponse, TableSchema, TablesResponse};
use crate::statements::{self, Statement};
use crate::{DatabaseError, Error, Result};

/// Executes form actions against one shared database provider
pub struct FormController<DB: DatabaseProvider> {
    database: Arc<DB>,
}

impl<DB: DatabaseProvider> Clone for FormController<DB> {
    fn clone(&self) -> Self {
        Self {
            database: self.database.clone(),
        }
    }
}

impl<DB: DatabaseProvider> FormController<DB> {
    pub fn new(database: Arc<DB>) -> Self {
        Self { database }
    }

    /// Introspect every table for the form page.
    ///
    /// Failures leave the affected sequence empty and add a notice.
    pub async fn load_tables(&self) -> TablesResponse {
        let mut notices = Vec::new();

        let names = match self.database.list_tables().await {
            Ok(names) => names,
            Err(error) => {
                tracing::error!(%error, "failed to list tables");
                notices.push(database_error_notice(&error.into()));
                Vec::new()
            }
        };

        let mut tables = Vec::with_capacity(names.len());
        for name in names {
            match self.database.get_table_schema(&name).await {
                Ok(schema) => tables.push(schema),
                Err(error) => {
                    tracing::error!(table = %name, %error, "failed to read columns");
                    notices.push(database_error_notice(&error.into()));
                    tables.push(TableSchema {
                        name,
                        columns: Vec::new(),
                        primary_key: None,
                    });
                }
            }
        }

        TablesResponse { tables, notices }
    }

    /// Schema of a single table
    pub async fn table_schema(&self, table: &str) -> Result<TableSchema> {
        Ok(self.database.get_table_schema(table).await?)
    }

    /// Insert the entered values as a new row
    pub async fn insert(&self, table: &str, form: &RecordForm) -> Notice {
        match self.try_insert(table, form).await {
            Ok(_) => Notice::success(format!("Record inserted into {} table.", table)),
            Err(error) => {
                tracing::error!(table, %error, "insert failed");
                failure_notice(&error, format!("Failed to insert record into {} table.", table))
            }
        }
    }

    /// Every row of a table
    pub async fn view(&self, table: &str) -> RowsResponse {
        match self.try_view(table).await {
            Ok(response) => response,
            Err(error) => {
                tracing::error!(table, %error, "view failed");
                RowsResponse {
                    columns: Vec::new(),
                    rows: Vec::new(),
                    notice: Some(database_error_notice(&error)),
                }
            }
        }
    }

    /// Update the row whose first column matches the entered value
    pub async fn update(&self, table: &str, form: &RecordForm) -> Notice {
        match self.try_update(table, form).await {
            Ok((0, key_value)) => Notice::failure(
                "Failure",
                format!("No record found with ID: {}", key_value),
            ),
            Ok(_) => Notice::success(format!("Record updated in {} table.", table)),
            Err(error) => {
                tracing::error!(table, %error, "update failed");
                failure_notice(&error, format!("Failed to update record in {} table.", table))
            }
        }
    }

    /// Delete the row whose primary key equals `key_value`
    ///
    /// The key is bound exactly as entered. An empty key does nothing and
    /// yields no notice, like a cancelled prompt.
    pub async fn delete(&self, table: &str, key_value: &str) -> Option<Notice> {
        if key_value.is_empty() {
            return None;
        }

        let notice = match self.try_delete(table, key_value).await {
            Ok(0) => Notice::failure("Failure", format!("No record found with ID: {}", key_value)),
            Ok(_) => Notice::success("Record deleted successfully."),
            Err(error) => {
                tracing::error!(table, %error, "delete failed");
                failure_notice(&error, format!("Failed to delete record from {} table.", table))
            }
        };
        Some(notice)
    }

    async fn try_insert(&self, table: &str, form: &RecordForm) -> Result<u64> {
        let schema = self.form_schema(table, form).await?;
        let statement = statements::insert(self.database.dialect(), &schema, form)?;
        self.run(table, &statement).await
    }

    async fn try_view(&self, table: &str) -> Result<RowsResponse> {
        let schema = self.database.get_table_schema(table).await?;
        let statement = statements::select_all(self.database.dialect(), &schema);
        tracing::debug!(table, sql = %statement.sql, "fetching rows");

        let rows = self.database.fetch_rows(&statement).await?;
        Ok(RowsResponse {
            columns: schema.column_names(),
            rows,
            notice: None,
        })
    }

    async fn try_update(&self, table: &str, form: &RecordForm) -> Result<(u64, String)> {
        let schema = self.form_schema(table, form).await?;
        let statement = statements::update(self.database.dialect(), &schema, form)?;
        let key_value = statement.parameters.last().cloned().unwrap_or_default();
        Ok((self.run(table, &statement).await?, key_value))
    }

    async fn try_delete(&self, table: &str, key_value: &str) -> Result<u64> {
        let key = self
            .database
            .find_primary_key(table)
            .await?
            .ok_or_else(|| Error::NoPrimaryKey(table.to_string()))?;
        let statement = statements::delete(self.database.dialect(), table, &key, key_value);
        self.run(table, &statement).await
    }

    /// Schema of `table`, rejecting submitted columns the table does not have
    async fn form_schema(&self, table: &str, form: &RecordForm) -> Result<TableSchema> {
        let schema = self.database.get_table_schema(table).await?;
        if let Some(unknown) = form
            .values
            .keys()
            .find(|column| !schema.columns.iter().any(|known| &known.name == *column))
        {
            return Err(DatabaseError::InvalidColumn(unknown.clone()).into());
        }
        Ok(schema)
    }

    async fn run(&self, table: &str, statement: &Statement) -> Result<u64> {
        tracing::debug!(table, sql = %statement.sql, "executing statement");
        let affected = self.database.execute(statement).await?;
        tracing::info!(table, affected, "statement committed");
        Ok(affected)
    }
}

fn database_error_notice(error: &Error) -> Notice {
    Notice::failure("Database Error", format!("Error executing query: {}", error))
}

fn failure_notice(error: &Error, summary: String) -> Notice {
    match error {
        Error::Database(_) => Notice::failure("Database Error", format!("{}\n{}", summary, error)),
        _ => Notice::failure("Error", format!("{}\n{}", summary, error)),
    }
}
