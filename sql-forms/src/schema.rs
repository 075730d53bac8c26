//! Schema and form types
//!
//! These types describe tables discovered at runtime and the transient values a
//! user enters into a generated form.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Schema information for a database table, as needed to build its form
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TableSchema {
    /// Name of the table
    pub name: String,

    /// Columns in discovery (ordinal) order
    pub columns: Vec<ColumnInfo>,

    /// Primary key column reported by the catalog (if any)
    pub primary_key: Option<String>,
}

impl TableSchema {
    /// Column names in discovery order
    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|column| column.name.clone()).collect()
    }

    /// The column used as the key for updates.
    ///
    /// Updates treat the first discovered column as the key, whatever the
    /// catalog says about primary keys.
    pub fn update_key(&self) -> Option<&ColumnInfo> {
        self.columns.first()
    }
}

/// Information about a single column
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ColumnInfo {
    /// Column name
    pub name: String,

    /// SQL data type as reported by the catalog (e.g., "integer", "TEXT")
    pub data_type: String,

    /// Type name bound text parameters are cast to (PostgreSQL `udt_name`)
    pub cast_type: Option<String>,

    /// Whether the column allows NULL values
    pub nullable: bool,

    /// Whether this column is the primary key
    pub is_primary_key: bool,
}

impl ColumnInfo {
    /// Create a column with no cast and no key flag, mostly useful in tests
    pub fn plain(name: impl Into<String>, data_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data_type: data_type.into(),
            cast_type: None,
            nullable: true,
            is_primary_key: false,
        }
    }
}

/// Values entered into one table's form (column name -> text)
///
/// Columns missing from the map are treated as blank inputs.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordForm {
    #[serde(default)]
    pub values: HashMap<String, String>,
}

impl RecordForm {
    /// Entered text for a column, blank when the column was not submitted
    pub fn value(&self, column: &str) -> &str {
        self.values.get(column).map(String::as_str).unwrap_or("")
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for RecordForm {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(column, value)| (column.into(), value.into()))
                .collect(),
        }
    }
}

/// Outcome of a user action, shown to the user as a modal dialog
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Notice {
    /// Whether the action succeeded
    pub success: bool,

    /// Dialog title ("Success", "Error", "Database Error", ...)
    pub title: String,

    /// Dialog body
    pub message: String,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            success: true,
            title: "Success".to_string(),
            message: message.into(),
        }
    }

    pub fn failure(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            success: false,
            title: title.into(),
            message: message.into(),
        }
    }
}

/// Response from introspecting every table
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TablesResponse {
    /// Tables with their columns; a table whose columns could not be read has none
    pub tables: Vec<TableSchema>,

    /// Introspection failures to show the user
    pub notices: Vec<Notice>,
}

/// Response containing all rows of a table
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RowsResponse {
    /// Column names, in the order of each row's cells
    pub columns: Vec<String>,

    /// One JSON array per row
    pub rows: Vec<serde_json::Value>,

    /// Set when the rows could not be read
    pub notice: Option<Notice>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_key_is_first_column() {
        let schema = TableSchema {
            name: "books".to_string(),
            columns: vec![ColumnInfo::plain("isbn", "text"), ColumnInfo::plain("book_id", "integer")],
            primary_key: Some("book_id".to_string()),
        };

        assert_eq!(schema.update_key().map(|column| column.name.as_str()), Some("isbn"));
        assert_eq!(schema.column_names(), vec!["isbn", "book_id"]);
    }

    #[test]
    fn test_record_form_blank_for_missing_column() {
        let form: RecordForm = [("title", "Dune")].into_iter().collect();
        assert_eq!(form.value("title"), "Dune");
        assert_eq!(form.value("author"), "");
    }

    #[test]
    fn test_record_form_deserializes_without_values() {
        let form: RecordForm = serde_json::from_str("{}").unwrap();
        assert!(form.values.is_empty());
    }

    #[test]
    fn test_notice_serializes_camel_case() {
        let json = serde_json::to_value(Notice::success("done")).unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(json["title"], "Success");
        assert_eq!(json["message"], "done");
    }
}
