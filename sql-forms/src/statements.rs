//! Dynamic SQL construction
//!
//! Table and column names come from the schema and are interpolated as quoted
//! identifiers. Entered values are never interpolated; they travel as bound
//! text parameters.

use crate::schema::{ColumnInfo, RecordForm, TableSchema};
use crate::{Error, Result};

/// Placeholder syntax of the target database
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    /// `$1`, `$2`, ... with a cast to the column type
    Postgres,
    /// `?`
    Sqlite,
}

impl Dialect {
    /// Placeholder for the `index`-th (1-based) parameter bound to `column`.
    ///
    /// PostgreSQL receives every value as text, so the placeholder is cast to
    /// the column's type and the server does the conversion.
    fn placeholder(self, index: usize, column: &ColumnInfo) -> String {
        match self {
            Dialect::Postgres => match &column.cast_type {
                Some(cast_type) => format!("${}::{}", index, quote_identifier(cast_type)),
                None => format!("${}", index),
            },
            Dialect::Sqlite => "?".to_string(),
        }
    }
}

/// SQL text plus the values to bind, in placeholder order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Statement {
    pub sql: String,
    pub parameters: Vec<String>,
}

/// Quote an identifier (table or column name)
///
/// Embedded double quotes are escaped by doubling them.
pub fn quote_identifier(identifier: &str) -> String {
    format!("\"{}\"", identifier.replace('"', "\"\""))
}

/// `INSERT` of every column in discovery order
pub fn insert(dialect: Dialect, schema: &TableSchema, form: &RecordForm) -> Result<Statement> {
    if schema.columns.is_empty() {
        return Err(Error::InvalidRecord(format!(
            "table {} has no columns",
            schema.name
        )));
    }

    let column_list = schema
        .columns
        .iter()
        .map(|column| quote_identifier(&column.name))
        .collect::<Vec<_>>()
        .join(", ");
    let placeholders = schema
        .columns
        .iter()
        .enumerate()
        .map(|(index, column)| dialect.placeholder(index + 1, column))
        .collect::<Vec<_>>()
        .join(", ");

    Ok(Statement {
        sql: format!(
            "INSERT INTO {} ({}) VALUES ({})",
            quote_identifier(&schema.name),
            column_list,
            placeholders
        ),
        parameters: schema
            .columns
            .iter()
            .map(|column| form.value(&column.name).to_string())
            .collect(),
    })
}

/// `UPDATE` of every column but the first, keyed by the first column
pub fn update(dialect: Dialect, schema: &TableSchema, form: &RecordForm) -> Result<Statement> {
    let key = schema.update_key().ok_or_else(|| {
        Error::InvalidRecord(format!("table {} has no columns", schema.name))
    })?;
    let assigned = &schema.columns[1..];
    if assigned.is_empty() {
        return Err(Error::InvalidRecord(format!(
            "table {} has no columns besides {}",
            schema.name, key.name
        )));
    }

    let set_clause = assigned
        .iter()
        .enumerate()
        .map(|(index, column)| {
            format!(
                "{} = {}",
                quote_identifier(&column.name),
                dialect.placeholder(index + 1, column)
            )
        })
        .collect::<Vec<_>>()
        .join(", ");

    let mut parameters: Vec<String> = assigned
        .iter()
        .map(|column| form.value(&column.name).to_string())
        .collect();
    parameters.push(form.value(&key.name).to_string());

    Ok(Statement {
        sql: format!(
            "UPDATE {} SET {} WHERE {} = {}",
            quote_identifier(&schema.name),
            set_clause,
            quote_identifier(&key.name),
            dialect.placeholder(assigned.len() + 1, key)
        ),
        parameters,
    })
}

/// `DELETE` of the rows whose `key` column equals `key_value`
pub fn delete(dialect: Dialect, table: &str, key: &ColumnInfo, key_value: &str) -> Statement {
    Statement {
        sql: format!(
            "DELETE FROM {} WHERE {} = {}",
            quote_identifier(table),
            quote_identifier(&key.name),
            dialect.placeholder(1, key)
        ),
        parameters: vec![key_value.to_string()],
    }
}

/// `SELECT` of every row.
///
/// PostgreSQL casts each column to text so any column type can be displayed.
pub fn select_all(dialect: Dialect, schema: &TableSchema) -> Statement {
    let sql = match dialect {
        Dialect::Sqlite => format!("SELECT * FROM {}", quote_identifier(&schema.name)),
        Dialect::Postgres if schema.columns.is_empty() => {
            format!("SELECT * FROM {}", quote_identifier(&schema.name))
        }
        Dialect::Postgres => format!(
            "SELECT {} FROM {}",
            schema
                .columns
                .iter()
                .map(|column| {
                    let quoted = quote_identifier(&column.name);
                    format!("{}::text AS {}", quoted, quoted)
                })
                .collect::<Vec<_>>()
                .join(", "),
            quote_identifier(&schema.name)
        ),
    };

    Statement {
        sql,
        parameters: Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn books() -> TableSchema {
        TableSchema {
            name: "books".to_string(),
            columns: vec![
                ColumnInfo::plain("book_id", "INTEGER"),
                ColumnInfo::plain("title", "TEXT"),
                ColumnInfo::plain("author", "TEXT"),
            ],
            primary_key: Some("book_id".to_string()),
        }
    }

    fn typed_books() -> TableSchema {
        let mut schema = books();
        schema.columns[0].cast_type = Some("int4".to_string());
        schema.columns[1].cast_type = Some("varchar".to_string());
        schema.columns[2].cast_type = Some("text".to_string());
        schema
    }

    fn form() -> RecordForm {
        [("book_id", "7"), ("title", "Dune"), ("author", "Herbert")]
            .into_iter()
            .collect()
    }

    #[test]
    fn test_quote_identifier() {
        assert_eq!(quote_identifier("books"), "\"books\"");
        assert_eq!(quote_identifier("odd\"name"), "\"odd\"\"name\"");
    }

    #[test]
    fn test_insert_sqlite() {
        let statement = insert(Dialect::Sqlite, &books(), &form()).unwrap();
        assert_eq!(
            statement.sql,
            "INSERT INTO \"books\" (\"book_id\", \"title\", \"author\") VALUES (?, ?, ?)"
        );
        assert_eq!(statement.parameters, vec!["7", "Dune", "Herbert"]);
    }

    #[test]
    fn test_insert_postgres_casts_placeholders() {
        let statement = insert(Dialect::Postgres, &typed_books(), &form()).unwrap();
        assert_eq!(
            statement.sql,
            "INSERT INTO \"books\" (\"book_id\", \"title\", \"author\") \
             VALUES ($1::\"int4\", $2::\"varchar\", $3::\"text\")"
        );
    }

    #[test]
    fn test_insert_blank_inputs_bind_empty_strings() {
        let partial: RecordForm = [("title", "Dune")].into_iter().collect();
        let statement = insert(Dialect::Sqlite, &books(), &partial).unwrap();
        assert_eq!(statement.parameters, vec!["", "Dune", ""]);
    }

    #[test]
    fn test_insert_without_columns_fails() {
        let schema = TableSchema {
            name: "empty".to_string(),
            columns: Vec::new(),
            primary_key: None,
        };
        assert!(matches!(
            insert(Dialect::Sqlite, &schema, &form()),
            Err(Error::InvalidRecord(_))
        ));
    }

    #[test]
    fn test_update_keys_on_first_column() {
        let statement = update(Dialect::Postgres, &books(), &form()).unwrap();
        assert_eq!(
            statement.sql,
            "UPDATE \"books\" SET \"title\" = $1, \"author\" = $2 WHERE \"book_id\" = $3"
        );
        assert_eq!(statement.parameters, vec!["Dune", "Herbert", "7"]);
    }

    #[test]
    fn test_update_sqlite() {
        let statement = update(Dialect::Sqlite, &books(), &form()).unwrap();
        assert_eq!(
            statement.sql,
            "UPDATE \"books\" SET \"title\" = ?, \"author\" = ? WHERE \"book_id\" = ?"
        );
    }

    #[test]
    fn test_update_single_column_table_fails() {
        let schema = TableSchema {
            name: "tags".to_string(),
            columns: vec![ColumnInfo::plain("tag", "TEXT")],
            primary_key: None,
        };
        assert!(update(Dialect::Sqlite, &schema, &form()).is_err());
    }

    #[test]
    fn test_delete() {
        let key = ColumnInfo {
            cast_type: Some("int4".to_string()),
            ..ColumnInfo::plain("book_id", "integer")
        };
        let statement = delete(Dialect::Postgres, "books", &key, "7");
        assert_eq!(
            statement.sql,
            "DELETE FROM \"books\" WHERE \"book_id\" = $1::\"int4\""
        );
        assert_eq!(statement.parameters, vec!["7"]);
    }

    #[test]
    fn test_select_all() {
        assert_eq!(
            select_all(Dialect::Sqlite, &books()).sql,
            "SELECT * FROM \"books\""
        );
        assert_eq!(
            select_all(Dialect::Postgres, &books()).sql,
            "SELECT \"book_id\"::text AS \"book_id\", \"title\"::text AS \"title\", \
             \"author\"::text AS \"author\" FROM \"books\""
        );
    }
}
