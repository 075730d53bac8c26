//! Table listing and schema endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};

use crate::controller::FormController;
use crate::database::traits::{DatabaseError, DatabaseProvider};
use crate::Error;

/// Handler for GET /api/tables
///
/// Returns every table with its ordered columns. Introspection failures do not
/// fail the request; they are listed in `notices`.
pub async fn list_tables_handler<DB: DatabaseProvider>(
    State(controller): State<FormController<DB>>,
) -> Response {
    (StatusCode::OK, Json(controller.load_tables().await)).into_response()
}

/// Handler for GET /api/tables/{name}
///
/// Returns the columns and primary key of one table.
pub async fn get_table_schema_handler<DB: DatabaseProvider>(
    State(controller): State<FormController<DB>>,
    Path(table_name): Path<String>,
) -> Response {
    match controller.table_schema(&table_name).await {
        Ok(schema) => (StatusCode::OK, Json(schema)).into_response(),
        Err(error) => {
            tracing::error!(table = %table_name, %error, "failed to get schema");

            let status = match error {
                Error::Database(DatabaseError::TableNotFound(_)) => StatusCode::NOT_FOUND,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            };

            (
                status,
                Json(serde_json::json!({
                    "error": error.to_string()
                })),
            )
                .into_response()
        }
    }
}
