//! Row endpoints backing the Insert/View/Update/Delete buttons
//!
//! Every mutation answers with a `Notice`; its `success` flag decides the
//! status code.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};

use crate::controller::FormController;
use crate::database::traits::DatabaseProvider;
use crate::schema::{Notice, RecordForm};

fn notice_response(notice: Notice) -> Response {
    let status = if notice.success {
        StatusCode::OK
    } else {
        StatusCode::BAD_REQUEST
    };
    (status, Json(notice)).into_response()
}

/// Handler for GET /api/tables/{name}/rows
///
/// Response:
/// ```json
/// {
///   "columns": ["book_id", "title"],
///   "rows": [[1, "Dune"]],
///   "notice": null
/// }
/// ```
pub async fn view_rows_handler<DB: DatabaseProvider>(
    State(controller): State<FormController<DB>>,
    Path(table_name): Path<String>,
) -> Response {
    let response = controller.view(&table_name).await;
    let status = if response.notice.is_some() {
        StatusCode::BAD_REQUEST
    } else {
        StatusCode::OK
    };
    (status, Json(response)).into_response()
}

/// Handler for POST /api/tables/{name}/rows
///
/// Request body:
/// ```json
/// { "values": { "book_id": "1", "title": "Dune" } }
/// ```
pub async fn insert_row_handler<DB: DatabaseProvider>(
    State(controller): State<FormController<DB>>,
    Path(table_name): Path<String>,
    Json(form): Json<RecordForm>,
) -> Response {
    notice_response(controller.insert(&table_name, &form).await)
}

/// Handler for PUT /api/tables/{name}/rows
///
/// Same body as insert; the first column's value selects the row.
pub async fn update_row_handler<DB: DatabaseProvider>(
    State(controller): State<FormController<DB>>,
    Path(table_name): Path<String>,
    Json(form): Json<RecordForm>,
) -> Response {
    notice_response(controller.update(&table_name, &form).await)
}

/// Handler for DELETE /api/tables/{name}/rows/{key}
///
/// The key is used exactly as sent. An empty key deletes nothing and answers
/// `204 No Content` without a notice.
pub async fn delete_row_handler<DB: DatabaseProvider>(
    State(controller): State<FormController<DB>>,
    Path((table_name, key)): Path<(String, String)>,
) -> Response {
    match controller.delete(&table_name, &key).await {
        Some(notice) => notice_response(notice),
        None => StatusCode::NO_CONTENT.into_response(),
    }
}
