//! REST API endpoints
//!
//! This module contains the endpoint handlers the form page script talks to.

use axum::{
    routing::{delete, get},
    Router,
};

use crate::controller::FormController;
use crate::database::traits::DatabaseProvider;

pub mod rows;
pub mod tables;

pub use rows::{delete_row_handler, insert_row_handler, update_row_handler, view_rows_handler};
pub use tables::{get_table_schema_handler, list_tables_handler};

/// Create the API router with all endpoints
///
/// # Arguments
///
/// * `controller` - Form controller wrapping the database provider
pub fn create_api_router<DB: DatabaseProvider>(controller: FormController<DB>) -> Router {
    // Note: Axum 0.8 uses {param} syntax instead of :param
    Router::new()
        .route("/tables", get(list_tables_handler::<DB>))
        .route("/tables/{name}", get(get_table_schema_handler::<DB>))
        .route(
            "/tables/{name}/rows",
            get(view_rows_handler::<DB>)
                .post(insert_row_handler::<DB>)
                .put(update_row_handler::<DB>),
        )
        .route("/tables/{name}/rows/{key}", delete(delete_row_handler::<DB>))
        .with_state(controller)
}
