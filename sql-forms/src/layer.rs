//! SqlFormsLayer - Main Axum integration layer
//!
//! This module provides the main entry point for mounting the generated forms
//! into an Axum application.

use crate::database::traits::DatabaseProvider;
use axum::Router;
use std::sync::Arc;
use tower_http::cors::CorsLayer;

#[cfg(feature = "sqlite")]
use crate::database::sqlite::SqliteProvider;

#[cfg(feature = "postgres")]
use crate::database::postgres::PostgresProvider;

use crate::api::create_api_router;
use crate::controller::FormController;
use crate::frontend::{create_frontend_router, FrontendState};

/// Default page title
pub const DEFAULT_TITLE: &str = "BookSphere App";

/// Main layer for mounting the form UI into an Axum application
///
/// # Example
///
/// ```rust,no_run
/// use axum::Router;
/// use sql_forms::SqlFormsLayer;
/// use sqlx::SqlitePool;
///
/// # async fn example() {
/// let pool = SqlitePool::connect("sqlite::memory:").await.unwrap();
/// let forms = SqlFormsLayer::sqlite("/forms", pool).with_title("Library");
/// let app = Router::new().merge(forms.into_router());
/// # }
/// ```
pub struct SqlFormsLayer<DB: DatabaseProvider> {
    base_path: String,
    title: String,
    database: Arc<DB>,
}

impl<DB: DatabaseProvider> SqlFormsLayer<DB> {
    /// Create a new form UI at the given base path
    ///
    /// # Arguments
    ///
    /// * `base_path` - The URL path where the forms will be mounted (e.g., "/forms")
    /// * `database` - The database provider implementation
    pub fn new(base_path: impl Into<String>, database: DB) -> Self {
        Self {
            base_path: base_path.into(),
            title: DEFAULT_TITLE.to_string(),
            database: Arc::new(database),
        }
    }

    /// Set the page title
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Convert into an Axum Router that can be merged
    ///
    /// The returned router includes:
    /// - The form page at `{base_path}` and its assets at `{base_path}/assets/*`
    /// - API endpoints at `{base_path}/api/*`
    /// - Permissive CORS middleware for development
    pub fn into_router(self) -> Router {
        let controller = FormController::new(self.database);
        let api_router = create_api_router(controller.clone());
        let frontend_router =
            create_frontend_router(FrontendState::new(self.base_path.clone(), self.title, controller));

        Router::new()
            .nest(&format!("{}/api", self.base_path), api_router)
            .nest(&self.base_path, frontend_router)
            .layer(CorsLayer::permissive())
    }
}

#[cfg(feature = "sqlite")]
impl SqlFormsLayer<SqliteProvider> {
    /// Create a new form UI for SQLite
    ///
    /// # Arguments
    ///
    /// * `base_path` - The URL path where the forms will be mounted
    /// * `pool` - The SQLite connection pool
    pub fn sqlite(base_path: impl Into<String>, pool: sqlx::SqlitePool) -> Self {
        Self::new(base_path, SqliteProvider::new(pool))
    }
}

#[cfg(feature = "postgres")]
impl SqlFormsLayer<PostgresProvider> {
    /// Create a new form UI for PostgreSQL
    ///
    /// # Arguments
    ///
    /// * `base_path` - The URL path where the forms will be mounted
    /// * `pool` - The PostgreSQL connection pool
    pub fn postgres(base_path: impl Into<String>, pool: sqlx::PgPool) -> Self {
        Self::new(base_path, PostgresProvider::new(pool))
    }
}
