//! Frontend serving
//!
//! This module serves the generated form page and the embedded static assets
//! (stylesheet and script) with proper caching, MIME types, and base path
//! injection.

use axum::{
    body::Body,
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use include_dir::{include_dir, Dir};
use std::sync::Arc;

use crate::controller::FormController;
use crate::database::traits::DatabaseProvider;
use crate::forms::{escape_html, render_page};

// Embed the static assets at compile time
static ASSETS: Dir = include_dir!("$CARGO_MANIFEST_DIR/assets");

/// State for frontend serving
pub struct FrontendState<DB: DatabaseProvider> {
    pub base_path: Arc<String>,
    pub title: Arc<String>,
    pub controller: FormController<DB>,
}

impl<DB: DatabaseProvider> Clone for FrontendState<DB> {
    fn clone(&self) -> Self {
        Self {
            base_path: self.base_path.clone(),
            title: self.title.clone(),
            controller: self.controller.clone(),
        }
    }
}

impl<DB: DatabaseProvider> FrontendState<DB> {
    pub fn new(base_path: String, title: String, controller: FormController<DB>) -> Self {
        Self {
            base_path: Arc::new(base_path),
            title: Arc::new(title),
            controller,
        }
    }
}

/// Create a router for the form page and its assets
///
/// This returns a Router that serves:
/// - GET / -> generated form page with injected <base href> tag
/// - GET /assets/* -> embedded static assets
pub fn create_frontend_router<DB: DatabaseProvider>(state: FrontendState<DB>) -> Router {
    // Note: Axum 0.8 uses {*wildcard} syntax for wildcard captures
    Router::new()
        .route("/", get(serve_form_page::<DB>))
        .route("/assets/{*path}", get(serve_static_asset))
        .with_state(state)
}

/// Serve the generated form page
///
/// The schema is introspected on every request, so tables created while the
/// server runs show up on reload. A `<base href>` tag is injected so relative
/// asset and API paths resolve under the mount point.
async fn serve_form_page<DB: DatabaseProvider>(State(state): State<FrontendState<DB>>) -> Response {
    let tables = state.controller.load_tables().await;
    let mut contents = render_page(&state.title, &tables);

    if let Some(head_position) = contents.find("<head>") {
        let insert_position = head_position + "<head>".len();
        let base_tag = format!("\n    <base href=\"{}/\">", escape_html(&state.base_path));
        contents.insert_str(insert_position, &base_tag);
    }

    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "text/html; charset=utf-8"),
            (header::CACHE_CONTROL, "no-cache"),
        ],
        contents,
    )
        .into_response()
}

/// Serve static assets with proper MIME types
///
/// Caching: max-age=3600 (1 hour), the asset names are not content-hashed
async fn serve_static_asset(Path(path): Path<String>) -> Response {
    match ASSETS.get_file(&path) {
        Some(file) => {
            let mime_type = mime_guess::from_path(&path)
                .first_or_octet_stream()
                .to_string();

            (
                StatusCode::OK,
                [
                    (header::CONTENT_TYPE, mime_type),
                    (header::CACHE_CONTROL, "public, max-age=3600".to_string()),
                ],
                Body::from(file.contents()),
            )
                .into_response()
        }
        None => (
            StatusCode::NOT_FOUND,
            [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
            format!("Asset not found: {}", path),
        )
            .into_response(),
    }
}
