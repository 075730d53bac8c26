use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use sql_forms::SqlFormsLayer;
use sqlx::sqlite::SqlitePoolOptions;
use tower::ServiceExt;

async fn app() -> Router {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .unwrap();

    sqlx::query("CREATE TABLE authors (author_id INTEGER PRIMARY KEY, name TEXT NOT NULL, country TEXT)")
        .execute(&pool)
        .await
        .unwrap();

    SqlFormsLayer::sqlite("/forms", pool)
        .with_title("Library")
        .into_router()
}

async fn call(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut request = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(body) => {
            request = request.header(header::CONTENT_TYPE, "application/json");
            Body::from(body.to_string())
        }
        None => Body::empty(),
    };

    let response = app.clone().oneshot(request.body(body).unwrap()).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn test_list_tables() {
    let app = app().await;
    let (status, body) = call(&app, Method::GET, "/forms/api/tables", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["tables"][0]["name"], "authors");
    assert_eq!(body["tables"][0]["primaryKey"], "author_id");
    assert_eq!(body["tables"][0]["columns"][2]["name"], "country");
    assert_eq!(body["notices"], json!([]));
}

#[tokio::test]
async fn test_schema_of_unknown_table() {
    let app = app().await;
    let (status, body) = call(&app, Method::GET, "/forms/api/tables/missing", None).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Table not found: missing");
}

#[tokio::test]
async fn test_crud_round_trip() {
    let app = app().await;
    let rows = "/forms/api/tables/authors/rows";

    let (status, notice) = call(
        &app,
        Method::POST,
        rows,
        Some(json!({ "values": { "author_id": "1", "name": "Ursula", "country": "US" } })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(notice["message"], "Record inserted into authors table.");

    let (status, notice) = call(
        &app,
        Method::PUT,
        rows,
        Some(json!({ "values": { "author_id": "1", "name": "Ursula K. Le Guin", "country": "US" } })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(notice["success"], true);

    let (status, view) = call(&app, Method::GET, rows, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(view["columns"], json!(["author_id", "name", "country"]));
    assert_eq!(view["rows"], json!([[1, "Ursula K. Le Guin", "US"]]));

    let (status, notice) = call(&app, Method::DELETE, "/forms/api/tables/authors/rows/1", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(notice["message"], "Record deleted successfully.");

    let (_, view) = call(&app, Method::GET, rows, None).await;
    assert_eq!(view["rows"], json!([]));
}

#[tokio::test]
async fn test_delete_missing_row() {
    let app = app().await;
    let (status, notice) = call(&app, Method::DELETE, "/forms/api/tables/authors/rows/7", None).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(notice["success"], false);
    assert_eq!(notice["message"], "No record found with ID: 7");
}

#[tokio::test]
async fn test_insert_blank_and_mismatched_values() {
    let app = app().await;
    let (status, notice) = call(
        &app,
        Method::POST,
        "/forms/api/tables/authors/rows",
        Some(json!({ "values": { "author_id": "1" } })),
    )
    .await;

    // Blank inputs bind as empty strings, which NOT NULL accepts
    assert_eq!(status, StatusCode::OK);
    assert_eq!(notice["success"], true);

    let (status, notice) = call(
        &app,
        Method::POST,
        "/forms/api/tables/authors/rows",
        Some(json!({ "values": { "author_id": "one", "name": "x" } })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(notice["title"], "Database Error");
}

#[tokio::test]
async fn test_form_page() {
    let app = app().await;
    let response = app
        .oneshot(Request::builder().uri("/forms").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let html = String::from_utf8(bytes.to_vec()).unwrap();

    assert!(html.contains("<base href=\"/forms/\">"));
    assert!(html.contains("<title>Library</title>"));
    assert!(html.contains(">authors</button>"));
    assert!(html.contains("name=\"country\""));
}
