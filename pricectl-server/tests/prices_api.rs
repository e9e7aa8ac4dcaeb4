//! Router tests for /api/v0/prices
//!
//! Requests that fail before a transaction is opened run against a lazily
//! connected pool, so no database is needed. Tests marked `requires
//! database` use `DATABASE_URL`, truncate the `prices` table, and should be
//! run with `--ignored --test-threads=1` against a scratch database.

use std::io::{Cursor, Write};
use std::str::FromStr;
use std::time::Duration;

use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use pricectl_core::archive::{pack, unpack};
use pricectl_core::csv_codec::read_rows;
use pricectl_server::{build_router, AppState, ServerConfig};
use serde_json::Value;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::PgPool;
use tower::ServiceExt;

const BOUNDARY: &str = "pricectl-test-boundary";

fn lazy_pool() -> PgPool {
    let options = PgConnectOptions::from_str("postgres://pricectl@127.0.0.1:1/pricectl").unwrap();
    PgPoolOptions::new()
        .acquire_timeout(Duration::from_millis(200))
        .connect_lazy_with(options)
}

fn app(pool: PgPool) -> Router {
    build_router(AppState::new(pool), &ServerConfig::default())
}

fn multipart_request(field: &str, payload: &[u8]) -> Request<Body> {
    let mut body = Vec::new();
    write!(
        body,
        "--{BOUNDARY}\r\n\
         Content-Disposition: form-data; name=\"{field}\"; filename=\"upload.zip\"\r\n\
         Content-Type: application/zip\r\n\r\n"
    )
    .unwrap();
    body.extend_from_slice(payload);
    write!(body, "\r\n--{BOUNDARY}--\r\n").unwrap();

    Request::builder()
        .method(Method::POST)
        .uri("/api/v0/prices")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

fn zip_of(entries: &[(&str, &str)]) -> Vec<u8> {
    let mut zip = zip::ZipWriter::new(Cursor::new(Vec::new()));
    for (name, content) in entries {
        zip.start_file(*name, zip::write::FileOptions::default())
            .unwrap();
        zip.write_all(content.as_bytes()).unwrap();
    }
    zip.finish().unwrap().into_inner()
}

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

const WIDGET_CSV: &str = "id,name,category,price,create_date\n\
                          _,Widget,Tools,9.99,2024-01-15\n\
                          _,Gadget,Tools,19.5,2024-02-01\n";

#[tokio::test]
async fn other_methods_are_not_allowed() {
    for method in [Method::HEAD, Method::PUT, Method::DELETE, Method::PATCH] {
        let request = Request::builder()
            .method(method.clone())
            .uri("/api/v0/prices")
            .body(Body::empty())
            .unwrap();

        let response = app(lazy_pool()).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED, "{method}");
    }
}

#[tokio::test]
async fn upload_without_file_field_is_bad_request() {
    let archive = pack("data.csv", WIDGET_CSV.as_bytes()).unwrap();
    let response = app(lazy_pool())
        .oneshot(multipart_request("attachment", &archive))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert!(body["message"].as_str().unwrap().contains("'file'"));
}

#[tokio::test]
async fn non_multipart_body_is_rejected() {
    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/v0/prices")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{}"))
        .unwrap();

    let response = app(lazy_pool()).oneshot(request).await.unwrap();
    assert!(response.status().is_client_error());
}

#[tokio::test]
async fn archive_without_csv_is_server_error() {
    let cases = [
        zip_of(&[]),
        zip_of(&[("data.txt", "hello")]),
        zip_of(&[("a.csv", WIDGET_CSV), ("b.csv", WIDGET_CSV)]),
    ];

    for archive in cases {
        let response = app(lazy_pool())
            .oneshot(multipart_request("file", &archive))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = json_body(response).await;
        assert_eq!(body["message"], "csv file not found");
    }
}

#[tokio::test]
async fn malformed_date_is_rejected_before_storage() {
    let csv = "id,name,category,price,create_date\n\
               _,Widget,Tools,9.99,2024-01-15\n\
               _,Gadget,Tools,19.5,2024-13-40\n";
    let archive = pack("data.csv", csv.as_bytes()).unwrap();

    let response = app(lazy_pool())
        .oneshot(multipart_request("file", &archive))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = json_body(response).await;
    assert_eq!(body["error"], "parse_error");
}

#[tokio::test]
async fn unreachable_database_is_storage_error() {
    let request = Request::builder()
        .method(Method::GET)
        .uri("/api/v0/prices")
        .body(Body::empty())
        .unwrap();

    let response = app(lazy_pool()).oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = json_body(response).await;
    assert_eq!(body["error"], "storage_error");
}

#[tokio::test]
async fn head_does_not_run_the_export() {
    let request = Request::builder()
        .method(Method::HEAD)
        .uri("/api/v0/prices")
        .body(Body::empty())
        .unwrap();

    let response = app(lazy_pool()).oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(response.headers()[header::ALLOW], "GET,POST");
}

#[tokio::test]
async fn upload_over_body_limit_is_payload_too_large() {
    let config = ServerConfig {
        max_upload_bytes: 1024,
        ..ServerConfig::default()
    };
    let app = build_router(AppState::new(lazy_pool()), &config);

    let response = app
        .oneshot(multipart_request("file", &[0u8; 8 * 1024]))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    let body = json_body(response).await;
    assert_eq!(body["error"], "payload_too_large");
}

#[tokio::test]
async fn health_reports_ok() {
    let request = Request::builder()
        .uri("/health")
        .body(Body::empty())
        .unwrap();

    let response = app(lazy_pool()).oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["status"], "ok");
}

// === Database-backed scenarios ===

async fn scratch_pool() -> PgPool {
    let url = std::env::var("DATABASE_URL").expect("DATABASE_URL required");
    let pool = PgPool::connect(&url).await.expect("pool creation failed");

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS prices (
            id SERIAL PRIMARY KEY,
            name TEXT NOT NULL,
            category TEXT NOT NULL,
            price NUMERIC(12, 2) NOT NULL,
            create_date DATE NOT NULL
        )
        "#,
    )
    .execute(&pool)
    .await
    .expect("create table failed");

    sqlx::query("TRUNCATE prices RESTART IDENTITY")
        .execute(&pool)
        .await
        .expect("truncate failed");

    pool
}

async fn row_count(pool: &PgPool) -> i64 {
    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM prices")
        .fetch_one(pool)
        .await
        .unwrap();
    count
}

async fn export(pool: &PgPool) -> (axum::http::HeaderMap, Vec<u8>) {
    let request = Request::builder()
        .method(Method::GET)
        .uri("/api/v0/prices")
        .body(Body::empty())
        .unwrap();
    let response = app(pool.clone()).oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let headers = response.headers().clone();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (headers, bytes.to_vec())
}

#[tokio::test]
#[ignore = "requires database"]
async fn export_of_empty_table_is_header_only() {
    let pool = scratch_pool().await;
    let (headers, bytes) = export(&pool).await;

    assert_eq!(headers[header::CONTENT_TYPE], "application/zip");
    assert_eq!(
        headers[header::CONTENT_DISPOSITION],
        "attachment; filename=\"data.zip\""
    );

    let (name, content) = unpack(&bytes).unwrap();
    assert_eq!(name, "data.csv");
    assert_eq!(content, b"id,name,category,price,create_date\n");
}

#[tokio::test]
#[ignore = "requires database"]
async fn import_reports_totals() {
    let pool = scratch_pool().await;
    let archive = pack("data.csv", WIDGET_CSV.as_bytes()).unwrap();

    let response = app(pool.clone())
        .oneshot(multipart_request("file", &archive))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(
        body,
        serde_json::json!({"total_items": 2, "total_categories": 1, "total_price": 29.49})
    );
    assert_eq!(row_count(&pool).await, 2);
}

#[tokio::test]
#[ignore = "requires database"]
async fn failed_import_leaves_no_rows() {
    let pool = scratch_pool().await;
    let csv = "id,name,category,price,create_date\n\
               _,Widget,Tools,9.99,2024-01-15\n\
               _,Gadget,Tools,19.5,2024-13-40\n";
    let archive = pack("data.csv", csv.as_bytes()).unwrap();

    let response = app(pool.clone())
        .oneshot(multipart_request("file", &archive))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let (_, bytes) = export(&pool).await;
    let (_, content) = unpack(&bytes).unwrap();
    assert!(read_rows(&content).unwrap().is_empty());
}

#[tokio::test]
#[ignore = "requires database"]
async fn export_then_import_doubles_row_count() {
    let pool = scratch_pool().await;
    let archive = pack("data.csv", WIDGET_CSV.as_bytes()).unwrap();
    app(pool.clone())
        .oneshot(multipart_request("file", &archive))
        .await
        .unwrap();

    let before = row_count(&pool).await;
    let (_, exported) = export(&pool).await;

    let response = app(pool.clone())
        .oneshot(multipart_request("file", &exported))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    assert_eq!(body["total_items"], before);
    assert_eq!(row_count(&pool).await, before * 2);
}
