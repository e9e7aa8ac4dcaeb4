//! Price export/import endpoints
//!
//! - `GET /api/v0/prices`: the whole table as `data.csv` inside `data.zip`
//! - `POST /api/v0/prices`: multipart upload (field `file`) of the same
//!   shape, inserted in one transaction, answered with table totals
//!
//! Other methods, HEAD included, get axum's 405.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Multipart, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};

use pricectl_core::{export_archive, import_archive, ImportSummary, EXPORT_ARCHIVE_NAME};

use crate::db::repos::PriceRepo;
use crate::http::error::ApiError;
use crate::http::server::AppState;

/// Route serving both directions.
pub const PRICES_PATH: &str = "/api/v0/prices";

/// Multipart field carrying the uploaded archive.
pub const UPLOAD_FIELD: &str = "file";

const ZIP_CONTENT_TYPE: &str = "application/zip";

fn export_disposition() -> String {
    format!("attachment; filename=\"{}\"", EXPORT_ARCHIVE_NAME)
}

/// GET /api/v0/prices - download every row as a zipped CSV
async fn export_prices(State(state): State<Arc<AppState>>) -> Result<Response, ApiError> {
    let rows = PriceRepo::new(&state.pool).fetch_all().await?;
    let archive = export_archive(&rows)?;

    tracing::info!(rows = rows.len(), bytes = archive.len(), "exported prices");

    Ok((
        [
            (header::CONTENT_TYPE, ZIP_CONTENT_TYPE.to_string()),
            (header::CONTENT_DISPOSITION, export_disposition()),
        ],
        archive,
    )
        .into_response())
}

/// POST /api/v0/prices - import a zipped CSV and report totals
///
/// The upload is unpacked and parsed before a transaction is opened. Any
/// failure after `begin` returns early, dropping the transaction, which
/// rolls it back; the commit is reached only when every step succeeded.
async fn import_prices(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Response, ApiError> {
    let upload = read_upload(&mut multipart).await?;
    let batch = import_archive(&upload)?;

    let repo = PriceRepo::new(&state.pool);
    let mut tx = repo.begin().await?;

    let inserted = repo.insert_batch(&mut tx, &batch).await?;
    let (total_categories, total_price) = repo.aggregate_summary(&mut tx).await?;

    let summary = ImportSummary {
        total_items: inserted,
        total_categories,
        total_price,
    };

    // Encoded before commit so a failure here still rolls back.
    let body = serde_json::to_vec(&summary)
        .map_err(|e| ApiError::internal(format!("failed to encode response: {}", e)))?;

    tx.commit().await?;

    tracing::info!(
        inserted,
        total_categories,
        total_price = %total_price,
        "imported prices"
    );

    Ok(([(header::CONTENT_TYPE, "application/json")], body).into_response())
}

/// Pull the bytes of the `file` field out of a multipart form.
async fn read_upload(multipart: &mut Multipart) -> Result<Bytes, ApiError> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() == Some(UPLOAD_FIELD) {
            return Ok(field.bytes().await?);
        }
    }

    Err(ApiError::bad_request(format!(
        "failed to read uploaded file: missing form field '{}'",
        UPLOAD_FIELD
    )))
}

/// HEAD /api/v0/prices - refused; axum would otherwise run the export for it
async fn reject_head() -> impl IntoResponse {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        [(header::ALLOW, "GET,POST")],
    )
}

/// Price routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new().route(
        PRICES_PATH,
        get(export_prices).head(reject_head).post(import_prices),
    )
}
