//! API error types with IntoResponse
//!
//! Errors are converted to JSON responses with appropriate status codes.
//! Codec failures are the client's data, so their message is returned as is;
//! storage and internal failures are logged and answered generically.

use axum::extract::multipart::MultipartError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use pricectl_core::PriceError;

use crate::db::repos::DbError;

/// API error type with automatic HTTP status mapping
#[derive(Debug)]
pub enum ApiError {
    /// Upload missing or unreadable (400)
    BadRequest { message: String },

    /// Multipart stream failed; status comes from the multipart layer
    /// (413 when the body limit was hit, 400 otherwise)
    Upload { status: StatusCode, message: String },

    /// Archive shape, CSV parse or CSV encode failure (500)
    Codec(PriceError),

    /// Database error (500, logged)
    Database(DbError),

    /// Internal error (500, logged)
    Internal { message: String },
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest {
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            Self::BadRequest { message } => (
                StatusCode::BAD_REQUEST,
                json!({
                    "error": "bad_request",
                    "message": message
                }),
            ),
            Self::Upload { status, message } => {
                let kind = if *status == StatusCode::PAYLOAD_TOO_LARGE {
                    "payload_too_large"
                } else {
                    "bad_request"
                };
                (
                    *status,
                    json!({
                        "error": kind,
                        "message": message
                    }),
                )
            }
            Self::Codec(e) => {
                let kind = match e {
                    PriceError::Parse { .. } => "parse_error",
                    PriceError::Encoding { .. } => "encoding_error",
                    PriceError::Format { .. } => "format_error",
                };
                tracing::warn!(kind, "codec error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({
                        "error": kind,
                        "message": e.to_string()
                    }),
                )
            }
            Self::Database(e) => {
                // Log the actual error, return generic message
                tracing::error!("Database error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({
                        "error": "storage_error",
                        "message": "failed to access price storage"
                    }),
                )
            }
            Self::Internal { message } => {
                tracing::error!("Internal error: {}", message);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({
                        "error": "internal_error",
                        "message": "an internal error occurred"
                    }),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}

impl From<PriceError> for ApiError {
    fn from(e: PriceError) -> Self {
        Self::Codec(e)
    }
}

impl From<DbError> for ApiError {
    fn from(e: DbError) -> Self {
        Self::Database(e)
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(e: sqlx::Error) -> Self {
        Self::Database(DbError::from(e))
    }
}

impl From<MultipartError> for ApiError {
    fn from(e: MultipartError) -> Self {
        Self::Upload {
            status: e.status(),
            message: format!("failed to read uploaded file: {}", e.body_text()),
        }
    }
}
