//! Repository implementations for database access
//!
//! Repositories borrow the shared pool; multi-step writes run inside a
//! transaction owned by the caller.

pub mod prices;

pub use prices::PriceRepo;

/// Database error type
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    #[error("failed to write data to database after {inserted} row(s): {source}")]
    Insert {
        inserted: u64,
        #[source]
        source: sqlx::Error,
    },
}
