/// Structured error types for pricectl-core.
///
/// Uses `thiserror` so the server crate can map each kind onto an HTTP
/// status, while the CLI binary still wraps everything in `anyhow`.
use thiserror::Error;

/// Message returned whenever an upload does not hold exactly one `.csv` entry.
pub const CSV_NOT_FOUND: &str = "csv file not found";

/// Main error type for pricectl-core operations
#[derive(Error, Debug)]
pub enum PriceError {
    /// A CSV record could not be turned into a price row
    #[error("failed to parse csv at line {line}: {reason}")]
    Parse { line: u64, reason: String },

    /// A price row could not be written as CSV
    #[error("failed to encode csv: {reason}")]
    Encoding { reason: String },

    /// The archive is unreadable or does not have the expected shape
    #[error("{reason}")]
    Format { reason: String },
}

/// Result type alias for pricectl-core operations
pub type Result<T> = std::result::Result<T, PriceError>;

impl PriceError {
    /// Create a parse error for a 1-based CSV line
    pub fn parse(line: u64, reason: impl Into<String>) -> Self {
        Self::Parse {
            line,
            reason: reason.into(),
        }
    }

    /// Create an encoding error
    pub fn encoding(reason: impl Into<String>) -> Self {
        Self::Encoding {
            reason: reason.into(),
        }
    }

    /// Create an archive format error
    pub fn format(reason: impl Into<String>) -> Self {
        Self::Format {
            reason: reason.into(),
        }
    }

    /// The archive did not contain exactly one `.csv` entry
    pub fn csv_not_found() -> Self {
        Self::format(CSV_NOT_FOUND)
    }
}

impl From<zip::result::ZipError> for PriceError {
    fn from(err: zip::result::ZipError) -> Self {
        Self::format(format!("failed to read zip archive: {}", err))
    }
}
