//! pricectl-core: price rows and the formats they travel in
//!
//! - [`model`]: `PriceRecord` and the import summary
//! - [`csv_codec`]: rows ↔ CSV text
//! - [`archive`]: CSV ↔ single-entry zip

pub mod archive;
pub mod csv_codec;
pub mod error;
pub mod model;

pub use error::{PriceError, Result, CSV_NOT_FOUND};
pub use model::{ImportSummary, PriceRecord};

/// Name of the CSV entry inside exported archives.
pub const EXPORT_CSV_NAME: &str = "data.csv";

/// Filename offered to clients downloading an export.
pub const EXPORT_ARCHIVE_NAME: &str = "data.zip";

/// Encode rows as CSV and wrap them in a zip archive, ready for download.
pub fn export_archive(rows: &[PriceRecord]) -> Result<Vec<u8>> {
    let csv = csv_codec::write_rows(rows)?;
    archive::pack(EXPORT_CSV_NAME, csv.as_bytes())
}

/// Unpack an uploaded archive and parse its CSV into a batch of rows.
pub fn import_archive(bytes: &[u8]) -> Result<Vec<PriceRecord>> {
    let (name, content) = archive::unpack(bytes)?;
    tracing::debug!(entry = %name, bytes = content.len(), "unpacked upload");
    csv_codec::read_rows(&content)
}
