//! Single-file zip archives
//!
//! Exports are shipped as a zip holding one CSV; uploads must have the same
//! shape. Everything happens in memory.

use std::io::{Cursor, Read, Write};

use zip::write::FileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use crate::error::{PriceError, Result};

/// Largest decompressed CSV accepted from an upload.
pub const MAX_CSV_BYTES: u64 = 256 * 1024 * 1024;

/// Wrap `content` in a zip archive as a single entry called `name`.
pub fn pack(name: &str, content: &[u8]) -> Result<Vec<u8>> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = FileOptions::default().compression_method(CompressionMethod::Deflated);

    zip.start_file(name, options)
        .map_err(|e| PriceError::encoding(format!("failed to archive {}: {}", name, e)))?;
    zip.write_all(content)
        .map_err(|e| PriceError::encoding(format!("failed to copy data: {}", e)))?;

    let cursor = zip
        .finish()
        .map_err(|e| PriceError::encoding(format!("failed to finish zip archive: {}", e)))?;
    Ok(cursor.into_inner())
}

/// Extract the only entry of an archive, which must be a `.csv` file.
///
/// Returns the entry name and its decompressed bytes. Empty archives,
/// archives with several entries, and a non-csv entry are all rejected
/// with [`PriceError::csv_not_found`]. Entries larger than
/// [`MAX_CSV_BYTES`] once decompressed are a format error.
pub fn unpack(bytes: &[u8]) -> Result<(String, Vec<u8>)> {
    unpack_with_limit(bytes, MAX_CSV_BYTES)
}

fn unpack_with_limit(bytes: &[u8], limit: u64) -> Result<(String, Vec<u8>)> {
    let mut archive = ZipArchive::new(Cursor::new(bytes))?;
    if archive.len() != 1 {
        tracing::debug!(entries = archive.len(), "archive entry count mismatch");
        return Err(PriceError::csv_not_found());
    }

    let mut file = archive.by_index(0)?;
    let name = file.name().to_string();
    if !file.is_file() || !name.ends_with(".csv") {
        tracing::debug!(entry = %name, "archive entry is not a csv file");
        return Err(PriceError::csv_not_found());
    }

    // The declared size comes from the upload, so it only gates the read.
    if file.size() > limit {
        return Err(too_large(limit));
    }

    let mut content = Vec::new();
    file.by_ref()
        .take(limit + 1)
        .read_to_end(&mut content)
        .map_err(|e| PriceError::format(format!("failed to unzip archive: {}", e)))?;
    if content.len() as u64 > limit {
        return Err(too_large(limit));
    }

    Ok((name, content))
}

fn too_large(limit: u64) -> PriceError {
    PriceError::format(format!("csv file exceeds {} bytes", limit))
}
