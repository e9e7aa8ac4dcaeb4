//! CSV encoding of price rows
//!
//! The layout is fixed: a header line followed by one record per row,
//! `id,name,category,price,create_date`. Prices are written with two
//! decimal digits and dates as `YYYY-MM-DD`.

use std::str::FromStr;

use chrono::NaiveDate;
use csv::{ReaderBuilder, StringRecord, Writer};
use rust_decimal::Decimal;

use crate::error::{PriceError, Result};
use crate::model::PriceRecord;

/// Column names, in record order.
pub const HEADER: [&str; 5] = ["id", "name", "category", "price", "create_date"];

/// `create_date` format on both read and write.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

const FIELD_COUNT: usize = HEADER.len();

/// Serialize rows to CSV text, header first.
pub fn write_rows(rows: &[PriceRecord]) -> Result<String> {
    let mut writer = Writer::from_writer(Vec::new());
    writer
        .write_record(HEADER)
        .map_err(|e| PriceError::encoding(format!("failed to add csv header: {}", e)))?;

    for row in rows {
        let id = row.id.map(|id| id.to_string()).unwrap_or_default();
        let price = format_price(row.price);
        let date = row.created_at.format(DATE_FORMAT).to_string();

        writer
            .write_record([
                id.as_str(),
                row.name.as_str(),
                row.category.as_str(),
                price.as_str(),
                date.as_str(),
            ])
            .map_err(|e| PriceError::encoding(format!("failed to write row {}: {}", id, e)))?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| PriceError::encoding(format!("failed to flush csv writer: {}", e)))?;
    String::from_utf8(bytes).map_err(|e| PriceError::encoding(e.to_string()))
}

/// Parse CSV text into rows, discarding the header line.
///
/// Stops at the first malformed record; nothing is returned for a partially
/// valid file. The `id` column is ignored since storage assigns ids.
pub fn read_rows(data: &[u8]) -> Result<Vec<PriceRecord>> {
    // Field counts are checked per record so the error names the line.
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(data);
    let mut records = reader.records();

    match records.next() {
        Some(Ok(_header)) => {}
        Some(Err(err)) => return Err(csv_error(err)),
        None => return Err(PriceError::parse(1, "failed to read first line: empty file")),
    }

    let mut rows = Vec::new();
    for result in records {
        let record = result.map_err(csv_error)?;
        rows.push(parse_record(&record)?);
    }

    tracing::debug!(rows = rows.len(), "parsed csv rows");
    Ok(rows)
}

fn parse_record(record: &StringRecord) -> Result<PriceRecord> {
    let line = record.position().map(|p| p.line()).unwrap_or_default();

    if record.len() != FIELD_COUNT {
        return Err(PriceError::parse(
            line,
            format!("expected {} fields, found {}", FIELD_COUNT, record.len()),
        ));
    }

    let price = parse_price(&record[3])
        .ok_or_else(|| PriceError::parse(line, format!("invalid price '{}'", &record[3])))?;
    let created_at = NaiveDate::parse_from_str(&record[4], DATE_FORMAT)
        .map_err(|e| PriceError::parse(line, format!("invalid date '{}': {}", &record[4], e)))?;

    Ok(PriceRecord::new(&record[1], &record[2], price, created_at))
}

fn parse_price(field: &str) -> Option<Decimal> {
    Decimal::from_str(field)
        .or_else(|_| Decimal::from_scientific(field))
        .ok()
}

fn format_price(price: Decimal) -> String {
    format!("{:.2}", price.round_dp(2))
}

fn csv_error(err: csv::Error) -> PriceError {
    let line = err.position().map(|p| p.line()).unwrap_or_default();
    PriceError::parse(line, err.to_string())
}
