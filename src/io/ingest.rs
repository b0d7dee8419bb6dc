//! CSV ingest into a typed `PriceDataset`.
//!
//! Design goals:
//! - **Strict schema** for required columns (clear errors + exit code 2)
//! - **Row-level validation** (skip bad rows, but report what happened)
//! - **Deterministic behavior** (accepted rows keep file order)
//! - **Separation of concerns**: no query logic here

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use chrono::NaiveDate;
use csv::StringRecord;
use tracing::{info, warn};

use crate::domain::PriceObservation;
use crate::engine::PriceDataset;
use crate::error::AppError;

const REQUIRED_COLUMNS: [&str; 5] = ["date", "region", "commodity", "price", "unit"];

/// A row-level error encountered during ingest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowError {
    pub line: usize,
    pub message: String,
}

/// Ingest output: the dataset plus what was skipped.
#[derive(Debug, Clone)]
pub struct IngestedPrices {
    pub dataset: PriceDataset,
    pub row_errors: Vec<RowError>,
    pub rows_read: usize,
    pub rows_used: usize,
}

/// Load a price CSV from disk.
pub fn load_prices(path: &Path) -> Result<IngestedPrices, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::new(2, format!("Failed to open CSV '{}': {e}", path.display())))?;
    let ingested = read_prices(file)?;

    info!(
        path = %path.display(),
        rows_read = ingested.rows_read,
        rows_used = ingested.rows_used,
        rejected = ingested.row_errors.len(),
        "loaded price data"
    );
    Ok(ingested)
}

/// Parse price CSV from any reader.
///
/// Missing required columns fail the whole read; bad rows are collected in
/// `row_errors` and skipped.
pub fn read_prices<R: Read>(reader: R) -> Result<IngestedPrices, AppError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = reader
        .headers()
        .map_err(|e| AppError::new(2, format!("Failed to read CSV headers: {e}")))?
        .clone();
    let header_map = build_header_map(&headers);
    ensure_required_columns_exist(&header_map)?;

    let mut rows = Vec::new();
    let mut row_errors = Vec::new();
    let mut rows_read = 0usize;

    for (idx, result) in reader.records().enumerate() {
        // Header is line 1.
        let line = idx + 2;
        rows_read += 1;

        let parsed = result
            .map_err(|e| format!("CSV parse error: {e}"))
            .and_then(|record| parse_row(&record, &header_map));
        match parsed {
            Ok(row) => rows.push(row),
            Err(message) => {
                warn!(line, %message, "skipping price row");
                row_errors.push(RowError { line, message });
            }
        }
    }

    let rows_used = rows.len();
    Ok(IngestedPrices {
        dataset: PriceDataset::new(rows),
        row_errors,
        rows_read,
        rows_used,
    })
}

fn build_header_map(headers: &StringRecord) -> HashMap<String, usize> {
    headers
        .iter()
        .enumerate()
        .map(|(idx, name)| (normalize_header_name(name), idx))
        .collect()
}

fn normalize_header_name(name: &str) -> String {
    // Spreadsheet exports often prefix the first header with a UTF-8 BOM.
    name.trim().trim_start_matches('\u{feff}').to_ascii_lowercase()
}

fn ensure_required_columns_exist(header_map: &HashMap<String, usize>) -> Result<(), AppError> {
    let missing: Vec<&str> = REQUIRED_COLUMNS
        .iter()
        .copied()
        .filter(|c| !header_map.contains_key(*c))
        .collect();
    if missing.is_empty() {
        return Ok(());
    }
    Err(AppError::new(
        2,
        format!("Missing required column(s): {}", missing.join(", ")),
    ))
}

fn parse_row(record: &StringRecord, header_map: &HashMap<String, usize>) -> Result<PriceObservation, String> {
    let date = parse_date(get_required(record, header_map, "date")?)?;
    let region = get_required(record, header_map, "region")?.to_string();
    let commodity = get_required(record, header_map, "commodity")?.to_string();
    let price = parse_price(get_required(record, header_map, "price")?)?;
    let unit = get_required(record, header_map, "unit")?.to_string();

    Ok(PriceObservation {
        date,
        region,
        commodity,
        price,
        unit,
    })
}

fn get_required<'a>(
    record: &'a StringRecord,
    header_map: &HashMap<String, usize>,
    name: &str,
) -> Result<&'a str, String> {
    let idx = header_map
        .get(name)
        .ok_or_else(|| format!("Missing required column: `{name}`"))?;
    record
        .get(*idx)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| format!("Missing required value: `{name}`"))
}

fn parse_price(s: &str) -> Result<f64, String> {
    let v = s
        .parse::<f64>()
        .map_err(|_| format!("Invalid price '{s}': not a number."))?;
    if !v.is_finite() {
        return Err(format!("Invalid price '{s}': must be finite."));
    }
    Ok(v)
}

fn parse_date(s: &str) -> Result<NaiveDate, String> {
    // ISO dates are the norm, but statistics-office exports also use day-first
    // formats and full timestamps.
    const FMTS: [&str; 4] = ["%Y-%m-%d", "%Y/%m/%d", "%d.%m.%Y", "%d/%m/%Y"];
    for fmt in FMTS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Ok(d);
        }
    }

    // `2023-01-31T00:00:00` / `2023-01-31 00:00:00`: keep the date part.
    if s.len() > 10 {
        if let Some(prefix) = s.get(..10) {
            if let Ok(d) = NaiveDate::parse_from_str(prefix, "%Y-%m-%d") {
                return Ok(d);
            }
        }
    }

    Err(format!(
        "Invalid date '{s}'. Expected one of: YYYY-MM-DD, YYYY/MM/DD, DD.MM.YYYY, DD/MM/YYYY."
    ))
}
