//! CSV exports.
//!
//! - `write_dataset_csv`: the ingest format, so generated data can be reloaded
//! - `write_analysis_csv`: one series with per-row anomaly flags, for spreadsheets

use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::domain::PriceObservation;
use crate::engine::PriceDataset;
use crate::error::AppError;

/// Write a dataset in the ingest CSV format.
pub fn write_dataset_csv(path: &Path, dataset: &PriceDataset) -> Result<(), AppError> {
    let file = create(path)?;
    write_dataset(file, dataset)
}

/// Write one series with anomaly flags.
///
/// `flags[i]` is the z-score of `records[i]` when that row is anomalous; rows
/// without an entry are written as not anomalous.
///
/// Columns: `Date,Region,Commodity,Price,Unit,Is Anomaly,Z-Score`.
pub fn write_analysis_csv(path: &Path, records: &[PriceObservation], flags: &[Option<f64>]) -> Result<(), AppError> {
    let file = create(path)?;
    write_analysis(file, records, flags)
}

fn create(path: &Path) -> Result<File, AppError> {
    File::create(path).map_err(|e| AppError::new(4, format!("Failed to create '{}': {e}", path.display())))
}

fn write_dataset<W: Write>(out: W, dataset: &PriceDataset) -> Result<(), AppError> {
    let mut writer = csv::Writer::from_writer(out);
    writer
        .write_record(["date", "region", "commodity", "price", "unit"])
        .map_err(write_err)?;
    for o in dataset {
        writer
            .write_record([
                o.date.format("%Y-%m-%d").to_string(),
                o.region.clone(),
                o.commodity.clone(),
                o.price.to_string(),
                o.unit.clone(),
            ])
            .map_err(write_err)?;
    }
    writer.flush().map_err(|e| AppError::new(4, format!("Failed to flush CSV: {e}")))
}

fn write_analysis<W: Write>(out: W, records: &[PriceObservation], flags: &[Option<f64>]) -> Result<(), AppError> {
    let mut writer = csv::Writer::from_writer(out);
    writer
        .write_record(["Date", "Region", "Commodity", "Price", "Unit", "Is Anomaly", "Z-Score"])
        .map_err(write_err)?;
    for (i, o) in records.iter().enumerate() {
        let z = flags.get(i).copied().flatten();
        writer
            .write_record([
                o.date.format("%Y-%m-%d").to_string(),
                o.region.clone(),
                o.commodity.clone(),
                o.price.to_string(),
                o.unit.clone(),
                if z.is_some() { "Yes" } else { "No" }.to_string(),
                z.map(|z| format!("{z:.2}")).unwrap_or_default(),
            ])
            .map_err(write_err)?;
    }
    writer.flush().map_err(|e| AppError::new(4, format!("Failed to flush CSV: {e}")))
}

fn write_err(e: csv::Error) -> AppError {
    AppError::new(4, format!("Failed to write CSV row: {e}"))
}
