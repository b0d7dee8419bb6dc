//! Shared dataset loading and per-series analysis used by both CLI and TUI.
//!
//! Keeping this in one place avoids duplicating the workflow:
//! CSV load -> series selection -> time window -> rolling scores -> anomalies
//!
//! The CLI and the TUI can then focus on presentation (printing vs widgets).

use std::path::Path;

use tracing::warn;

use crate::domain::{AnomalyReport, DetectorParams, PriceSeries, RollingStat};
use crate::engine::{PriceDataset, RollingAnomalyDetector, price_series};
use crate::error::AppError;

/// Everything needed to show one commodity/region pair.
#[derive(Debug, Clone)]
pub struct SeriesAnalysis {
    pub series: PriceSeries,
    pub rolling: Vec<RollingStat>,
    /// Per-record z-score when anomalous, aligned with `series.records`.
    pub flags: Vec<Option<f64>>,
    pub report: AnomalyReport,
}

/// Load the dataset, falling back to an empty one.
///
/// A missing or unreadable file is not fatal: every query simply returns an
/// empty result.
pub fn load_dataset(path: &Path) -> PriceDataset {
    match crate::io::load_prices(path) {
        Ok(ingested) => {
            if ingested.dataset.is_empty() {
                warn!(path = %path.display(), "no usable rows; continuing with an empty dataset");
            }
            ingested.dataset
        }
        Err(err) => {
            warn!(path = %path.display(), error = %err, "failed to load dataset; continuing with an empty dataset");
            PriceDataset::empty()
        }
    }
}

/// Select, window, and score one pair.
pub fn analyze(
    dataset: &PriceDataset,
    commodity: &str,
    region: &str,
    params: &DetectorParams,
) -> Result<SeriesAnalysis, AppError> {
    let detector = RollingAnomalyDetector::new(params.window, params.z_threshold)?;
    let series = price_series(dataset, commodity, region, params.time_window_months);
    // `price_series` returns date-sorted records, so positions line up.
    let positions = detector.score_positions(&series.records);
    let flags: Vec<Option<f64>> = positions
        .iter()
        .map(|p| p.as_ref().and_then(|stat| detector.anomaly_of(stat)).map(|a| a.z_score))
        .collect();
    let rolling: Vec<RollingStat> = positions.into_iter().flatten().collect();
    let points = rolling.iter().filter_map(|stat| detector.anomaly_of(stat)).collect();

    let report = AnomalyReport {
        region: region.to_string(),
        commodity: commodity.to_string(),
        window: detector.window(),
        threshold: detector.z_threshold(),
        points,
    };

    Ok(SeriesAnalysis {
        series,
        rolling,
        flags,
        report,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::PriceObservation;
    use crate::engine::anomaly_report;
    use chrono::NaiveDate;

    fn dataset() -> PriceDataset {
        let prices = [100.0, 100.0, 100.0, 100.0, 100.0, 200.0, 101.0];
        prices
            .iter()
            .enumerate()
            .map(|(i, &price)| PriceObservation {
                date: NaiveDate::from_ymd_opt(2023, i as u32 + 1, 1).unwrap(),
                region: "Moscow".to_string(),
                commodity: "Bread".to_string(),
                price,
                unit: "RUB/kg".to_string(),
            })
            .collect()
    }

    #[test]
    fn analysis_matches_anomaly_query() {
        let ds = dataset();
        let params = DetectorParams { window: 6, ..DetectorParams::default() };
        let analysis = analyze(&ds, "Bread", "Moscow", &params).unwrap();
        let report = anomaly_report(&ds, "Bread", "Moscow", &params).unwrap();

        assert_eq!(analysis.report, report);
        assert_eq!(analysis.series.records.len(), 7);
        assert_eq!(analysis.flags.len(), 7);
        assert_eq!(analysis.flags.iter().flatten().count(), report.points.len());
        assert_eq!(analysis.series.unit, "RUB/kg");
        assert!(!analysis.rolling.is_empty());
    }

    #[test]
    fn flags_mark_only_the_scored_duplicate() {
        let mut ds: Vec<PriceObservation> = dataset().rows()[..6].to_vec();
        ds.push(ds[5].clone());
        let ds = PriceDataset::new(ds);
        let params = DetectorParams { window: 6, ..DetectorParams::default() };

        let analysis = analyze(&ds, "Bread", "Moscow", &params).unwrap();
        let flagged: Vec<usize> = analysis
            .flags
            .iter()
            .enumerate()
            .filter_map(|(i, f)| f.map(|_| i))
            .collect();
        assert_eq!(flagged, vec![5]);
        assert_eq!(analysis.report.points.len(), 1);
    }

    #[test]
    fn missing_file_yields_empty_dataset() {
        let ds = load_dataset(Path::new("definitely/not/here.csv"));
        assert!(ds.is_empty());
    }

    #[test]
    fn invalid_params_are_rejected() {
        let params = DetectorParams { window: 2, ..DetectorParams::default() };
        let err = analyze(&dataset(), "Bread", "Moscow", &params).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }
}
