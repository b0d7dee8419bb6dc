//! Composite queries: price lookup, anomaly lookup, and the all-series scan.
//!
//! These are what a front-end (CLI, TUI, or a service layer) calls. Each query
//! reads one dataset snapshot and returns plain values; "no data" is an empty
//! result.

use std::collections::BTreeSet;

use rayon::prelude::*;
use tracing::debug;

use crate::domain::{AnomalyReport, DetectorParams, PriceSeries};
use crate::engine::{PriceDataset, RollingAnomalyDetector, apply_time_window, select};
use crate::error::AppError;

/// Price history for one pair, optionally limited to the most recent months.
pub fn price_series(
    dataset: &PriceDataset,
    commodity: &str,
    region: &str,
    time_window_months: Option<i64>,
) -> PriceSeries {
    let records = apply_time_window(select(dataset, commodity, region), time_window_months);
    let unit = records.first().map(|o| o.unit.clone()).unwrap_or_default();
    debug!(commodity, region, rows = records.len(), "price series query");

    PriceSeries {
        region: region.to_string(),
        commodity: commodity.to_string(),
        unit,
        records,
    }
}

/// Anomalies for one pair.
///
/// Fails only on invalid detector parameters.
pub fn anomaly_report(
    dataset: &PriceDataset,
    commodity: &str,
    region: &str,
    params: &DetectorParams,
) -> Result<AnomalyReport, AppError> {
    let detector = RollingAnomalyDetector::new(params.window, params.z_threshold)?;
    Ok(report_with(&detector, dataset, commodity, region, params.time_window_months))
}

/// Run the detector over every `(commodity, region)` pair in the dataset.
///
/// Pairs are scored independently and in parallel. Only reports with at least
/// one anomaly are returned, ordered by commodity then region.
pub fn scan_anomalies(dataset: &PriceDataset, params: &DetectorParams) -> Result<Vec<AnomalyReport>, AppError> {
    let detector = RollingAnomalyDetector::new(params.window, params.z_threshold)?;

    let pairs: Vec<(&str, &str)> = dataset
        .iter()
        .map(|o| (o.commodity.as_str(), o.region.as_str()))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    // Collecting into a `Vec` keeps the input order.
    let reports: Vec<AnomalyReport> = pairs
        .par_iter()
        .map(|&(commodity, region)| report_with(&detector, dataset, commodity, region, params.time_window_months))
        .filter(|report| !report.points.is_empty())
        .collect();

    debug!(pairs = pairs.len(), flagged = reports.len(), "anomaly scan");
    Ok(reports)
}

fn report_with(
    detector: &RollingAnomalyDetector,
    dataset: &PriceDataset,
    commodity: &str,
    region: &str,
    time_window_months: Option<i64>,
) -> AnomalyReport {
    let series = apply_time_window(select(dataset, commodity, region), time_window_months);
    let points = detector.detect(&series);

    AnomalyReport {
        region: region.to_string(),
        commodity: commodity.to_string(),
        window: detector.window(),
        threshold: detector.z_threshold(),
        points,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::PriceObservation;
    use chrono::NaiveDate;

    fn monthly(commodity: &str, region: &str, unit: &str, prices: &[f64]) -> Vec<PriceObservation> {
        prices
            .iter()
            .enumerate()
            .map(|(i, &price)| PriceObservation {
                date: NaiveDate::from_ymd_opt(2023, 1 + i as u32, 1).unwrap(),
                region: region.to_string(),
                commodity: commodity.to_string(),
                price,
                unit: unit.to_string(),
            })
            .collect()
    }

    fn dataset() -> PriceDataset {
        let mut rows = monthly("Bread", "Moscow", "RUB/kg", &[100.0, 100.0, 100.0, 100.0, 100.0, 200.0]);
        rows.extend(monthly("Milk", "Kazan", "RUB/l", &[80.0, 81.0, 80.0, 81.0, 80.0, 81.0]));
        rows.extend(monthly("Bread", "Kazan", "RUB/kg", &[50.0, 50.0, 50.0, 50.0, 50.0, 10.0]));
        PriceDataset::new(rows)
    }

    fn params(window: usize, z_threshold: f64) -> DetectorParams {
        DetectorParams {
            window,
            z_threshold,
            time_window_months: None,
        }
    }

    #[test]
    fn price_series_reports_first_unit() {
        let series = price_series(&dataset(), "Milk", "Kazan", None);
        assert_eq!(series.unit, "RUB/l");
        assert_eq!(series.records.len(), 6);
    }

    #[test]
    fn price_series_for_unknown_pair_is_empty() {
        let series = price_series(&dataset(), "Eggs", "Kazan", Some(3));
        assert!(series.records.is_empty());
        assert_eq!(series.unit, "");
        assert_eq!(series.commodity, "Eggs");
    }

    #[test]
    fn price_series_applies_time_window() {
        // Max date 2023-06-01; two 30-day months back is 2023-04-02.
        let series = price_series(&dataset(), "Bread", "Moscow", Some(2));
        assert_eq!(series.records.len(), 2);
    }

    #[test]
    fn anomaly_report_echoes_parameters() {
        let report = anomaly_report(&dataset(), "Bread", "Moscow", &params(6, 2.0)).unwrap();
        assert_eq!(report.window, 6);
        assert_eq!(report.threshold, 2.0);
        assert_eq!(report.points.len(), 1);
        assert_eq!(report.points[0].price, 200.0);
    }

    #[test]
    fn anomaly_report_rejects_bad_parameters() {
        assert!(anomaly_report(&dataset(), "Bread", "Moscow", &params(2, 2.0)).is_err());
        assert!(anomaly_report(&PriceDataset::empty(), "Bread", "Moscow", &params(6, 0.1)).is_err());
    }

    #[test]
    fn anomaly_report_on_empty_dataset_is_empty() {
        let report = anomaly_report(&PriceDataset::empty(), "Bread", "Moscow", &params(12, 2.0)).unwrap();
        assert!(report.points.is_empty());
    }

    #[test]
    fn time_window_can_starve_the_detector() {
        let mut p = params(6, 2.0);
        p.time_window_months = Some(1);
        let report = anomaly_report(&dataset(), "Bread", "Moscow", &p).unwrap();
        assert!(report.points.is_empty());
    }

    #[test]
    fn scan_returns_flagged_pairs_in_key_order() {
        let reports = scan_anomalies(&dataset(), &params(6, 2.0)).unwrap();
        let keys: Vec<(&str, &str)> = reports
            .iter()
            .map(|r| (r.commodity.as_str(), r.region.as_str()))
            .collect();
        assert_eq!(keys, vec![("Bread", "Kazan"), ("Bread", "Moscow")]);
        assert!(reports[0].points[0].z_score < 0.0);
    }

    #[test]
    fn scan_of_empty_dataset_is_empty() {
        assert!(scan_anomalies(&PriceDataset::empty(), &params(12, 2.0)).unwrap().is_empty());
    }
}
