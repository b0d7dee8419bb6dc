//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - used in-memory by the query engine
//! - printed as JSON by the CLI
//! - exported to CSV

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Default rolling window length (observations).
pub const DEFAULT_WINDOW: usize = 12;

/// Default anomaly threshold (absolute z-score).
pub const DEFAULT_Z_THRESHOLD: f64 = 2.0;

/// Smallest window the detector accepts.
pub const MIN_WINDOW: usize = 3;

/// Largest window the CLI/TUI offer (weekly data, one year).
pub const MAX_WINDOW: usize = 52;

/// Smallest z-threshold the detector accepts.
pub const MIN_Z_THRESHOLD: f64 = 1.0;

/// Largest z-threshold the CLI/TUI offer.
pub const MAX_Z_THRESHOLD: f64 = 5.0;

/// A single price point for one commodity in one region.
///
/// `unit` is a free-form label (e.g. `RUB/kg`). No unit conversion happens
/// anywhere in the crate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceObservation {
    pub date: NaiveDate,
    pub region: String,
    pub commodity: String,
    pub price: f64,
    pub unit: String,
}

/// A flagged price point.
///
/// `z_score` is signed: negative values are unusually low prices.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnomalyPoint {
    pub date: NaiveDate,
    pub price: f64,
    pub z_score: f64,
}

impl AnomalyPoint {
    pub fn severity(&self) -> Severity {
        Severity::from_z(self.z_score)
    }
}

/// Display grade for a flagged point, by `|z|`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum Severity {
    Medium,
    High,
    Critical,
}

impl Severity {
    /// `|z| > 3` is critical, `|z| > 2` high, anything else medium.
    pub fn from_z(z_score: f64) -> Self {
        let z = z_score.abs();
        if z > 3.0 {
            Severity::Critical
        } else if z > 2.0 {
            Severity::High
        } else {
            Severity::Medium
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Severity::Medium => "Medium",
            Severity::High => "High",
            Severity::Critical => "Critical",
        }
    }
}

/// Rolling statistics at one eligible position of a series.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RollingStat {
    pub date: NaiveDate,
    pub price: f64,
    pub mean: f64,
    pub std: f64,
    /// `None` when the trailing window has zero variance.
    pub z_score: Option<f64>,
}

/// A rendered dashboard metric.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryFact {
    pub label: String,
    pub value: String,
}

impl SummaryFact {
    pub fn new(label: impl Into<String>, value: impl ToString) -> Self {
        Self {
            label: label.into(),
            value: value.to_string(),
        }
    }
}

/// Result of a price lookup.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceSeries {
    pub region: String,
    pub commodity: String,
    /// Unit of the first record, or empty when there are no records.
    pub unit: String,
    pub records: Vec<PriceObservation>,
}

/// Result of an anomaly lookup.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnomalyReport {
    pub region: String,
    pub commodity: String,
    pub window: usize,
    pub threshold: f64,
    pub points: Vec<AnomalyPoint>,
}

/// Where a value sits between the lowest and highest latest regional price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum PriceLevel {
    Normal,
    Medium,
    High,
    Critical,
}

impl PriceLevel {
    /// Quartile bands of a `[0, 1]` ratio; each cut-off is exclusive.
    pub fn from_ratio(ratio: f64) -> Self {
        if ratio > 0.75 {
            PriceLevel::Critical
        } else if ratio > 0.5 {
            PriceLevel::High
        } else if ratio > 0.25 {
            PriceLevel::Medium
        } else {
            PriceLevel::Normal
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            PriceLevel::Normal => "Normal",
            PriceLevel::Medium => "Medium",
            PriceLevel::High => "High",
            PriceLevel::Critical => "Critical",
        }
    }
}

/// Most recent price of one commodity in one region.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegionPrice {
    pub region: String,
    pub date: NaiveDate,
    pub price: f64,
    pub unit: String,
    /// `(price - min) / (max - min)` across all regions; `0.0` when they agree.
    pub relative: f64,
    pub level: PriceLevel,
}

/// A price threshold watched for one commodity/region pair.
///
/// Alerts live for one dashboard session and are never written to disk.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceAlert {
    pub commodity: String,
    pub region: String,
    pub threshold: f64,
    pub created: NaiveDate,
}

/// An alert checked against the current dataset.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlertStatus {
    pub alert: PriceAlert,
    /// Price of the newest observation, `None` when the pair has no rows.
    pub latest: Option<f64>,
    /// `latest >= threshold`.
    pub triggered: bool,
}

/// Detector settings plus the optional pre-detection time window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DetectorParams {
    pub window: usize,
    pub z_threshold: f64,
    /// Most recent N months (30-day months) to analyze; `None` means everything.
    pub time_window_months: Option<i64>,
}

impl Default for DetectorParams {
    fn default() -> Self {
        Self {
            window: DEFAULT_WINDOW,
            z_threshold: DEFAULT_Z_THRESHOLD,
            time_window_months: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severity_grades_by_absolute_z() {
        assert_eq!(Severity::from_z(2.0), Severity::Medium);
        assert_eq!(Severity::from_z(-2.04), Severity::High);
        assert_eq!(Severity::from_z(3.0), Severity::High);
        assert_eq!(Severity::from_z(-3.5), Severity::Critical);
    }

    #[test]
    fn price_level_cutoffs_are_exclusive() {
        assert_eq!(PriceLevel::from_ratio(0.0), PriceLevel::Normal);
        assert_eq!(PriceLevel::from_ratio(0.25), PriceLevel::Normal);
        assert_eq!(PriceLevel::from_ratio(0.26), PriceLevel::Medium);
        assert_eq!(PriceLevel::from_ratio(0.5), PriceLevel::Medium);
        assert_eq!(PriceLevel::from_ratio(0.75), PriceLevel::High);
        assert_eq!(PriceLevel::from_ratio(1.0), PriceLevel::Critical);
    }
}
