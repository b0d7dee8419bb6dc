//! Rolling z-score anomaly detection.
//!
//! For each position `i` of a date-sorted series the trailing window holds the
//! last `window` observations up to and including `i`. A position is scored once
//! that window holds at least `max(3, window / 2)` observations:
//!
//! ```text
//! z(i) = (price(i) - mean(window)) / std(window)      (std uses n - 1)
//! ```
//!
//! Windows with zero variance have no z-score and are never flagged.

use crate::domain::{AnomalyPoint, MIN_WINDOW, MIN_Z_THRESHOLD, PriceObservation, RollingStat};
use crate::error::AppError;

/// Validated detector settings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RollingAnomalyDetector {
    window: usize,
    z_threshold: f64,
}

impl RollingAnomalyDetector {
    /// Rejects `window < 3` and `z_threshold < 1.0` (or non-finite).
    pub fn new(window: usize, z_threshold: f64) -> Result<Self, AppError> {
        if window < MIN_WINDOW {
            return Err(AppError::invalid(format!(
                "Invalid window {window}: must be at least {MIN_WINDOW} observations."
            )));
        }
        if !z_threshold.is_finite() || z_threshold < MIN_Z_THRESHOLD {
            return Err(AppError::invalid(format!(
                "Invalid z-threshold {z_threshold}: must be a finite value >= {MIN_Z_THRESHOLD}."
            )));
        }
        Ok(Self { window, z_threshold })
    }

    pub fn window(&self) -> usize {
        self.window
    }

    pub fn z_threshold(&self) -> f64 {
        self.z_threshold
    }

    /// Minimum trailing observations before a position is scored.
    pub fn min_periods(&self) -> usize {
        MIN_WINDOW.max(self.window / 2)
    }

    /// Rolling mean/std/z for every eligible position, ascending by date.
    pub fn score(&self, series: &[PriceObservation]) -> Vec<RollingStat> {
        self.score_positions(series).into_iter().flatten().collect()
    }

    /// One entry per observation in date order; `None` until the trailing
    /// window reaches `min_periods`.
    ///
    /// The sort is stable, so for a series already in `select` order entry `i`
    /// belongs to `series[i]`, duplicates included.
    pub fn score_positions(&self, series: &[PriceObservation]) -> Vec<Option<RollingStat>> {
        let sorted = sorted_by_date(series);
        let min_periods = self.min_periods();

        let mut out = Vec::with_capacity(sorted.len());
        for (i, current) in sorted.iter().enumerate() {
            let start = (i + 1).saturating_sub(self.window);
            let window = &sorted[start..=i];
            if window.len() < min_periods {
                out.push(None);
                continue;
            }

            let (mean, std) = mean_sample_std(window.iter().map(|o| o.price));
            let z_score = if has_variance(window) && std.is_finite() && std > 0.0 {
                Some((current.price - mean) / std).filter(|z| z.is_finite())
            } else {
                None
            };

            out.push(Some(RollingStat {
                date: current.date,
                price: current.price,
                mean,
                std,
                z_score,
            }));
        }
        out
    }

    /// Anomalous positions only: `|z| >= z_threshold`, ascending by date.
    pub fn detect(&self, series: &[PriceObservation]) -> Vec<AnomalyPoint> {
        self.score(series).iter().filter_map(|stat| self.anomaly_of(stat)).collect()
    }

    /// The flagged point for one scored position, if it crosses the threshold.
    pub fn anomaly_of(&self, stat: &RollingStat) -> Option<AnomalyPoint> {
        let z_score = stat.z_score?;
        (z_score.abs() >= self.z_threshold).then_some(AnomalyPoint {
            date: stat.date,
            price: stat.price,
            z_score,
        })
    }
}

fn sorted_by_date(series: &[PriceObservation]) -> Vec<&PriceObservation> {
    let mut sorted: Vec<&PriceObservation> = series.iter().collect();
    sorted.sort_by_key(|o| o.date);
    sorted
}

fn has_variance(window: &[&PriceObservation]) -> bool {
    let Some(first) = window.first() else {
        return false;
    };
    window.iter().any(|o| o.price != first.price)
}

/// Arithmetic mean and Bessel-corrected standard deviation.
fn mean_sample_std(values: impl Iterator<Item = f64> + Clone) -> (f64, f64) {
    let n = values.clone().count();
    if n == 0 {
        return (f64::NAN, f64::NAN);
    }
    let mean = values.clone().sum::<f64>() / n as f64;
    if n < 2 {
        return (mean, f64::NAN);
    }
    let sq_diff: f64 = values.map(|v| (v - mean).powi(2)).sum();
    (mean, (sq_diff / (n as f64 - 1.0)).sqrt())
}
