//! Cross-region views of one commodity and session price alerts.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use tracing::debug;

use crate::domain::{AlertStatus, PriceAlert, PriceLevel, PriceObservation, RegionPrice};
use crate::engine::PriceDataset;

/// Latest price of `commodity` in every region that has one, sorted by region.
///
/// Rows sharing a region's newest date resolve to the last one in dataset
/// order. `relative` places each price between the cheapest and the most
/// expensive region.
pub fn latest_by_region(dataset: &PriceDataset, commodity: &str) -> Vec<RegionPrice> {
    let mut latest: BTreeMap<&str, &PriceObservation> = BTreeMap::new();
    for obs in dataset.iter().filter(|o| o.commodity == commodity) {
        latest
            .entry(obs.region.as_str())
            .and_modify(|cur| {
                if obs.date >= cur.date {
                    *cur = obs;
                }
            })
            .or_insert(obs);
    }

    let (min, max) = latest
        .values()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), o| (lo.min(o.price), hi.max(o.price)));
    let span = max - min;
    debug!(commodity, regions = latest.len(), "latest by region");

    latest
        .into_values()
        .map(|o| {
            let relative = if span > 0.0 { (o.price - min) / span } else { 0.0 };
            RegionPrice {
                region: o.region.clone(),
                date: o.date,
                price: o.price,
                unit: o.unit.clone(),
                relative,
                level: PriceLevel::from_ratio(relative),
            }
        })
        .collect()
}

/// Check each alert against the newest observation of its pair.
///
/// Output order matches `alerts`.
pub fn evaluate_alerts(dataset: &PriceDataset, alerts: &[PriceAlert]) -> Vec<AlertStatus> {
    alerts
        .iter()
        .map(|alert| {
            let latest = dataset
                .iter()
                .filter(|o| o.commodity == alert.commodity && o.region == alert.region)
                .max_by_key(|o| o.date)
                .map(|o| o.price);
            AlertStatus {
                alert: alert.clone(),
                latest,
                triggered: latest.is_some_and(|p| p >= alert.threshold),
            }
        })
        .collect()
}

/// Build an alert, rejecting thresholds that cannot be compared.
pub fn new_alert(commodity: &str, region: &str, threshold: f64, created: NaiveDate) -> Option<PriceAlert> {
    threshold.is_finite().then(|| PriceAlert {
        commodity: commodity.to_string(),
        region: region.to_string(),
        threshold,
        created,
    })
}
