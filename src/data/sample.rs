//! Synthetic monthly price data.
//!
//! Each `(commodity, region)` series follows a log random walk with drift.
//! Observed prices add a transient jump with small probability, which is what
//! the detector should pick up. Output is fully determined by the config.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use chrono::{Months, NaiveDate};
use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::Normal;
use tracing::debug;

use crate::domain::PriceObservation;
use crate::engine::PriceDataset;
use crate::error::AppError;

/// A commodity to generate, with its unit label and base price.
#[derive(Debug, Clone, PartialEq)]
pub struct CommoditySpec {
    pub name: String,
    pub unit: String,
    pub base_price: f64,
}

/// A region and its price level relative to the base.
#[derive(Debug, Clone, PartialEq)]
pub struct RegionSpec {
    pub name: String,
    pub price_factor: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SampleConfig {
    pub seed: u64,
    pub start: NaiveDate,
    pub months: usize,
    pub commodities: Vec<CommoditySpec>,
    pub regions: Vec<RegionSpec>,
    /// Mean monthly log-return.
    pub monthly_drift: f64,
    /// Monthly log-volatility.
    pub noise_sigma: f64,
    /// Probability that an observation carries a jump.
    pub jump_prob: f64,
    /// Jump size in units of `noise_sigma`; sign is random.
    pub jump_k: f64,
}

impl Default for SampleConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            start: NaiveDate::from_ymd_opt(2021, 1, 1).unwrap_or_default(),
            months: 36,
            commodities: vec![
                CommoditySpec {
                    name: "Bread".to_string(),
                    unit: "RUB/kg".to_string(),
                    base_price: 55.0,
                },
                CommoditySpec {
                    name: "Milk".to_string(),
                    unit: "RUB/l".to_string(),
                    base_price: 80.0,
                },
            ],
            regions: [
                ("Moscow", 1.15),
                ("St Petersburg", 1.10),
                ("Novosibirsk", 0.95),
                ("Yekaterinburg", 0.97),
                ("Kazan", 0.92),
            ]
            .into_iter()
            .map(|(name, price_factor)| RegionSpec {
                name: name.to_string(),
                price_factor,
            })
            .collect(),
            monthly_drift: 0.006,
            noise_sigma: 0.015,
            jump_prob: 0.04,
            jump_k: 6.0,
        }
    }
}

/// Generate a dataset ordered by commodity, region, then date.
pub fn generate_sample(config: &SampleConfig) -> Result<PriceDataset, AppError> {
    validate(config)?;

    let mut rng = StdRng::seed_from_u64(sample_seed(config));
    let normal = Normal::new(0.0, 1.0)
        .map_err(|e| AppError::new(4, format!("Noise distribution error: {e}")))?;

    let mut rows = Vec::with_capacity(config.commodities.len() * config.regions.len() * config.months);
    for commodity in &config.commodities {
        for region in &config.regions {
            let mut level = commodity.base_price * region.price_factor;
            for m in 0..config.months {
                let Some(date) = u32::try_from(m)
                    .ok()
                    .and_then(|m| config.start.checked_add_months(Months::new(m)))
                else {
                    return Err(AppError::invalid("Sample date range overflows the calendar."));
                };

                if m > 0 {
                    let z: f64 = normal.sample(&mut rng);
                    level *= (config.monthly_drift + config.noise_sigma * z).exp();
                }
                let jump = sample_jump(&mut rng, config.jump_prob, config.jump_k);
                let price = round_cents(level * (config.noise_sigma * jump).exp());

                rows.push(PriceObservation {
                    date,
                    region: region.name.clone(),
                    commodity: commodity.name.clone(),
                    price,
                    unit: commodity.unit.clone(),
                });
            }
        }
    }

    debug!(rows = rows.len(), seed = config.seed, "generated sample dataset");
    Ok(PriceDataset::new(rows))
}

fn validate(config: &SampleConfig) -> Result<(), AppError> {
    if config.months == 0 {
        return Err(AppError::invalid("Sample months must be > 0."));
    }
    if config.commodities.is_empty() || config.regions.is_empty() {
        return Err(AppError::invalid("Sample needs at least one commodity and one region."));
    }
    if config
        .commodities
        .iter()
        .any(|c| !(c.base_price.is_finite() && c.base_price > 0.0))
    {
        return Err(AppError::invalid("Commodity base prices must be finite and > 0."));
    }
    if config
        .regions
        .iter()
        .any(|r| !(r.price_factor.is_finite() && r.price_factor > 0.0))
    {
        return Err(AppError::invalid("Region price factors must be finite and > 0."));
    }
    if !(config.monthly_drift.is_finite() && config.noise_sigma.is_finite() && config.noise_sigma >= 0.0) {
        return Err(AppError::invalid("Invalid drift/noise settings."));
    }
    if !(0.0..1.0).contains(&config.jump_prob) {
        return Err(AppError::invalid("Jump probability must be in [0, 1)."));
    }
    if !(config.jump_k.is_finite() && config.jump_k > 0.0) {
        return Err(AppError::invalid("Jump magnitude must be finite and > 0."));
    }
    Ok(())
}

fn sample_jump(rng: &mut StdRng, p: f64, k: f64) -> f64 {
    let roll: f64 = rng.r#gen();
    if roll >= p {
        return 0.0;
    }
    if rng.r#gen::<bool>() { k } else { -k }
}

fn round_cents(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

fn sample_seed(config: &SampleConfig) -> u64 {
    let mut hasher = DefaultHasher::new();
    config.seed.hash(&mut hasher);
    config.start.hash(&mut hasher);
    config.months.hash(&mut hasher);
    for c in &config.commodities {
        c.name.hash(&mut hasher);
        c.base_price.to_bits().hash(&mut hasher);
    }
    for r in &config.regions {
        r.name.hash(&mut hasher);
        r.price_factor.to_bits().hash(&mut hasher);
    }
    config.monthly_drift.to_bits().hash(&mut hasher);
    config.noise_sigma.to_bits().hash(&mut hasher);
    config.jump_prob.to_bits().hash(&mut hasher);
    config.jump_k.to_bits().hash(&mut hasher);
    hasher.finish()
}
