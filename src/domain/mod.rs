//! Domain types used throughout the engine.
//!
//! This module defines:
//!
//! - the typed price record (`PriceObservation`)
//! - derived query outputs (`AnomalyPoint`, `RollingStat`, `SummaryFact`)
//! - response values (`PriceSeries`, `AnomalyReport`) and `DetectorParams`
//! - regional comparison (`RegionPrice`, `PriceLevel`) and session alerts

pub mod types;

pub use types::*;
