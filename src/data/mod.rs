//! Data sources other than CSV files.

pub mod sample;

pub use sample::{CommoditySpec, RegionSpec, SampleConfig, generate_sample};
