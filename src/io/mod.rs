//! Input/output helpers.
//!
//! - CSV ingest + row validation (`ingest`)
//! - dataset and analysis CSV exports (`export`)

pub mod export;
pub mod ingest;

pub use export::*;
pub use ingest::*;
