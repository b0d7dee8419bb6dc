//! Price query and anomaly detection engine.
//!
//! Everything here is synchronous, in-memory, and free of I/O. The dataset is
//! built once by ingestion and read concurrently afterwards:
//!
//! - `dataset`: the immutable table plus the snapshot store used for reloads
//! - `selector`: per-pair series selection and the 30-day-month time window
//! - `detector`: rolling z-score scoring
//! - `metadata`: distinct commodities/regions and summary facts
//! - `query`: composite lookups built from the pieces above
//! - `regional`: latest price per region and session alert checks

pub mod dataset;
pub mod detector;
pub mod metadata;
pub mod query;
pub mod regional;
pub mod selector;

pub use dataset::{DatasetStore, PriceDataset};
pub use detector::RollingAnomalyDetector;
pub use metadata::{distinct_commodities, distinct_regions, summarize};
pub use query::{anomaly_report, price_series, scan_anomalies};
pub use regional::{evaluate_alerts, latest_by_region, new_alert};
pub use selector::{apply_time_window, select};
