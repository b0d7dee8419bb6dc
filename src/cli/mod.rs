//! Command-line parsing for the food price anomaly tracker.
//!
//! The goal of this module is to keep **argument parsing** separate from the
//! query engine. Parameter bounds for the detector are enforced here, before
//! the engine is called.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{ArgAction, Args, Parser, Subcommand};

use crate::domain::{
    DEFAULT_WINDOW, DEFAULT_Z_THRESHOLD, DetectorParams, MAX_WINDOW, MAX_Z_THRESHOLD, MIN_WINDOW,
    MIN_Z_THRESHOLD,
};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "fpa", version, about = "Food price anomaly tracker (rolling z-score)")]
pub struct Cli {
    /// Price CSV to load (overrides `DATA_PATH`).
    #[arg(long, global = true, value_name = "CSV")]
    pub data: Option<PathBuf>,

    /// More log output on stderr (-v info, -vv debug, -vvv trace).
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// List distinct commodities.
    Commodities(OutputArgs),
    /// List distinct regions.
    Regions(OutputArgs),
    /// Show latest date and commodity/region counts.
    Summary(OutputArgs),
    /// Show the price history for one commodity in one region.
    Prices(PricesArgs),
    /// Detect anomalous prices for one commodity in one region.
    Anomalies(AnomalyArgs),
    /// Detect anomalies across every commodity/region pair.
    Scan(ScanArgs),
    /// Compare the latest price of one commodity across regions.
    Latest(LatestArgs),
    /// Write a synthetic price CSV.
    Sample(SampleArgs),
    /// Launch the interactive dashboard.
    Tui,
}

#[derive(Debug, Args, Clone)]
pub struct OutputArgs {
    /// Print JSON instead of a table.
    #[arg(long)]
    pub json: bool,
}

/// Which series to query.
#[derive(Debug, Args, Clone)]
pub struct SeriesArgs {
    /// Commodity name (exact, case-sensitive).
    #[arg(short = 'c', long)]
    pub commodity: String,

    /// Region name (exact, case-sensitive).
    #[arg(short = 'r', long)]
    pub region: String,

    /// Only the most recent N months (30-day months) of the series.
    #[arg(long, allow_negative_numbers = true)]
    pub months: Option<i64>,
}

/// Detector settings shared by `anomalies` and `scan`.
#[derive(Debug, Args, Clone)]
pub struct DetectorArgs {
    /// Rolling window length in observations (3-52).
    #[arg(short = 'w', long, default_value_t = DEFAULT_WINDOW, value_parser = parse_window)]
    pub window: usize,

    /// Absolute z-score threshold (1.0-5.0).
    #[arg(short = 'z', long = "z", default_value_t = DEFAULT_Z_THRESHOLD, value_parser = parse_z_threshold)]
    pub z_threshold: f64,
}

#[derive(Debug, Args, Clone)]
pub struct PricesArgs {
    #[command(flatten)]
    pub series: SeriesArgs,

    #[command(flatten)]
    pub plot: PlotArgs,

    #[command(flatten)]
    pub output: OutputArgs,
}

/// ASCII plot settings.
#[derive(Debug, Args, Clone)]
pub struct PlotArgs {
    /// Render an ASCII plot under the table.
    #[arg(long)]
    pub plot: bool,

    /// Plot width (columns).
    #[arg(long, default_value_t = 80)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 20)]
    pub height: usize,
}

#[derive(Debug, Args, Clone)]
pub struct AnomalyArgs {
    #[command(flatten)]
    pub series: SeriesArgs,

    #[command(flatten)]
    pub detector: DetectorArgs,

    /// Write the series with anomaly flags to CSV.
    #[arg(long, value_name = "CSV")]
    pub export: Option<PathBuf>,

    #[command(flatten)]
    pub plot: PlotArgs,

    #[command(flatten)]
    pub output: OutputArgs,
}

#[derive(Debug, Args, Clone)]
pub struct ScanArgs {
    #[command(flatten)]
    pub detector: DetectorArgs,

    /// Only the most recent N months (30-day months) of each series.
    #[arg(long, allow_negative_numbers = true)]
    pub months: Option<i64>,

    #[command(flatten)]
    pub output: OutputArgs,
}

#[derive(Debug, Args, Clone)]
pub struct LatestArgs {
    /// Commodity name (exact, case-sensitive).
    #[arg(short = 'c', long)]
    pub commodity: String,

    #[command(flatten)]
    pub output: OutputArgs,
}

#[derive(Debug, Args, Clone)]
pub struct SampleArgs {
    /// Output CSV path.
    #[arg(short = 'o', long, value_name = "CSV")]
    pub out: PathBuf,

    /// Random seed.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// First month of data (YYYY-MM-DD).
    #[arg(long, default_value = "2021-01-01", value_parser = parse_date)]
    pub start: NaiveDate,

    /// Number of monthly observations per series.
    #[arg(long, default_value_t = 36)]
    pub months: usize,

    /// Mean monthly log-return.
    #[arg(long, default_value_t = 0.006, allow_negative_numbers = true)]
    pub drift: f64,

    /// Monthly log-volatility.
    #[arg(long, default_value_t = 0.015)]
    pub noise: f64,

    /// Probability that an observation carries a price jump.
    #[arg(long, default_value_t = 0.04)]
    pub jump_prob: f64,

    /// Jump size in units of the monthly volatility.
    #[arg(long, default_value_t = 6.0)]
    pub jump_k: f64,
}

impl DetectorArgs {
    pub fn params(&self, time_window_months: Option<i64>) -> DetectorParams {
        DetectorParams {
            window: self.window,
            z_threshold: self.z_threshold,
            time_window_months,
        }
    }
}

fn parse_window(s: &str) -> Result<usize, String> {
    let v: usize = s.parse().map_err(|_| format!("'{s}' is not a whole number"))?;
    if !(MIN_WINDOW..=MAX_WINDOW).contains(&v) {
        return Err(format!("window must be between {MIN_WINDOW} and {MAX_WINDOW}"));
    }
    Ok(v)
}

fn parse_z_threshold(s: &str) -> Result<f64, String> {
    let v: f64 = s.parse().map_err(|_| format!("'{s}' is not a number"))?;
    if !(MIN_Z_THRESHOLD..=MAX_Z_THRESHOLD).contains(&v) {
        return Err(format!("z must be between {MIN_Z_THRESHOLD} and {MAX_Z_THRESHOLD}"));
    }
    Ok(v)
}

fn parse_date(s: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|e| format!("invalid date '{s}': {e}"))
}
