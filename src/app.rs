//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments
//! - resolves configuration and sets up logging
//! - loads the price dataset
//! - runs queries and prints tables, plots, or JSON
//! - writes optional exports

use clap::Parser;
use serde::Serialize;
use tracing::info;

use crate::cli::{AnomalyArgs, Command, LatestArgs, OutputArgs, PlotArgs, PricesArgs, SampleArgs, ScanArgs};
use crate::data::SampleConfig;
use crate::domain::SummaryFact;
use crate::engine::PriceDataset;
use crate::error::AppError;

pub mod config;
pub mod logging;
pub mod pipeline;

pub use config::AppConfig;

/// Entry point for the `fpa` binary.
pub fn run() -> Result<(), AppError> {
    // `fpa` and `fpa --data x.csv` open the dashboard. Clap requires a
    // subcommand name, so argv is rewritten before parsing.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);
    let config = AppConfig::from_env(cli.data);

    if !matches!(cli.command, Command::Tui) {
        logging::init(cli.verbose);
    }

    match cli.command {
        Command::Commodities(out) => handle_list(&config, ListKind::Commodities, out),
        Command::Regions(out) => handle_list(&config, ListKind::Regions, out),
        Command::Summary(out) => handle_summary(&config, out),
        Command::Prices(args) => handle_prices(&config, args),
        Command::Anomalies(args) => handle_anomalies(&config, args),
        Command::Scan(args) => handle_scan(&config, args),
        Command::Latest(args) => handle_latest(&config, args),
        Command::Sample(args) => handle_sample(args),
        Command::Tui => crate::tui::run(&config),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ListKind {
    Commodities,
    Regions,
}

/// JSON shape for list endpoints.
#[derive(Debug, Serialize)]
struct ItemList {
    items: Vec<String>,
}

/// JSON shape for the summary endpoint.
#[derive(Debug, Serialize)]
struct SummaryCards {
    cards: Vec<SummaryFact>,
}

fn handle_list(config: &AppConfig, kind: ListKind, out: OutputArgs) -> Result<(), AppError> {
    let dataset = pipeline::load_dataset(&config.data_path);
    let (title, items) = match kind {
        ListKind::Commodities => ("Commodities", crate::engine::distinct_commodities(&dataset)),
        ListKind::Regions => ("Regions", crate::engine::distinct_regions(&dataset)),
    };

    if out.json {
        return print_json(&ItemList { items });
    }
    print!("{}", crate::report::format_list(title, &items));
    Ok(())
}

fn handle_summary(config: &AppConfig, out: OutputArgs) -> Result<(), AppError> {
    let dataset = pipeline::load_dataset(&config.data_path);
    let cards = crate::engine::summarize(&dataset);

    if out.json {
        return print_json(&SummaryCards { cards });
    }
    print!("{}", crate::report::format_summary(&cards));
    Ok(())
}

fn handle_prices(config: &AppConfig, args: PricesArgs) -> Result<(), AppError> {
    let dataset = pipeline::load_dataset(&config.data_path);
    let series = crate::engine::price_series(
        &dataset,
        &args.series.commodity,
        &args.series.region,
        args.series.months,
    );

    if args.output.json {
        return print_json(&series);
    }
    print!("{}", crate::report::format_price_series(&series));
    print_plot(&args.plot, &series.records, &[], &[]);
    Ok(())
}

fn handle_anomalies(config: &AppConfig, args: AnomalyArgs) -> Result<(), AppError> {
    let dataset = pipeline::load_dataset(&config.data_path);
    let params = args.detector.params(args.series.months);
    let analysis = pipeline::analyze(&dataset, &args.series.commodity, &args.series.region, &params)?;

    if let Some(path) = &args.export {
        if analysis.series.records.is_empty() {
            return Err(AppError::new(
                3,
                format!(
                    "No price records for {} / {}; nothing to export.",
                    args.series.commodity, args.series.region
                ),
            ));
        }
        crate::io::write_analysis_csv(path, &analysis.series.records, &analysis.flags)?;
        info!(path = %path.display(), rows = analysis.series.records.len(), "wrote analysis CSV");
    }

    if args.output.json {
        return print_json(&analysis.report);
    }
    print!("{}", crate::report::format_anomaly_report(&analysis.report));
    print_plot(
        &args.plot,
        &analysis.series.records,
        &analysis.rolling,
        &analysis.report.points,
    );
    Ok(())
}

fn handle_scan(config: &AppConfig, args: ScanArgs) -> Result<(), AppError> {
    let dataset = pipeline::load_dataset(&config.data_path);
    let params = args.detector.params(args.months);
    let reports = crate::engine::scan_anomalies(&dataset, &params)?;

    if args.output.json {
        return print_json(&reports);
    }
    print!("{}", crate::report::format_scan(&reports));
    Ok(())
}

fn handle_latest(config: &AppConfig, args: LatestArgs) -> Result<(), AppError> {
    let dataset = pipeline::load_dataset(&config.data_path);
    let rows = crate::engine::latest_by_region(&dataset, &args.commodity);

    if args.output.json {
        return print_json(&rows);
    }
    print!("{}", crate::report::format_latest(&args.commodity, &rows));
    Ok(())
}

fn handle_sample(args: SampleArgs) -> Result<(), AppError> {
    let config = sample_config_from_args(&args);
    let dataset: PriceDataset = crate::data::generate_sample(&config)?;
    crate::io::write_dataset_csv(&args.out, &dataset)?;
    info!(path = %args.out.display(), rows = dataset.len(), seed = config.seed, "wrote sample dataset");
    println!("Wrote {} rows to {}", dataset.len(), args.out.display());
    Ok(())
}

pub fn sample_config_from_args(args: &SampleArgs) -> SampleConfig {
    SampleConfig {
        seed: args.seed,
        start: args.start,
        months: args.months,
        monthly_drift: args.drift,
        noise_sigma: args.noise,
        jump_prob: args.jump_prob,
        jump_k: args.jump_k,
        ..SampleConfig::default()
    }
}

fn print_plot(
    plot: &PlotArgs,
    records: &[crate::domain::PriceObservation],
    rolling: &[crate::domain::RollingStat],
    anomalies: &[crate::domain::AnomalyPoint],
) {
    if !plot.plot {
        return;
    }
    println!();
    print!(
        "{}",
        crate::plot::render_series_plot(records, rolling, anomalies, plot.width, plot.height)
    );
}

fn print_json<T: Serialize>(value: &T) -> Result<(), AppError> {
    let text = serde_json::to_string_pretty(value)
        .map_err(|e| AppError::new(4, format!("Failed to serialize JSON: {e}")))?;
    println!("{text}");
    Ok(())
}

/// Rewrite argv so `fpa` defaults to `fpa tui`.
///
/// Rules:
/// - `fpa`                      -> `fpa tui`
/// - `fpa --data x.csv`         -> `fpa tui --data x.csv`
/// - `fpa --help/--version/-h`  -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("tui".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(
        arg1.as_str(),
        "-h" | "--help" | "-V" | "--version" | "help"
    );
    if is_top_level_help_or_version {
        return argv;
    }

    // If the first token is a flag, treat it as "tui flags".
    if arg1.starts_with('-') {
        argv.insert(1, "tui".to_string());
    }
    argv
}

#[cfg(test)]
mod tests {
    use super::*;

    fn argv(args: &[&str]) -> Vec<String> {
        args.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn bare_invocation_opens_tui() {
        assert_eq!(rewrite_args(argv(&["fpa"])), argv(&["fpa", "tui"]));
        assert_eq!(
            rewrite_args(argv(&["fpa", "--data", "x.csv"])),
            argv(&["fpa", "tui", "--data", "x.csv"])
        );
    }

    #[test]
    fn subcommands_and_help_are_untouched() {
        assert_eq!(rewrite_args(argv(&["fpa", "--help"])), argv(&["fpa", "--help"]));
        assert_eq!(rewrite_args(argv(&["fpa", "scan"])), argv(&["fpa", "scan"]));
    }

    #[test]
    fn rewritten_flags_parse_as_tui() {
        let cli = crate::cli::Cli::try_parse_from(rewrite_args(argv(&["fpa", "--data", "x.csv"]))).unwrap();
        assert!(matches!(cli.command, Command::Tui));
        assert_eq!(cli.data, Some("x.csv".into()));
    }

    #[test]
    fn sample_args_override_defaults_only_where_given() {
        let cli = crate::cli::Cli::try_parse_from(["fpa", "sample", "--out", "s.csv", "--seed", "7"]).unwrap();
        let Command::Sample(args) = cli.command else {
            panic!("expected sample");
        };
        let cfg = sample_config_from_args(&args);
        assert_eq!(cfg.seed, 7);
        assert_eq!(cfg.months, 36);
        assert_eq!(cfg.commodities.len(), SampleConfig::default().commodities.len());
    }
}
