//! `tracing` subscriber setup for the command-line front-end.

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Filter used when `RUST_LOG` is unset and no `-v` flag is given.
pub const DEFAULT_FILTER: &str = "food_price_anomaly=info";

/// Install a stderr subscriber. `RUST_LOG` wins unless `-v` flags are passed.
///
/// Not called for the TUI: log lines would corrupt the alternate screen.
pub fn init(verbose: u8) {
    let _ = tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter_for(verbose))
        .try_init();
}

fn filter_for(verbose: u8) -> EnvFilter {
    match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER)),
        1 => EnvFilter::new("food_price_anomaly=info"),
        2 => EnvFilter::new("food_price_anomaly=debug"),
        _ => EnvFilter::new("food_price_anomaly=trace"),
    }
}
