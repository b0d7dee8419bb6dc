//! `food-price-anomaly` library crate.
//!
//! The binary (`fpa`) is a thin wrapper around this library so that:
//!
//! - the query engine is testable without spawning processes
//! - the same engine serves the CLI and the TUI (and could back a service)
//! - code stays easy to navigate as the project grows

pub mod app;
pub mod cli;
pub mod data;
pub mod domain;
pub mod engine;
pub mod error;
pub mod io;
pub mod plot;
pub mod report;
pub mod tui;
