//! Reporting utilities: terminal tables for query results.

pub mod format;

pub use format::*;
