//! Runtime configuration: `.env` + environment + CLI overrides.

use std::path::PathBuf;

/// Dataset used when neither `--data` nor `DATA_PATH` is given.
pub const DEFAULT_DATA_PATH: &str = "data/sample_prices.csv";

/// Environment variable naming the dataset CSV.
pub const DATA_PATH_ENV: &str = "DATA_PATH";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub data_path: PathBuf,
}

impl AppConfig {
    /// Load `.env` (if present) and resolve the dataset path.
    pub fn from_env(data_override: Option<PathBuf>) -> Self {
        dotenvy::dotenv().ok();
        Self::resolve(data_override, std::env::var(DATA_PATH_ENV).ok())
    }

    /// `--data` first, then `DATA_PATH`, then the built-in default.
    pub fn resolve(data_override: Option<PathBuf>, data_path_env: Option<String>) -> Self {
        let data_path = data_override
            .or_else(|| {
                data_path_env
                    .map(|v| v.trim().to_string())
                    .filter(|v| !v.is_empty())
                    .map(PathBuf::from)
            })
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_PATH));
        Self { data_path }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_override_beats_environment() {
        let cfg = AppConfig::resolve(Some("a.csv".into()), Some("b.csv".to_string()));
        assert_eq!(cfg.data_path, PathBuf::from("a.csv"));
    }

    #[test]
    fn environment_then_default() {
        let cfg = AppConfig::resolve(None, Some(" prices/ru.csv ".to_string()));
        assert_eq!(cfg.data_path, PathBuf::from("prices/ru.csv"));

        let cfg = AppConfig::resolve(None, Some("  ".to_string()));
        assert_eq!(cfg.data_path, PathBuf::from(DEFAULT_DATA_PATH));
        assert_eq!(AppConfig::resolve(None, None).data_path, PathBuf::from(DEFAULT_DATA_PATH));
    }
}
