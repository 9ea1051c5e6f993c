/// Run configuration loader - parses geowarn.toml
///
/// Separates run parameters from code, making it easy to point the service
/// at different forecast archives, change the study period, or tune the
/// worker count without recompiling.

use chrono::NaiveDate;
use serde::Deserialize;
use std::fs;

use crate::ingest::geoglows::RetryPolicy;

/// Run parameters loaded from geowarn.toml.
#[derive(Debug, Clone, Deserialize)]
pub struct RunConfig {
    /// Root of the per-date forecast extraction folders ({YYYYMMDD.00}/).
    pub forecast_dir: String,

    /// Local cache of historical simulation CSVs, one per reach.
    pub historical_dir: String,

    /// Where per-date warning CSVs and the event summary are written.
    pub output_dir: String,

    /// Drainage network registry (reaches.toml).
    pub reaches_file: String,

    /// Inclusive study period, "YYYY-MM-DD" strings.
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,

    /// Parallel per-date classification jobs.
    #[serde(default = "default_workers")]
    pub workers: usize,

    /// Bounded retry policy for the HistoricSimulation API.
    #[serde(default)]
    pub retry: RetryPolicy,
}

fn default_workers() -> usize {
    10
}

/// Loads run configuration from geowarn.toml in the working directory.
///
/// # Panics
/// Panics if the configuration file is missing, malformed, or contains
/// invalid data. This is intentional — the service cannot operate without
/// valid run parameters.
pub fn load_config() -> RunConfig {
    load_config_from("geowarn.toml")
}

/// Loads run configuration from an explicit path (the `--config` flag).
///
/// # Panics
/// Same policy as `load_config`.
pub fn load_config_from(path: &str) -> RunConfig {
    let contents = fs::read_to_string(path)
        .unwrap_or_else(|e| panic!("Failed to read {}: {}", path, e));

    let config: RunConfig = toml::from_str(&contents)
        .unwrap_or_else(|e| panic!("Failed to parse {}: {}", path, e));

    if config.end_date < config.start_date {
        panic!(
            "{}: end_date {} precedes start_date {}",
            path, config.end_date, config.start_date
        );
    }
    if config.workers == 0 {
        panic!("{}: workers must be at least 1", path);
    }

    config
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_config_succeeds() {
        let config = load_config();
        assert!(!config.forecast_dir.is_empty());
        assert!(!config.output_dir.is_empty());
        assert!(config.workers >= 1);
    }

    #[test]
    fn test_study_period_is_well_ordered() {
        let config = load_config();
        assert!(config.start_date <= config.end_date);
    }

    #[test]
    fn test_retry_policy_defaults_apply() {
        let config: RunConfig = toml::from_str(
            r#"
            forecast_dir = "f"
            historical_dir = "h"
            output_dir = "o"
            reaches_file = "reaches.toml"
            start_date = "2014-01-01"
            end_date = "2014-01-31"
            "#,
        )
        .unwrap();
        assert_eq!(config.workers, 10);
        assert_eq!(config.retry.max_attempts, 5);
        assert_eq!(config.retry.initial_backoff_secs, 2);
    }

    #[test]
    #[should_panic(expected = "end_date")]
    fn test_inverted_date_range_panics() {
        let path = std::env::temp_dir().join("glowarn_bad_config.toml");
        fs::write(
            &path,
            r#"
            forecast_dir = "f"
            historical_dir = "h"
            output_dir = "o"
            reaches_file = "reaches.toml"
            start_date = "2014-12-31"
            end_date = "2014-01-01"
            "#,
        )
        .unwrap();
        load_config_from(path.to_str().unwrap());
    }
}
