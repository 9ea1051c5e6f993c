//! GeoGLOWS Flood Warning Service - Study Runner
//!
//! Classifies flood risk for every configured river reach across a study
//! period of forecast issuance dates:
//! 1. Fits Gumbel return-period thresholds per reach (cached historical data)
//! 2. Classifies each (reach, date) from its ensemble forecast on a thread pool
//! 3. Writes one warning CSV per issuance date
//! 4. Segments per-reach alarm series into flood events
//! 5. Writes the cross-reach event summary table
//!
//! Usage:
//!   cargo run --release                         # Use ./geowarn.toml
//!   cargo run --release -- --config other.toml  # Explicit configuration
//!   cargo run --release -- --log-file run.log   # Also log to a file

use glowarn_service::config;
use glowarn_service::logging::{self, LogLevel};
use glowarn_service::runner::WarningRun;
use std::env;

fn main() {
    println!("🌊 GeoGLOWS Flood Warning Service");
    println!("==================================\n");

    // Parse command-line arguments
    let args: Vec<String> = env::args().collect();
    let mut config_path: Option<String> = None;
    let mut log_file: Option<String> = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--config" => {
                if i + 1 < args.len() {
                    config_path = Some(args[i + 1].clone());
                    i += 2;
                } else {
                    eprintln!("Error: --config requires a path");
                    std::process::exit(1);
                }
            }
            "--log-file" => {
                if i + 1 < args.len() {
                    log_file = Some(args[i + 1].clone());
                    i += 2;
                } else {
                    eprintln!("Error: --log-file requires a path");
                    std::process::exit(1);
                }
            }
            _ => {
                eprintln!("Unknown argument: {}", args[i]);
                eprintln!("Usage: {} [--config PATH] [--log-file PATH]", args[0]);
                std::process::exit(1);
            }
        }
    }

    logging::init_logger(LogLevel::Info, log_file.as_deref());

    // Load configuration and drainage registry
    println!("⚙️  Loading configuration...");
    let config = match config_path {
        Some(path) => config::load_config_from(&path),
        None => config::load_config(),
    };
    println!("✓ Configuration loaded:");
    println!("  - Study period: {} → {}", config.start_date, config.end_date);
    println!("  - Forecast dir: {}", config.forecast_dir);
    println!("  - Output dir:   {}", config.output_dir);
    println!("  - Workers:      {}\n", config.workers);

    let run = WarningRun::new(config);
    println!("📋 Drainage registry: {} reaches\n", run.reaches().len());

    // Run the full study
    println!("🔄 Classifying {} issuance dates...\n", run.study_dates().len());
    let report = match run.run() {
        Ok(report) => report,
        Err(e) => {
            eprintln!("\n❌ Run failed: {}\n", e);
            std::process::exit(1);
        }
    };

    // Summary
    println!("\n{}", "=".repeat(50));
    println!("Summary:");
    println!("  Dates processed:     {}", report.dates_processed);
    println!("  Units classified:    {}", report.units_classified);
    println!("  Units failed:        {}", report.units_failed);
    println!("  Reaches w/o history: {}", report.reaches_without_thresholds);
    println!("  Flood events found:  {}", report.events_total);
    println!("{}", "=".repeat(50));
}
