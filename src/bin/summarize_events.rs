//! Flood Event Summarization
//!
//! Re-derives flood events and the cross-reach summary table from warning
//! CSVs written by a previous study run, without re-running classification.
//!
//! For each reach in the registry:
//! 1. Assemble the chronological alarm series from {output_dir}/{Y_m_d}.csv
//!    (dates with no row for the reach count as R0)
//! 2. Segment the series into flood events
//! 3. Tabulate event counts per peak severity
//!
//! Usage:
//!   cargo run --bin summarize_events
//!   cargo run --bin summarize_events -- --config other.toml

use chrono::Duration;
use glowarn_service::analysis::events::{extract_events, summarize_events};
use glowarn_service::config;
use glowarn_service::model::AlarmLevel;
use glowarn_service::runner::{parse_warning_csv, render_event_summary_csv, warning_csv_path};
use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::Path;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("🌊 Flood Event Summarization");
    println!("============================\n");

    let args: Vec<String> = env::args().collect();
    let config_path = args
        .iter()
        .position(|a| a == "--config")
        .and_then(|i| args.get(i + 1))
        .cloned();

    let config = match config_path {
        Some(path) => config::load_config_from(&path),
        None => config::load_config(),
    };
    let reaches = glowarn_service::drainage::load_reaches(&config.reaches_file);
    let output_dir = Path::new(&config.output_dir);

    // Read every per-date warning CSV in the study period.
    println!("📋 Reading warning CSVs from {}...", config.output_dir);
    let mut by_date = Vec::new();
    let mut missing_dates = 0usize;
    let mut date = config.start_date;
    while date <= config.end_date {
        let path = warning_csv_path(output_dir, date);
        match fs::read_to_string(&path) {
            Ok(text) => {
                let rows: HashMap<_, _> = parse_warning_csv(&text)?.into_iter().collect();
                by_date.push((date, rows));
            }
            Err(_) => {
                // A whole missing date is an R0 day for every reach.
                missing_dates += 1;
                by_date.push((date, HashMap::new()));
            }
        }
        date += Duration::days(1);
    }
    println!(
        "✓ {} dates read ({} missing, treated as R0)\n",
        by_date.len(),
        missing_dates
    );

    // Per-reach event extraction and summarization.
    println!("🔍 Extracting flood events for {} reaches...", reaches.len());
    let mut summaries = Vec::with_capacity(reaches.len());
    let mut events_total = 0usize;
    for reach in &reaches {
        let series: Vec<_> = by_date
            .iter()
            .map(|(date, rows)| {
                (*date, rows.get(&reach.comid).copied().unwrap_or(AlarmLevel::R0))
            })
            .collect();
        let events = extract_events(reach.comid, &series);
        events_total += events.len();
        summaries.push(summarize_events(reach.comid, &events));
    }

    let summary_path = output_dir.join("event_summary.csv");
    fs::write(&summary_path, render_event_summary_csv(&summaries))?;
    println!("✓ Found {} events", events_total);
    println!("✓ Summary written to {}\n", summary_path.display());

    Ok(())
}
