/// Study-period orchestration: thresholds once per reach, classification
/// per (reach, date) on a thread pool, then event extraction per reach.
///
/// The two-phase shape is deliberate. Classification is embarrassingly
/// parallel across dates and reaches, so per-date jobs run concurrently and
/// each writes its own warning CSV. Event extraction needs a reach's FULL
/// chronological alarm series, so it only starts after every date job has
/// completed (the `pool.join()` barrier).
///
/// Failures of a single (reach, date) unit are logged and skipped; the date
/// they belong to is filled with `R0` when the alarm series is assembled,
/// keeping the series contiguous for event extraction.

use chrono::{Duration, NaiveDate};
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::mpsc;
use threadpool::ThreadPool;

use crate::analysis::events::{ReachEventSummary, extract_events, summarize_events};
use crate::analysis::return_periods::table_from_history;
use crate::analysis::warnings::classify;
use crate::config::RunConfig;
use crate::drainage::{ReachConfig, load_reaches};
use crate::ingest::forecast::read_ensemble_forecast;
use crate::ingest::geoglows::load_or_fetch;
use crate::logging::{self, DataSource};
use crate::model::{AlarmLevel, AnalysisError, FetchError, NOMINAL_ENSEMBLE_SIZE, ReachId, ReturnPeriodTable};

// ---------------------------------------------------------------------------
// Output CSV formats
// ---------------------------------------------------------------------------

const WARNING_HEADER: &str = "comid,alert";
const SUMMARY_HEADER: &str = "comid,RP_2,RP_5,RP_10,RP_25,RP_50,RP_100";

/// Per-date warning CSV path: {output_dir}/{Y_m_d}.csv.
pub fn warning_csv_path(output_dir: &Path, date: NaiveDate) -> PathBuf {
    output_dir.join(format!("{}.csv", date.format("%Y_%m_%d")))
}

/// Renders one issuance date's classification rows.
pub fn render_warning_csv(rows: &[(ReachId, AlarmLevel)]) -> String {
    let mut out = String::from(WARNING_HEADER);
    out.push('\n');
    for (comid, alert) in rows {
        out.push_str(&format!("{},{}\n", comid, alert));
    }
    out
}

/// Parses a warning CSV back into classification rows (used by the event
/// summarization pass over previously written outputs).
pub fn parse_warning_csv(text: &str) -> Result<Vec<(ReachId, AlarmLevel)>, FetchError> {
    let mut rows = Vec::new();
    for line in text.lines().skip(1).filter(|l| !l.trim().is_empty()) {
        let (raw_comid, raw_alert) = line
            .split_once(',')
            .ok_or_else(|| FetchError::ParseError(format!("malformed warning row '{}'", line)))?;
        let comid = raw_comid
            .trim()
            .parse::<ReachId>()
            .map_err(|e| FetchError::ParseError(format!("bad comid '{}': {}", raw_comid, e)))?;
        let alert = AlarmLevel::from_label(raw_alert).ok_or_else(|| {
            FetchError::ParseError(format!("unknown alarm label '{}'", raw_alert))
        })?;
        rows.push((comid, alert));
    }
    Ok(rows)
}

/// Renders the cross-reach event summary table, zero-filled and sorted by
/// comid.
pub fn render_event_summary_csv(summaries: &[ReachEventSummary]) -> String {
    let mut out = String::from(SUMMARY_HEADER);
    out.push('\n');
    for s in summaries {
        out.push_str(&format!(
            "{},{},{},{},{},{},{}\n",
            s.reach_id, s.rp_2, s.rp_5, s.rp_10, s.rp_25, s.rp_50, s.rp_100
        ));
    }
    out
}

// ---------------------------------------------------------------------------
// Run report
// ---------------------------------------------------------------------------

/// Counters reported at the end of a run.
#[derive(Debug, Default, Clone)]
pub struct RunReport {
    pub dates_processed: usize,
    pub units_classified: usize,
    pub units_failed: usize,
    pub reaches_without_thresholds: usize,
    pub events_total: usize,
}

// ---------------------------------------------------------------------------
// Warning run
// ---------------------------------------------------------------------------

pub struct WarningRun {
    config: RunConfig,
    reaches: Vec<ReachConfig>,
}

impl WarningRun {
    /// Loads the drainage registry named by the configuration.
    pub fn new(config: RunConfig) -> Self {
        let reaches = load_reaches(&config.reaches_file);
        Self { config, reaches }
    }

    pub fn reaches(&self) -> &[ReachConfig] {
        &self.reaches
    }

    /// All issuance dates in the inclusive study period.
    pub fn study_dates(&self) -> Vec<NaiveDate> {
        let mut dates = Vec::new();
        let mut current = self.config.start_date;
        while current <= self.config.end_date {
            dates.push(current);
            current += Duration::days(1);
        }
        dates
    }

    /// Phase 0: one return-period table per reach, computed from the cached
    /// or freshly fetched historical simulation and reused for every date.
    /// Reaches whose history cannot be resolved are logged and excluded
    /// from the rest of the run.
    pub fn prepare_thresholds(&self) -> HashMap<ReachId, ReturnPeriodTable> {
        let historical_dir = Path::new(&self.config.historical_dir);
        let mut tables = HashMap::with_capacity(self.reaches.len());

        for reach in &self.reaches {
            let series = match load_or_fetch(historical_dir, reach.comid, &self.config.retry) {
                Ok(series) => series,
                Err(err) => {
                    logging::error(DataSource::Historical, Some(reach.comid), &err.to_string());
                    continue;
                }
            };
            match table_from_history(reach.comid, &series) {
                Ok(table) => {
                    tables.insert(reach.comid, table);
                }
                Err(err) => {
                    logging::error(DataSource::Historical, Some(reach.comid), &err.to_string());
                }
            }
        }
        tables
    }

    /// Runs the full study: classification across the thread pool, then the
    /// event pass once every date has completed.
    pub fn run(&self) -> Result<RunReport, Box<dyn std::error::Error>> {
        let output_dir = PathBuf::from(&self.config.output_dir);
        fs::create_dir_all(&output_dir)?;

        let thresholds = Arc::new(self.prepare_thresholds());
        let reaches = Arc::new(self.reaches.clone());
        let forecast_dir = Arc::new(PathBuf::from(&self.config.forecast_dir));

        let mut report = RunReport {
            reaches_without_thresholds: self.reaches.len() - thresholds.len(),
            ..RunReport::default()
        };

        // Phase 1: per-date classification jobs.
        let dates = self.study_dates();
        let pool = ThreadPool::new(self.config.workers);
        let (tx, rx) = mpsc::channel();

        for date in dates.iter().copied() {
            let thresholds = Arc::clone(&thresholds);
            let reaches = Arc::clone(&reaches);
            let forecast_dir = Arc::clone(&forecast_dir);
            let output_dir = output_dir.clone();
            let tx = tx.clone();

            pool.execute(move || {
                let outcome = classify_date(&forecast_dir, &reaches, &thresholds, date);
                let csv = render_warning_csv(&outcome.rows);
                if let Err(e) = fs::write(warning_csv_path(&output_dir, date), csv) {
                    logging::error(
                        DataSource::System,
                        None,
                        &format!("failed to write warnings for {}: {}", date, e),
                    );
                }
                // A closed receiver means the run was abandoned; nothing to do.
                let _ = tx.send((date, outcome));
            });
        }
        drop(tx);

        let mut by_date: BTreeMap<NaiveDate, DateOutcome> = BTreeMap::new();
        for (date, outcome) in rx {
            report.units_classified += outcome.rows.len();
            report.units_failed += outcome.failed_units;
            by_date.insert(date, outcome);
        }
        pool.join();
        report.dates_processed = by_date.len();

        // Phase 2: assemble per-reach alarm series (R0-filled where a unit
        // failed), extract events, summarize.
        let summaries = self.event_pass(&dates, &by_date, &mut report);
        fs::write(
            output_dir.join("event_summary.csv"),
            render_event_summary_csv(&summaries),
        )?;

        Ok(report)
    }

    fn event_pass(
        &self,
        dates: &[NaiveDate],
        by_date: &BTreeMap<NaiveDate, DateOutcome>,
        report: &mut RunReport,
    ) -> Vec<ReachEventSummary> {
        let mut summaries = Vec::with_capacity(self.reaches.len());
        for reach in &self.reaches {
            let series: Vec<(NaiveDate, AlarmLevel)> = dates
                .iter()
                .map(|&date| {
                    let level = by_date
                        .get(&date)
                        .and_then(|o| o.rows.iter().find(|(c, _)| *c == reach.comid))
                        .map(|(_, level)| *level)
                        .unwrap_or(AlarmLevel::R0);
                    (date, level)
                })
                .collect();
            let events = extract_events(reach.comid, &series);
            report.events_total += events.len();
            summaries.push(summarize_events(reach.comid, &events));
        }
        summaries
    }
}

// ---------------------------------------------------------------------------
// Per-date classification
// ---------------------------------------------------------------------------

struct DateOutcome {
    rows: Vec<(ReachId, AlarmLevel)>,
    failed_units: usize,
}

/// Classifies every reach for one issuance date. Unit failures (missing
/// forecast file, empty matrix, reach without thresholds) are logged and
/// counted; they never fail the date.
fn classify_date(
    forecast_dir: &Path,
    reaches: &[ReachConfig],
    thresholds: &HashMap<ReachId, ReturnPeriodTable>,
    date: NaiveDate,
) -> DateOutcome {
    let mut rows = Vec::with_capacity(reaches.len());
    let mut failed_units = 0;

    for reach in reaches {
        let Some(table) = thresholds.get(&reach.comid) else {
            // Already logged during threshold preparation.
            failed_units += 1;
            continue;
        };

        let forecast = match read_ensemble_forecast(forecast_dir, reach.comid, date) {
            Ok(forecast) => forecast,
            Err(err) => {
                logging::log_unit_failure(DataSource::Forecast, reach.comid, date, &err);
                failed_units += 1;
                continue;
            }
        };

        let missing = forecast.missing_members();
        if missing > 0 {
            // Non-fatal by policy: the fixed divisor 52 still applies.
            let err = AnalysisError::MissingMembers {
                reach_id: reach.comid,
                present: forecast.members.len(),
                expected: NOMINAL_ENSEMBLE_SIZE,
            };
            logging::warn(DataSource::Forecast, Some(reach.comid), &err.to_string());
        }

        match classify(&forecast, table) {
            Ok(alert) => rows.push((reach.comid, alert)),
            Err(err) => {
                logging::log_unit_failure(DataSource::Forecast, reach.comid, date, &err);
                failed_units += 1;
            }
        }
    }

    DateOutcome { rows, failed_units }
}
