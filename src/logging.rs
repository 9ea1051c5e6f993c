/// Structured logging for the flood warning service.
///
/// Context-rich console/file logging with reach identifiers and severity
/// levels. Per-unit classification failures are logged here and never abort
/// the run: each (reach, date) is an independent unit of work.

use chrono::{NaiveDate, Utc};
use std::fmt;
use std::fs::OpenOptions;
use std::io::Write;
use std::sync::Mutex;

use crate::model::ReachId;

// ---------------------------------------------------------------------------
// Log Levels
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Debug,
    Info,
    Warning,
    Error,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogLevel::Debug => write!(f, "DEBUG"),
            LogLevel::Info => write!(f, "INFO"),
            LogLevel::Warning => write!(f, "WARN"),
            LogLevel::Error => write!(f, "ERROR"),
        }
    }
}

// ---------------------------------------------------------------------------
// Data Source Types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataSource {
    Forecast,
    Historical,
    System,
}

impl fmt::Display for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataSource::Forecast => write!(f, "FCST"),
            DataSource::Historical => write!(f, "HIST"),
            DataSource::System => write!(f, "SYS"),
        }
    }
}

// ---------------------------------------------------------------------------
// Logger
// ---------------------------------------------------------------------------

/// Global logger instance
static LOGGER: Mutex<Option<Logger>> = Mutex::new(None);

pub struct Logger {
    /// Minimum log level to display
    min_level: LogLevel,
    /// Optional file path for logging
    log_file: Option<String>,
}

impl Logger {
    /// Initialize the global logger
    pub fn init(min_level: LogLevel, log_file: Option<String>) {
        let logger = Logger {
            min_level,
            log_file,
        };
        *LOGGER.lock().unwrap() = Some(logger);
    }

    fn log(&self, level: LogLevel, source: DataSource, reach: Option<ReachId>, message: &str) {
        if level < self.min_level {
            return;
        }

        let timestamp = Utc::now().format("%Y-%m-%d %H:%M:%S UTC");
        let reach_part = reach.map(|r| format!(" [{}]", r)).unwrap_or_default();
        let entry = format!("{} {} {}{}: {}", timestamp, level, source, reach_part, message);

        match level {
            LogLevel::Error => eprintln!("   ✗ {}{}: {}", source, reach_part, message),
            LogLevel::Warning => eprintln!("   ⚠ {}{}: {}", source, reach_part, message),
            LogLevel::Info => println!("   {}", message),
            LogLevel::Debug => println!("   [DEBUG] {}", message),
        }

        if let Some(ref path) = self.log_file {
            if let Err(e) = Self::append_to_file(path, &entry) {
                eprintln!("Failed to write to log file {}: {}", path, e);
            }
        }
    }

    fn append_to_file(path: &str, entry: &str) -> std::io::Result<()> {
        let mut file = OpenOptions::new().create(true).append(true).open(path)?;
        writeln!(file, "{}", entry)?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Public Logging Functions
// ---------------------------------------------------------------------------

/// Initialize the global logger
pub fn init_logger(min_level: LogLevel, log_file: Option<&str>) {
    Logger::init(min_level, log_file.map(String::from));
}

pub fn info(source: DataSource, reach: Option<ReachId>, message: &str) {
    if let Some(logger) = LOGGER.lock().unwrap().as_ref() {
        logger.log(LogLevel::Info, source, reach, message);
    }
}

pub fn warn(source: DataSource, reach: Option<ReachId>, message: &str) {
    if let Some(logger) = LOGGER.lock().unwrap().as_ref() {
        logger.log(LogLevel::Warning, source, reach, message);
    }
}

pub fn error(source: DataSource, reach: Option<ReachId>, message: &str) {
    if let Some(logger) = LOGGER.lock().unwrap().as_ref() {
        logger.log(LogLevel::Error, source, reach, message);
    }
}

pub fn debug(source: DataSource, reach: Option<ReachId>, message: &str) {
    if let Some(logger) = LOGGER.lock().unwrap().as_ref() {
        logger.log(LogLevel::Debug, source, reach, message);
    }
}

// ---------------------------------------------------------------------------
// Per-Unit Failure Logging
// ---------------------------------------------------------------------------

/// Log the failure of a single (reach, issuance date) unit of work. The
/// unit is skipped; the run continues with everything else.
pub fn log_unit_failure(
    source: DataSource,
    reach: ReachId,
    date: NaiveDate,
    err: &dyn std::error::Error,
) {
    let message = format!("{} skipped: {}", date, err);
    error(source, Some(reach), &message);
}
