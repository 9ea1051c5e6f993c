/// Core data types for the GeoGLOWS flood warning service.
///
/// This module defines the shared domain model imported by all other modules.
/// It contains no I/O and no external services — only types, their orderings,
/// and the error enums the rest of the crate propagates.

use chrono::{NaiveDate, NaiveDateTime};
use std::fmt;

// ---------------------------------------------------------------------------
// Reach identity and ensemble conventions
// ---------------------------------------------------------------------------

/// GeoGLOWS river reach identifier (`comid`). Stable integer key used
/// across thresholds, warnings, events, and summaries.
pub type ReachId = i64;

/// Nominal ensemble size: 51 perturbed members plus one high-resolution run.
/// Exceedance percentages always divide by this value, even when members are
/// missing from a forecast.
pub const NOMINAL_ENSEMBLE_SIZE: usize = 52;

/// Member index of the single deterministic high-resolution run
/// (`ensemble_52` in the GeoGLOWS extraction).
pub const HIGH_RES_MEMBER: u32 = 52;

// ---------------------------------------------------------------------------
// Alarm levels
// ---------------------------------------------------------------------------

/// Categorical flood alarm level tied to a return-period threshold.
///
/// Derive-ordered by severity: `R0 < R2 < R5 < R10 < R25 < R50 < R100`.
/// `R0` means "no warning" and never appears as an event peak.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum AlarmLevel {
    R0,
    R2,
    R5,
    R10,
    R25,
    R50,
    R100,
}

/// The six warning-capable levels, ascending. `R0` is deliberately excluded:
/// iteration over thresholds and event-summary columns uses this order.
pub const WARNING_LEVELS: [AlarmLevel; 6] = [
    AlarmLevel::R2,
    AlarmLevel::R5,
    AlarmLevel::R10,
    AlarmLevel::R25,
    AlarmLevel::R50,
    AlarmLevel::R100,
];

impl AlarmLevel {
    /// Numeric severity used when treating alarm series arithmetically:
    /// {R0:0, R2:2, R5:5, R10:10, R25:25, R50:50, R100:100}.
    pub fn severity(&self) -> u32 {
        match self {
            AlarmLevel::R0 => 0,
            AlarmLevel::R2 => 2,
            AlarmLevel::R5 => 5,
            AlarmLevel::R10 => 10,
            AlarmLevel::R25 => 25,
            AlarmLevel::R50 => 50,
            AlarmLevel::R100 => 100,
        }
    }

    /// The return period (years) this level corresponds to. `None` for `R0`.
    pub fn return_period(&self) -> Option<u32> {
        match self.severity() {
            0 => None,
            rp => Some(rp),
        }
    }

    /// String label used in output CSVs ("R0" .. "R100").
    pub fn label(&self) -> &'static str {
        match self {
            AlarmLevel::R0 => "R0",
            AlarmLevel::R2 => "R2",
            AlarmLevel::R5 => "R5",
            AlarmLevel::R10 => "R10",
            AlarmLevel::R25 => "R25",
            AlarmLevel::R50 => "R50",
            AlarmLevel::R100 => "R100",
        }
    }

    /// Parses an output label back into a level (used when re-reading
    /// warning CSVs for event summarization).
    pub fn from_label(label: &str) -> Option<AlarmLevel> {
        match label.trim() {
            "R0" => Some(AlarmLevel::R0),
            "R2" => Some(AlarmLevel::R2),
            "R5" => Some(AlarmLevel::R5),
            "R10" => Some(AlarmLevel::R10),
            "R25" => Some(AlarmLevel::R25),
            "R50" => Some(AlarmLevel::R50),
            "R100" => Some(AlarmLevel::R100),
            _ => None,
        }
    }
}

impl fmt::Display for AlarmLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

// ---------------------------------------------------------------------------
// Return-period thresholds
// ---------------------------------------------------------------------------

/// Gumbel-derived discharge thresholds (m³/s) for one reach, keyed by the
/// standard return periods {2, 5, 10, 25, 50, 100} years.
///
/// Computed once per reach from annual maxima and reused across every
/// forecast date; under a correctly-fit model the fields are non-decreasing
/// with return period (expected, not enforced).
#[derive(Debug, Clone, PartialEq)]
pub struct ReturnPeriodTable {
    pub reach_id: ReachId,
    pub return_period_2: f64,
    pub return_period_5: f64,
    pub return_period_10: f64,
    pub return_period_25: f64,
    pub return_period_50: f64,
    pub return_period_100: f64,
}

impl ReturnPeriodTable {
    /// Threshold for a given warning level. Panics on `R0`, which has no
    /// threshold by construction — callers iterate `WARNING_LEVELS`.
    pub fn threshold(&self, level: AlarmLevel) -> f64 {
        match level {
            AlarmLevel::R0 => unreachable!("R0 has no discharge threshold"),
            AlarmLevel::R2 => self.return_period_2,
            AlarmLevel::R5 => self.return_period_5,
            AlarmLevel::R10 => self.return_period_10,
            AlarmLevel::R25 => self.return_period_25,
            AlarmLevel::R50 => self.return_period_50,
            AlarmLevel::R100 => self.return_period_100,
        }
    }

    /// (level, threshold) pairs in ascending severity order.
    pub fn thresholds(&self) -> [(AlarmLevel, f64); 6] {
        [
            (AlarmLevel::R2, self.return_period_2),
            (AlarmLevel::R5, self.return_period_5),
            (AlarmLevel::R10, self.return_period_10),
            (AlarmLevel::R25, self.return_period_25),
            (AlarmLevel::R50, self.return_period_50),
            (AlarmLevel::R100, self.return_period_100),
        ]
    }
}

// ---------------------------------------------------------------------------
// Ensemble forecast matrix
// ---------------------------------------------------------------------------

/// One ensemble member's discharge trace, aligned to the forecast's shared
/// timestamp axis. `None` cells are missing values from the extraction.
#[derive(Debug, Clone, PartialEq)]
pub struct MemberTrace {
    /// GeoGLOWS member index (1..=52; 52 is the high-resolution run).
    pub member: u32,
    /// One entry per forecast timestamp.
    pub values: Vec<Option<f64>>,
}

/// Ensemble streamflow forecast matrix for one reach and one issuance date.
///
/// All member traces share the `timestamps` axis; `values.len()` equals
/// `timestamps.len()` for every member. Traces are not assumed complete —
/// both missing cells and entirely absent members occur in practice.
#[derive(Debug, Clone, PartialEq)]
pub struct EnsembleForecast {
    pub reach_id: ReachId,
    pub timestamps: Vec<NaiveDateTime>,
    pub members: Vec<MemberTrace>,
}

impl EnsembleForecast {
    /// Number of members absent relative to the nominal ensemble size.
    pub fn missing_members(&self) -> usize {
        NOMINAL_ENSEMBLE_SIZE.saturating_sub(self.members.len())
    }

    /// The high-resolution trace, if present.
    pub fn high_res(&self) -> Option<&MemberTrace> {
        self.members.iter().find(|m| m.member == HIGH_RES_MEMBER)
    }
}

// ---------------------------------------------------------------------------
// Per-day exceedance report
// ---------------------------------------------------------------------------

/// Exceedance percentages for one forecast day within an issuance horizon:
/// the share of ensemble members (out of the nominal 52) whose day-maximum
/// discharge strictly exceeds each return-period threshold, rounded to the
/// nearest integer percent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DailyExceedanceRecord {
    /// Start of the daily window (first forecast timestamp + n·24h).
    pub window_start: NaiveDateTime,
    pub rp_2_pct: u32,
    pub rp_5_pct: u32,
    pub rp_10_pct: u32,
    pub rp_25_pct: u32,
    pub rp_50_pct: u32,
    pub rp_100_pct: u32,
}

impl DailyExceedanceRecord {
    /// Percentage for a given warning level. Panics on `R0`.
    pub fn percent(&self, level: AlarmLevel) -> u32 {
        match level {
            AlarmLevel::R0 => unreachable!("R0 has no exceedance percentage"),
            AlarmLevel::R2 => self.rp_2_pct,
            AlarmLevel::R5 => self.rp_5_pct,
            AlarmLevel::R10 => self.rp_10_pct,
            AlarmLevel::R25 => self.rp_25_pct,
            AlarmLevel::R50 => self.rp_50_pct,
            AlarmLevel::R100 => self.rp_100_pct,
        }
    }
}

// ---------------------------------------------------------------------------
// Flood events
// ---------------------------------------------------------------------------

/// A maximal contiguous run of dates with alarm level above `R0` for one
/// reach. Produced by `analysis::events::extract_events`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    pub reach_id: ReachId,
    pub start: NaiveDate,
    pub end: NaiveDate,
    /// Highest alarm level observed within the run.
    pub peak: AlarmLevel,
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors raised by the analysis core. Every variant is scoped to a single
/// (reach, date) unit of work; callers log and continue with other units.
#[derive(Debug, Clone, PartialEq)]
pub enum AnalysisError {
    /// Empty or degenerate statistical input (e.g. no annual maxima).
    InvalidInput(String),
    /// The high-resolution member or all perturbed members are absent.
    EmptyEnsemble(String),
    /// No timestamps to classify.
    InsufficientData(String),
    /// A subset of the nominal 52 members is absent. Non-fatal:
    /// classification proceeds with the fixed divisor 52, which biases
    /// percentages downward — a documented policy of the warning system.
    MissingMembers {
        reach_id: ReachId,
        present: usize,
        expected: usize,
    },
}

impl fmt::Display for AnalysisError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnalysisError::InvalidInput(msg) => write!(f, "Invalid input: {}", msg),
            AnalysisError::EmptyEnsemble(msg) => write!(f, "Empty ensemble: {}", msg),
            AnalysisError::InsufficientData(msg) => {
                write!(f, "Insufficient data: {}", msg)
            }
            AnalysisError::MissingMembers {
                reach_id,
                present,
                expected,
            } => write!(
                f,
                "Reach {}: only {} of {} ensemble members present",
                reach_id, present, expected
            ),
        }
    }
}

impl std::error::Error for AnalysisError {}

/// Errors that can arise when fetching or reading forecast and historical
/// simulation data. These belong to the ingest boundary, not the analysis
/// core; the runner records them per unit and moves on.
#[derive(Debug)]
pub enum FetchError {
    /// Non-2xx HTTP response from the GeoGLOWS API.
    HttpError(u16),
    /// A response body or file could not be parsed.
    ParseError(String),
    /// The source answered but contained no usable values.
    NoDataAvailable(String),
    /// The bounded retry policy was exhausted without a usable response.
    RetriesExhausted { reach_id: ReachId, attempts: u32 },
    /// Filesystem failure reading or writing cached data.
    Io(String),
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchError::HttpError(code) => write!(f, "HTTP error: {}", code),
            FetchError::ParseError(msg) => write!(f, "Parse error: {}", msg),
            FetchError::NoDataAvailable(msg) => write!(f, "No data available: {}", msg),
            FetchError::RetriesExhausted { reach_id, attempts } => write!(
                f,
                "Reach {}: retries exhausted after {} attempts",
                reach_id, attempts
            ),
            FetchError::Io(msg) => write!(f, "I/O error: {}", msg),
        }
    }
}

impl std::error::Error for FetchError {}

impl From<std::io::Error> for FetchError {
    fn from(err: std::io::Error) -> Self {
        FetchError::Io(err.to_string())
    }
}
