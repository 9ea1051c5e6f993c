/// Warning classification: raw ensemble matrix + return-period thresholds →
/// one categorical alarm level per reach per issuance date.
///
/// The classifier works off the RAW matrix — every member present, missing
/// cells simply ignored when taking window maxima. It does not reuse the
/// descriptive statistics from `analysis::ensemble`, whose complete-row
/// cleaning would silently change exceedance counts.
///
/// Two behaviors are preserved exactly as the warning system has always run
/// them; downstream consumers calibrate against both:
///
/// - Daily windows are inclusive of BOTH endpoints, so a timestamp landing
///   exactly on a day boundary is counted in two adjacent windows.
/// - Exceedance percentages always divide by the nominal ensemble size 52,
///   even when members are missing, biasing percentages downward for
///   under-strength forecasts.
///
/// Rounding of percentages is half-away-from-zero (`f64::round`), applied
/// consistently to every threshold on every day.

use chrono::Duration;

use crate::model::{
    AlarmLevel, AnalysisError, DailyExceedanceRecord, EnsembleForecast,
    NOMINAL_ENSEMBLE_SIZE, WARNING_LEVELS, ReturnPeriodTable,
};

/// Percentage of members that must exceed a threshold on some day for that
/// level to be flagged.
pub const FLAG_THRESHOLD_PCT: u32 = 40;

/// Rounded share of the nominal ensemble represented by `count` members.
fn exceedance_pct(count: usize) -> u32 {
    ((count * 100) as f64 / NOMINAL_ENSEMBLE_SIZE as f64).round() as u32
}

/// Computes per-day exceedance percentages across the issuance horizon.
///
/// Day boundaries sit at `first_timestamp + n·24h`. The horizon spans one
/// window per whole day between the first and last timestamp plus the
/// trailing boundary day, which is used only to close the final window and
/// is never itself reported.
///
/// # Errors
/// `AnalysisError::InsufficientData` if the forecast has no timestamps.
pub fn daily_exceedance(
    forecast: &EnsembleForecast,
    rperiods: &ReturnPeriodTable,
) -> Result<Vec<DailyExceedanceRecord>, AnalysisError> {
    let first = *forecast.timestamps.first().ok_or_else(|| {
        AnalysisError::InsufficientData(format!(
            "reach {}: forecast has no timestamps",
            forecast.reach_id
        ))
    })?;
    let last = *forecast
        .timestamps
        .last()
        .unwrap_or(&first);

    let span_days = (last - first).num_days();
    let thresholds = rperiods.thresholds();

    let mut records = Vec::with_capacity(span_days as usize + 1);
    for day in 0..=span_days {
        let window_start = first + Duration::days(day);
        let window_end = first + Duration::days(day + 1);

        // Members whose window maximum strictly exceeds each threshold.
        let mut counts = [0usize; 6];
        for member in &forecast.members {
            let window_max = forecast
                .timestamps
                .iter()
                .zip(member.values.iter())
                .filter(|(t, _)| **t >= window_start && **t <= window_end)
                .filter_map(|(_, v)| *v)
                .fold(None::<f64>, |acc, v| {
                    Some(acc.map_or(v, |m| m.max(v)))
                });
            let Some(member_max) = window_max else {
                continue;
            };
            for (slot, (_, threshold)) in thresholds.iter().enumerate() {
                if member_max > *threshold {
                    counts[slot] += 1;
                }
            }
        }

        records.push(DailyExceedanceRecord {
            window_start,
            rp_2_pct: exceedance_pct(counts[0]),
            rp_5_pct: exceedance_pct(counts[1]),
            rp_10_pct: exceedance_pct(counts[2]),
            rp_25_pct: exceedance_pct(counts[3]),
            rp_50_pct: exceedance_pct(counts[4]),
            rp_100_pct: exceedance_pct(counts[5]),
        });
    }

    Ok(records)
}

/// Escalation rule over the horizon's daily records: a level is flagged if
/// any day reaches `FLAG_THRESHOLD_PCT` for it; the alarm is the HIGHEST
/// flagged level. Levels are evaluated lowest to highest without early exit,
/// so the result is the maximum flagged severity, not the first.
pub fn escalate(records: &[DailyExceedanceRecord]) -> AlarmLevel {
    let mut alarm = AlarmLevel::R0;
    for level in WARNING_LEVELS {
        let flagged = records
            .iter()
            .any(|r| r.percent(level) >= FLAG_THRESHOLD_PCT);
        if flagged {
            alarm = level;
        }
    }
    alarm
}

/// Full classification for one (reach, date): daily exceedance followed by
/// escalation. Pure; no side effects beyond the returned value.
pub fn classify(
    forecast: &EnsembleForecast,
    rperiods: &ReturnPeriodTable,
) -> Result<AlarmLevel, AnalysisError> {
    let records = daily_exceedance(forecast, rperiods)?;
    Ok(escalate(&records))
}
