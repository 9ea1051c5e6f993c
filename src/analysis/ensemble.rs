/// Ensemble statistics aggregation: per-timestep summary quantiles over the
/// perturbed members plus the isolated high-resolution trace.
///
/// This output is descriptive only — reporting and plotting. The warning
/// classifier deliberately does NOT consume it: classification runs off the
/// raw ensemble matrix with different cleaning rules (see
/// `analysis::warnings`), and the two must not be conflated.
///
/// Cleaning rules here:
/// - The high-resolution member is removed before any quantile is computed.
/// - A timestep contributes a statistics row only if EVERY perturbed member
///   has a value there (complete-row rule).
/// - The high-resolution trace is cleaned separately: its own missing
///   timestamps are dropped, independent of the perturbed members.

use chrono::NaiveDateTime;

use crate::model::{AnalysisError, EnsembleForecast, HIGH_RES_MEMBER};

/// One complete-row summary of the perturbed members at a timestep.
#[derive(Debug, Clone, PartialEq)]
pub struct StatRow {
    pub timestamp: NaiveDateTime,
    pub flow_max: f64,
    pub flow_75: f64,
    pub flow_avg: f64,
    pub flow_25: f64,
    pub flow_min: f64,
}

/// Quantile summary of an ensemble forecast: complete rows over the
/// perturbed members, plus the separately-cleaned high-resolution series.
#[derive(Debug, Clone, PartialEq)]
pub struct EnsembleStatistics {
    pub rows: Vec<StatRow>,
    pub high_res: Vec<(NaiveDateTime, f64)>,
}

/// Linear-interpolation quantile over an ascending-sorted slice, matching
/// the numpy/pandas default. `p` in [0, 1]; the slice must be non-empty.
fn quantile_sorted(sorted: &[f64], p: f64) -> f64 {
    let n = sorted.len();
    if n == 1 {
        return sorted[0];
    }
    let h = (n - 1) as f64 * p;
    let lo = h.floor() as usize;
    let hi = h.ceil() as usize;
    if lo == hi {
        sorted[lo]
    } else {
        sorted[lo] + (sorted[hi] - sorted[lo]) * (h - lo as f64)
    }
}

/// Computes the descriptive statistics for one reach/date forecast.
///
/// # Errors
/// `AnalysisError::EmptyEnsemble` if the high-resolution member is absent or
/// no perturbed members remain after removing it.
pub fn ensemble_statistics(
    forecast: &EnsembleForecast,
) -> Result<EnsembleStatistics, AnalysisError> {
    let high_res_trace = forecast.high_res().ok_or_else(|| {
        AnalysisError::EmptyEnsemble(format!(
            "reach {}: high-resolution member {} absent",
            forecast.reach_id, HIGH_RES_MEMBER
        ))
    })?;

    let perturbed: Vec<_> = forecast
        .members
        .iter()
        .filter(|m| m.member != HIGH_RES_MEMBER)
        .collect();
    if perturbed.is_empty() {
        return Err(AnalysisError::EmptyEnsemble(format!(
            "reach {}: no perturbed members",
            forecast.reach_id
        )));
    }

    let mut rows = Vec::with_capacity(forecast.timestamps.len());
    let mut values = Vec::with_capacity(perturbed.len());
    for (idx, &timestamp) in forecast.timestamps.iter().enumerate() {
        values.clear();
        // Complete-row rule: any missing perturbed value drops the timestep.
        let mut complete = true;
        for member in &perturbed {
            match member.values.get(idx).copied().flatten() {
                Some(v) => values.push(v),
                None => {
                    complete = false;
                    break;
                }
            }
        }
        if !complete {
            continue;
        }
        values.sort_by(|a, b| a.total_cmp(b));
        rows.push(StatRow {
            timestamp,
            flow_max: quantile_sorted(&values, 1.00),
            flow_75: quantile_sorted(&values, 0.75),
            flow_avg: quantile_sorted(&values, 0.50),
            flow_25: quantile_sorted(&values, 0.25),
            flow_min: quantile_sorted(&values, 0.00),
        });
    }

    let high_res = forecast
        .timestamps
        .iter()
        .zip(high_res_trace.values.iter())
        .filter_map(|(&t, v)| v.map(|v| (t, v)))
        .collect();

    Ok(EnsembleStatistics { rows, high_res })
}
