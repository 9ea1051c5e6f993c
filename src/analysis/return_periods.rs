/// Gumbel Type I return-period estimation from annual maximum discharge.
///
/// The GeoGLOWS warning system ties each alarm level to the discharge
/// expected to recur every {2, 5, 10, 25, 50, 100} years. Those thresholds
/// are fit by method of moments on the annual maxima of the reach's
/// historical simulation:
///
///   threshold(rp) = -ln(-ln(1 - 1/rp)) * std * 0.7797 + xbar - 0.45 * std
///
/// where `xbar` is the sample mean and `std` the POPULATION standard
/// deviation (denominator N, not N-1) of the annual maxima. With fewer than
/// two distinct values `std` is 0 and every threshold collapses to `xbar` —
/// a defined degenerate case, not an error.
///
/// Tables are deterministic and cheap to reuse: the runner computes one per
/// reach and shares it across every forecast date.

use chrono::{Datelike, NaiveDateTime};
use std::collections::BTreeMap;

use crate::model::{AnalysisError, ReachId, ReturnPeriodTable};

/// Return periods in the order the original threshold table is built
/// (descending; the struct fields are named, so order only matters here).
const RETURN_PERIODS: [u32; 6] = [100, 50, 25, 10, 5, 2];

/// Gumbel Type I threshold for one return period, method of moments.
pub fn gumbel_type1(std: f64, xbar: f64, rp: u32) -> f64 {
    -(-(1.0 - 1.0 / rp as f64).ln()).ln() * std * 0.7797 + xbar - 0.45 * std
}

/// Reduces an irregular historical (timestamp, discharge) series to one
/// maximum per calendar year. Years are keyed by calendar year of the
/// timestamp; cadence and gaps within a year are irrelevant.
pub fn annual_maxima(series: &[(NaiveDateTime, f64)]) -> BTreeMap<i32, f64> {
    let mut maxima: BTreeMap<i32, f64> = BTreeMap::new();
    for &(timestamp, discharge) in series {
        let year = timestamp.year();
        maxima
            .entry(year)
            .and_modify(|m| {
                if discharge > *m {
                    *m = discharge;
                }
            })
            .or_insert(discharge);
    }
    maxima
}

/// Fits the six-entry return-period table for one reach from its annual
/// maxima values.
///
/// # Errors
/// `AnalysisError::InvalidInput` if `maxima` is empty (mean undefined).
pub fn estimate_return_periods(
    reach_id: ReachId,
    maxima: &[f64],
) -> Result<ReturnPeriodTable, AnalysisError> {
    if maxima.is_empty() {
        return Err(AnalysisError::InvalidInput(format!(
            "reach {}: no annual maxima to fit",
            reach_id
        )));
    }

    let n = maxima.len() as f64;
    let xbar = maxima.iter().sum::<f64>() / n;
    // Population standard deviation (denominator N).
    let variance = maxima.iter().map(|x| (x - xbar).powi(2)).sum::<f64>() / n;
    let std = variance.sqrt();

    let mut thresholds = [0.0f64; 6];
    for (slot, rp) in RETURN_PERIODS.iter().enumerate() {
        thresholds[slot] = gumbel_type1(std, xbar, *rp);
    }

    Ok(ReturnPeriodTable {
        reach_id,
        return_period_100: thresholds[0],
        return_period_50: thresholds[1],
        return_period_25: thresholds[2],
        return_period_10: thresholds[3],
        return_period_5: thresholds[4],
        return_period_2: thresholds[5],
    })
}

/// Convenience: historical series → annual maxima → fitted table.
pub fn table_from_history(
    reach_id: ReachId,
    series: &[(NaiveDateTime, f64)],
) -> Result<ReturnPeriodTable, AnalysisError> {
    let maxima: Vec<f64> = annual_maxima(series).into_values().collect();
    estimate_return_periods(reach_id, &maxima)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn ts(year: i32, month: u32, day: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(year, month, day)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_empty_maxima_is_invalid_input() {
        let result = estimate_return_periods(9004355, &[]);
        assert!(matches!(result, Err(AnalysisError::InvalidInput(_))));
    }

    #[test]
    fn test_zero_std_degenerates_all_thresholds_to_mean() {
        // [100, 100, 100]: std = 0, xbar = 100 → every threshold exactly 100.
        let table = estimate_return_periods(9004355, &[100.0, 100.0, 100.0]).unwrap();
        for (level, threshold) in table.thresholds() {
            assert_eq!(threshold, 100.0, "{} should equal the mean", level);
        }
    }

    #[test]
    fn test_single_value_behaves_like_zero_std() {
        let table = estimate_return_periods(1, &[42.5]).unwrap();
        for (_, threshold) in table.thresholds() {
            assert_eq!(threshold, 42.5);
        }
    }

    #[test]
    fn test_thresholds_non_decreasing_in_return_period() {
        let maxima = [310.0, 455.0, 298.0, 512.0, 387.0, 441.0, 270.0];
        let table = estimate_return_periods(1, &maxima).unwrap();
        let ordered = table.thresholds();
        for pair in ordered.windows(2) {
            assert!(
                pair[1].1 >= pair[0].1,
                "{} threshold ({}) should be >= {} threshold ({})",
                pair[1].0,
                pair[1].1,
                pair[0].0,
                pair[0].1
            );
        }
    }

    #[test]
    fn test_gumbel_factor_increases_with_return_period() {
        // With std = 1, xbar = 0 the formula reduces to the Gumbel factor
        // -ln(-ln(1 - 1/rp)) * 0.7797 - 0.45, which must grow with rp.
        let mut previous = f64::NEG_INFINITY;
        for rp in [2, 5, 10, 25, 50, 100] {
            let value = gumbel_type1(1.0, 0.0, rp);
            assert!(value > previous, "factor must increase at rp={}", rp);
            previous = value;
        }
    }

    #[test]
    fn test_population_std_uses_n_denominator() {
        // maxima [10, 20]: xbar = 15, population std = 5 (sample std would
        // be ~7.07). threshold(2) = -ln(-ln(0.5)) * 5 * 0.7797 + 15 - 2.25.
        let table = estimate_return_periods(1, &[10.0, 20.0]).unwrap();
        let expected = -(-(0.5f64.ln())).ln() * 5.0 * 0.7797 + 15.0 - 0.45 * 5.0;
        assert!((table.return_period_2 - expected).abs() < 1e-12);
    }

    #[test]
    fn test_annual_maxima_groups_by_calendar_year() {
        let series = vec![
            (ts(2010, 3, 1), 120.0),
            (ts(2010, 7, 15), 340.0),
            (ts(2010, 11, 2), 95.0),
            (ts(2011, 2, 28), 210.0),
            (ts(2011, 6, 1), 180.0),
        ];
        let maxima = annual_maxima(&series);
        assert_eq!(maxima.len(), 2);
        assert_eq!(maxima[&2010], 340.0);
        assert_eq!(maxima[&2011], 210.0);
    }

    #[test]
    fn test_table_from_history_end_to_end() {
        let series = vec![
            (ts(2010, 5, 1), 300.0),
            (ts(2011, 5, 1), 300.0),
            (ts(2012, 5, 1), 300.0),
        ];
        let table = table_from_history(7, &series).unwrap();
        assert_eq!(table.reach_id, 7);
        assert_eq!(table.return_period_100, 300.0);
    }
}
