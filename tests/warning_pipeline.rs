/// Integration tests for the warning pipeline.
///
/// These tests exercise the full chain the study runner drives for one
/// reach, without touching disk or network:
///
///   annual maxima → return-period table
///   forecast CSV → parse → classify → daily alarm
///   alarm series → events → per-reach summary
///
/// Run with: cargo test --test warning_pipeline

use chrono::NaiveDate;
use glowarn_service::analysis::events::{extract_events, summarize_events};
use glowarn_service::analysis::return_periods::estimate_return_periods;
use glowarn_service::analysis::warnings::classify;
use glowarn_service::ingest::forecast::parse_forecast_csv;
use glowarn_service::model::{AlarmLevel, ReturnPeriodTable, WARNING_LEVELS};

/// Renders a 52-member single-day forecast CSV where the first `n_hot`
/// members peak at `hot_value` and the rest hold a low baseline.
fn forecast_csv(date: &str, n_hot: usize, hot_value: f64) -> String {
    let mut header = String::from("datetime");
    for member in 1..=52 {
        header.push_str(&format!(",ensemble_{:02}", member));
    }

    let row = |hour: u32, hot: bool| {
        let mut line = format!("{} {:02}:00:00", date, hour);
        for member in 1..=52 {
            let value = if hot && member <= n_hot { hot_value } else { 40.0 };
            line.push_str(&format!(",{}", value));
        }
        line
    };

    format!(
        "{}\n{}\n{}\n{}\n",
        header,
        row(0, false),
        row(12, true),
        row(18, false)
    )
}

/// Thresholds fit from a spread of annual maxima; used by every scenario.
fn fitted_table() -> ReturnPeriodTable {
    let maxima = [120.0, 180.0, 95.0, 210.0, 160.0, 140.0, 250.0, 130.0];
    estimate_return_periods(9004355, &maxima).expect("fit should succeed")
}

#[test]
fn test_fitted_thresholds_are_ordered_and_reusable() {
    let table = fitted_table();
    let thresholds = table.thresholds();
    for pair in thresholds.windows(2) {
        assert!(
            pair[1].1 >= pair[0].1,
            "threshold for {} must not be below {}",
            pair[1].0,
            pair[0].0
        );
    }
    // The table is a plain value: reuse across dates must not change it.
    assert_eq!(table, fitted_table());
}

#[test]
fn test_csv_to_alarm_r10_scenario() {
    let table = fitted_table();
    // 25 hot members just above the R10 threshold: round(25*100/52) = 48
    // flags R2/R5/R10 and nothing higher.
    let hot = table.threshold(AlarmLevel::R10) + 1.0;
    let csv = forecast_csv("2014-06-01", 25, hot);

    let forecast = parse_forecast_csv(9004355, &csv).expect("forecast should parse");
    assert_eq!(forecast.members.len(), 52);
    assert_eq!(forecast.missing_members(), 0);

    let alarm = classify(&forecast, &table).expect("classification should succeed");
    assert_eq!(alarm, AlarmLevel::R10);
}

#[test]
fn test_csv_to_alarm_quiet_day_is_r0() {
    let table = fitted_table();
    let csv = forecast_csv("2014-06-02", 0, 0.0);
    let forecast = parse_forecast_csv(9004355, &csv).expect("forecast should parse");
    assert_eq!(classify(&forecast, &table).unwrap(), AlarmLevel::R0);
}

#[test]
fn test_scaling_every_member_never_lowers_the_alarm() {
    let table = fitted_table();
    let hot = table.threshold(AlarmLevel::R50) + 1.0;
    let csv = forecast_csv("2014-06-03", 30, hot);
    let forecast = parse_forecast_csv(9004355, &csv).unwrap();
    let baseline = classify(&forecast, &table).unwrap();
    assert_eq!(baseline, AlarmLevel::R50);

    let mut scaled = forecast.clone();
    for member in &mut scaled.members {
        for value in member.values.iter_mut().flatten() {
            *value *= 1.5;
        }
    }
    let after = classify(&scaled, &table).unwrap();
    assert!(after >= baseline, "scaled alarm {} below baseline {}", after, baseline);
}

#[test]
fn test_daily_alarms_to_events_to_summary() {
    let table = fitted_table();
    let r10_hot = table.threshold(AlarmLevel::R10) + 1.0;
    let r25_hot = table.threshold(AlarmLevel::R25) + 1.0;

    // Seven issuance dates: quiet, quiet, R5-ish, R10, quiet, quiet, R25.
    // (The R5 day uses 25 members above the R5 threshold only.)
    let r5_hot = table.threshold(AlarmLevel::R5) + 1.0;
    let plan: [(u32, usize, f64); 7] = [
        (1, 0, 0.0),
        (2, 0, 0.0),
        (3, 25, r5_hot),
        (4, 25, r10_hot),
        (5, 0, 0.0),
        (6, 0, 0.0),
        (7, 25, r25_hot),
    ];

    let mut series = Vec::new();
    for (day, n_hot, hot) in plan {
        let date = NaiveDate::from_ymd_opt(2014, 6, day).unwrap();
        let csv = forecast_csv(&format!("2014-06-{:02}", day), n_hot, hot);
        let forecast = parse_forecast_csv(9004355, &csv).unwrap();
        let alarm = classify(&forecast, &table).unwrap();
        series.push((date, alarm));
    }

    assert_eq!(
        series.iter().map(|(_, a)| *a).collect::<Vec<_>>(),
        vec![
            AlarmLevel::R0,
            AlarmLevel::R0,
            AlarmLevel::R5,
            AlarmLevel::R10,
            AlarmLevel::R0,
            AlarmLevel::R0,
            AlarmLevel::R25,
        ]
    );

    let events = extract_events(9004355, &series);
    assert_eq!(events.len(), 2);
    assert_eq!(events[0].start, NaiveDate::from_ymd_opt(2014, 6, 3).unwrap());
    assert_eq!(events[0].end, NaiveDate::from_ymd_opt(2014, 6, 4).unwrap());
    assert_eq!(events[0].peak, AlarmLevel::R10);
    assert_eq!(events[1].start, NaiveDate::from_ymd_opt(2014, 6, 7).unwrap());
    assert_eq!(events[1].peak, AlarmLevel::R25);

    let summary = summarize_events(9004355, &events);
    assert_eq!(summary.rp_10, 1);
    assert_eq!(summary.rp_25, 1);
    assert_eq!(summary.total(), events.len() as u32);
    for level in WARNING_LEVELS {
        if level != AlarmLevel::R10 && level != AlarmLevel::R25 {
            assert_eq!(summary.count(level), 0, "{} should have no events", level);
        }
    }
}
