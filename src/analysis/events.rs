/// Flood event segmentation and per-reach summarization.
///
/// Once every issuance date in the study period has been classified, each
/// reach has a chronological daily alarm series. This module groups the
/// non-zero days of that series into discrete events and tabulates event
/// counts per peak severity.
///
/// An event is a maximal contiguous run of dates with alarm level above
/// `R0`: it opens when severity transitions from zero to non-zero (the day
/// before the series counts as zero), stays open while severity fluctuates
/// without touching zero, and closes on the first `R0` day. Extraction is
/// pure and idempotent — the same series always yields the same events.

use chrono::NaiveDate;

use crate::model::{AlarmLevel, Event, ReachId, WARNING_LEVELS};

// ---------------------------------------------------------------------------
// Event extraction
// ---------------------------------------------------------------------------

/// Segments a chronological (date, alarm) series into events.
///
/// The series is expected contiguous (one entry per date, no gaps); dates at
/// `R0` belong to no event and are absent from the output.
pub fn extract_events(reach_id: ReachId, series: &[(NaiveDate, AlarmLevel)]) -> Vec<Event> {
    let mut events = Vec::new();
    let mut current: Option<Event> = None;

    for &(date, level) in series {
        if level == AlarmLevel::R0 {
            // A zero day closes any open run.
            if let Some(event) = current.take() {
                events.push(event);
            }
        } else {
            match current.as_mut() {
                Some(event) => {
                    event.end = date;
                    if level > event.peak {
                        event.peak = level;
                    }
                }
                None => {
                    current = Some(Event {
                        reach_id,
                        start: date,
                        end: date,
                        peak: level,
                    });
                }
            }
        }
    }
    if let Some(event) = current {
        events.push(event);
    }
    events
}

// ---------------------------------------------------------------------------
// Per-reach summary
// ---------------------------------------------------------------------------

/// Event counts per peak severity for one reach. Levels with no events are
/// reported as 0, never omitted, so cross-reach tables stay rectangular.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReachEventSummary {
    pub reach_id: ReachId,
    pub rp_2: u32,
    pub rp_5: u32,
    pub rp_10: u32,
    pub rp_25: u32,
    pub rp_50: u32,
    pub rp_100: u32,
}

impl ReachEventSummary {
    pub fn empty(reach_id: ReachId) -> Self {
        Self {
            reach_id,
            rp_2: 0,
            rp_5: 0,
            rp_10: 0,
            rp_25: 0,
            rp_50: 0,
            rp_100: 0,
        }
    }

    /// Count for a given warning level. Panics on `R0`, which cannot be an
    /// event peak.
    pub fn count(&self, level: AlarmLevel) -> u32 {
        match level {
            AlarmLevel::R0 => unreachable!("R0 cannot be an event peak"),
            AlarmLevel::R2 => self.rp_2,
            AlarmLevel::R5 => self.rp_5,
            AlarmLevel::R10 => self.rp_10,
            AlarmLevel::R25 => self.rp_25,
            AlarmLevel::R50 => self.rp_50,
            AlarmLevel::R100 => self.rp_100,
        }
    }

    fn increment(&mut self, level: AlarmLevel) {
        match level {
            AlarmLevel::R0 => {}
            AlarmLevel::R2 => self.rp_2 += 1,
            AlarmLevel::R5 => self.rp_5 += 1,
            AlarmLevel::R10 => self.rp_10 += 1,
            AlarmLevel::R25 => self.rp_25 += 1,
            AlarmLevel::R50 => self.rp_50 += 1,
            AlarmLevel::R100 => self.rp_100 += 1,
        }
    }

    /// Total events across all severities.
    pub fn total(&self) -> u32 {
        WARNING_LEVELS.iter().map(|&l| self.count(l)).sum()
    }
}

/// Tabulates events by exact peak severity ("equals", not "at least").
pub fn summarize_events(reach_id: ReachId, events: &[Event]) -> ReachEventSummary {
    let mut summary = ReachEventSummary::empty(reach_id);
    for event in events {
        summary.increment(event.peak);
    }
    summary
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(n: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2014, 1, n).unwrap()
    }

    fn series(levels: &[AlarmLevel]) -> Vec<(NaiveDate, AlarmLevel)> {
        levels
            .iter()
            .enumerate()
            .map(|(i, &l)| (day(i as u32 + 1), l))
            .collect()
    }

    #[test]
    fn test_scenario_two_events_with_peaks() {
        // [R0,R0,R5,R10,R0,R0,R25] → (day3..day4, peak R10), (day7, R25).
        use AlarmLevel::*;
        let events = extract_events(9004355, &series(&[R0, R0, R5, R10, R0, R0, R25]));
        assert_eq!(
            events,
            vec![
                Event {
                    reach_id: 9004355,
                    start: day(3),
                    end: day(4),
                    peak: R10
                },
                Event {
                    reach_id: 9004355,
                    start: day(7),
                    end: day(7),
                    peak: R25
                },
            ]
        );

        let summary = summarize_events(9004355, &events);
        assert_eq!(summary.rp_10, 1);
        assert_eq!(summary.rp_25, 1);
        assert_eq!(summary.rp_2, 0);
        assert_eq!(summary.rp_5, 0);
        assert_eq!(summary.rp_50, 0);
        assert_eq!(summary.rp_100, 0);
    }

    #[test]
    fn test_fluctuating_severity_is_one_event() {
        // Severity rises and falls but never hits zero: a single event
        // spanning the whole run with the maximum as peak.
        use AlarmLevel::*;
        let events = extract_events(1, &series(&[R0, R2, R50, R2, R10, R0]));
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].start, day(2));
        assert_eq!(events[0].end, day(5));
        assert_eq!(events[0].peak, R50);
    }

    #[test]
    fn test_series_opening_nonzero_starts_an_event() {
        use AlarmLevel::*;
        let events = extract_events(1, &series(&[R5, R5, R0]));
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].start, day(1));
        assert_eq!(events[0].end, day(2));
    }

    #[test]
    fn test_series_ending_nonzero_closes_at_last_date() {
        use AlarmLevel::*;
        let events = extract_events(1, &series(&[R0, R2, R2]));
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].end, day(3));
    }

    #[test]
    fn test_all_zero_series_yields_no_events() {
        use AlarmLevel::*;
        assert!(extract_events(1, &series(&[R0, R0, R0])).is_empty());
    }

    #[test]
    fn test_extraction_is_idempotent() {
        use AlarmLevel::*;
        let input = series(&[R0, R2, R0, R10, R10, R0, R100]);
        let first = extract_events(5, &input);
        let second = extract_events(5, &input);
        assert_eq!(first, second);
    }

    #[test]
    fn test_events_are_chronologically_ordered() {
        use AlarmLevel::*;
        let events = extract_events(1, &series(&[R2, R0, R5, R0, R10]));
        for pair in events.windows(2) {
            assert!(pair[0].end < pair[1].start);
        }
    }

    #[test]
    fn test_summary_total_equals_event_count() {
        use AlarmLevel::*;
        let events = extract_events(1, &series(&[R2, R0, R5, R0, R10, R0, R10]));
        let summary = summarize_events(1, &events);
        assert_eq!(summary.total(), events.len() as u32);
        assert_eq!(summary.rp_10, 2);
    }

    #[test]
    fn test_empty_summary_reports_zero_for_every_level() {
        let summary = summarize_events(3, &[]);
        for level in WARNING_LEVELS {
            assert_eq!(summary.count(level), 0);
        }
        assert_eq!(summary.total(), 0);
    }
}
