//! Interval building and the single-tolerance rule.
//!
//! This module pairs a day's entries positionally into [`WorkInterval`]s,
//! measures the pauses between them, picks the day's primary pause and
//! applies break tolerance to that pause only.

use chrono::{NaiveDateTime, NaiveTime};

use crate::models::{TimeEntry, WorkInterval};

/// Break parameters driving pause evaluation for one day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BreakRules {
    /// Minimum length of the main break.
    pub minimum_break_minutes: i64,
    /// Overrun of the main break forgiven by tolerance.
    pub tolerance_minutes: i64,
    /// Ideal break start used to select the primary pause.
    pub ideal_break_start: Option<NaiveTime>,
}

/// True when a raw pause lies within the tolerance window
/// `[minimum, minimum + tolerance]`.
pub fn is_tolerance_eligible(raw_pause_minutes: i64, rules: &BreakRules) -> bool {
    raw_pause_minutes >= rules.minimum_break_minutes
        && raw_pause_minutes <= rules.minimum_break_minutes + rules.tolerance_minutes
}

/// Builds the ordered intervals of one day.
///
/// Entries are paired positionally as (0,1), (2,3), ... without regard to
/// direction; an unmatched trailing entry yields an open interval. The
/// primary pause is the pause of at least `minimum_break_minutes` whose
/// start is closest to `ideal_break_start` (earliest on ties), or the first
/// such pause when no ideal time is set. Only the primary pause may be
/// shortened by tolerance, and only when it is eligible; the minutes
/// forgiven are credited to the interval that follows it.
///
/// The credit is intentional: a forgiven overrun counts as worked time, so
/// closed durations sum to elapsed time minus the considered pauses, not
/// the raw ones.
///
/// # Arguments
///
/// * `entries` - The day's entries sorted by timestamp
/// * `rules` - Break minimum, tolerance and ideal break start
///
/// # Examples
///
/// ```
/// use timeclock_engine::calculation::{BreakRules, build_intervals};
/// use timeclock_engine::models::{Direction, TimeEntry};
/// use chrono::NaiveDateTime;
///
/// let at = |s: &str| NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M").unwrap();
/// let entries = vec![
///     TimeEntry::new("acme", at("2026-01-15 08:00"), Direction::In),
///     TimeEntry::new("acme", at("2026-01-15 12:00"), Direction::Out),
///     TimeEntry::new("acme", at("2026-01-15 13:10"), Direction::In),
///     TimeEntry::new("acme", at("2026-01-15 17:00"), Direction::Out),
/// ];
/// let rules = BreakRules {
///     minimum_break_minutes: 60,
///     tolerance_minutes: 15,
///     ideal_break_start: None,
/// };
///
/// let intervals = build_intervals(&entries, &rules);
/// assert_eq!(intervals.len(), 2);
/// assert_eq!(intervals[1].pause_before_minutes, Some(70));
/// assert_eq!(intervals[1].pause_considered_minutes, Some(60));
/// assert_eq!(intervals[1].duration_minutes, Some(240)); // 230 + 10 credit
/// ```
pub fn build_intervals(entries: &[TimeEntry], rules: &BreakRules) -> Vec<WorkInterval> {
    let pairs: Vec<(&TimeEntry, Option<&TimeEntry>)> = entries
        .chunks(2)
        .map(|chunk| (&chunk[0], chunk.get(1)))
        .collect();

    // Raw pause before each pair; the first pair has none.
    let pauses: Vec<Option<(NaiveDateTime, i64)>> = pairs
        .iter()
        .enumerate()
        .map(|(index, (entry_in, _))| {
            if index == 0 {
                return None;
            }
            pairs[index - 1].1.map(|previous_out| {
                let raw = (entry_in.timestamp - previous_out.timestamp).num_minutes();
                (previous_out.timestamp, raw)
            })
        })
        .collect();

    let primary = select_primary_pause(&pauses, rules);

    pairs
        .iter()
        .enumerate()
        .map(|(index, (entry_in, entry_out))| {
            let raw_pause = pauses[index].map(|(_, raw)| raw);
            let is_primary_pause = primary == Some(index);
            let considered_pause = raw_pause.map(|raw| {
                if is_primary_pause && is_tolerance_eligible(raw, rules) {
                    rules.minimum_break_minutes
                } else {
                    raw
                }
            });
            let tolerance_credit_minutes = match (raw_pause, considered_pause) {
                (Some(raw), Some(considered)) => raw - considered,
                _ => 0,
            };
            let duration_minutes = entry_out.map(|out| {
                (out.timestamp - entry_in.timestamp).num_minutes() + tolerance_credit_minutes
            });

            WorkInterval {
                entry_in: (*entry_in).clone(),
                entry_out: entry_out.cloned(),
                duration_minutes,
                pause_before_minutes: raw_pause,
                pause_considered_minutes: considered_pause,
                is_primary_pause,
                tolerance_credit_minutes,
                open: entry_out.is_none(),
            }
        })
        .collect()
}

/// Index of the interval whose preceding pause is primary.
fn select_primary_pause(
    pauses: &[Option<(NaiveDateTime, i64)>],
    rules: &BreakRules,
) -> Option<usize> {
    let candidates = pauses.iter().enumerate().filter_map(|(index, pause)| {
        (*pause)
            .filter(|(_, raw)| *raw >= rules.minimum_break_minutes)
            .map(|(start, _)| (index, start))
    });

    match rules.ideal_break_start {
        Some(ideal) => candidates
            .min_by_key(|(index, start)| {
                let distance = (start.time() - ideal).num_minutes().abs();
                (distance, *index)
            })
            .map(|(index, _)| index),
        None => candidates.map(|(index, _)| index).next(),
    }
}

/// Sum of closed interval durations.
pub fn closed_worked_minutes(intervals: &[WorkInterval]) -> i64 {
    intervals.iter().filter_map(|i| i.duration_minutes).sum()
}

/// Elapsed minutes of the open interval at `now`, credit included.
///
/// Returns `None` when no interval is open; never negative.
pub fn in_progress_minutes(intervals: &[WorkInterval], now: NaiveDateTime) -> Option<i64> {
    intervals.iter().find(|i| i.open).map(|open| {
        let elapsed = (now - open.entry_in.timestamp).num_minutes();
        (elapsed + open.tolerance_credit_minutes).max(0)
    })
}

/// The length of the break used for the insufficient-break check: the
/// primary pause as considered, or else the longest raw pause.
pub fn main_break_minutes(intervals: &[WorkInterval]) -> Option<i64> {
    intervals
        .iter()
        .find(|i| i.is_primary_pause)
        .and_then(|i| i.pause_considered_minutes)
        .or_else(|| intervals.iter().filter_map(|i| i.pause_before_minutes).max())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Direction;

    fn make_datetime(date_str: &str, time_str: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(&format!("{} {}", date_str, time_str), "%Y-%m-%d %H:%M:%S")
            .unwrap()
    }

    fn make_time(time_str: &str) -> NaiveTime {
        NaiveTime::parse_from_str(time_str, "%H:%M:%S").unwrap()
    }

    fn day(times: &[&str]) -> Vec<TimeEntry> {
        times
            .iter()
            .enumerate()
            .map(|(i, t)| {
                let direction = if i % 2 == 0 {
                    Direction::In
                } else {
                    Direction::Out
                };
                TimeEntry::new("acme", make_datetime("2026-01-15", t), direction)
            })
            .collect()
    }

    fn rules(ideal: Option<&str>) -> BreakRules {
        BreakRules {
            minimum_break_minutes: 60,
            tolerance_minutes: 15,
            ideal_break_start: ideal.map(make_time),
        }
    }

    /// IB-001: zero entries yield no intervals
    #[test]
    fn test_ib_001_no_entries() {
        assert!(build_intervals(&[], &rules(None)).is_empty());
    }

    /// IB-002: a single IN yields one open interval
    #[test]
    fn test_ib_002_single_in_is_open() {
        let intervals = build_intervals(&day(&["08:00:00"]), &rules(None));
        assert_eq!(intervals.len(), 1);
        assert!(intervals[0].open);
        assert_eq!(intervals[0].duration_minutes, None);
        assert_eq!(intervals[0].pause_before_minutes, None);
    }

    /// IB-003: exact minimum pause keeps its length
    #[test]
    fn test_ib_003_exact_minimum_pause() {
        let intervals = build_intervals(
            &day(&["08:00:00", "12:00:00", "13:00:00", "17:12:00"]),
            &rules(None),
        );
        assert_eq!(intervals[1].pause_before_minutes, Some(60));
        assert_eq!(intervals[1].pause_considered_minutes, Some(60));
        assert!(intervals[1].is_primary_pause);
        assert_eq!(closed_worked_minutes(&intervals), 492);
    }

    /// IB-004: a pause below the minimum is never primary nor tolerated
    #[test]
    fn test_ib_004_short_pause_not_eligible() {
        let intervals = build_intervals(
            &day(&["08:00:00", "12:00:00", "12:50:00", "17:12:00"]),
            &rules(None),
        );
        assert!(!intervals[1].is_primary_pause);
        assert_eq!(intervals[1].pause_considered_minutes, Some(50));
        assert_eq!(intervals[1].tolerance_credit_minutes, 0);
        assert_eq!(closed_worked_minutes(&intervals), 502);
    }

    /// IB-005: a pause past the tolerance window keeps its raw length
    #[test]
    fn test_ib_005_pause_beyond_tolerance() {
        let intervals = build_intervals(
            &day(&["08:00:00", "12:00:00", "13:20:00", "17:00:00"]),
            &rules(None),
        );
        assert!(intervals[1].is_primary_pause);
        assert_eq!(intervals[1].pause_considered_minutes, Some(80));
        assert_eq!(intervals[1].duration_minutes, Some(220));
    }

    /// IB-006: upper edge of the tolerance window is still eligible
    #[test]
    fn test_ib_006_upper_edge_eligible() {
        let intervals = build_intervals(
            &day(&["08:00:00", "12:00:00", "13:15:00", "17:00:00"]),
            &rules(None),
        );
        assert_eq!(intervals[1].pause_considered_minutes, Some(60));
        assert_eq!(intervals[1].tolerance_credit_minutes, 15);
        assert_eq!(intervals[1].duration_minutes, Some(240));
    }

    /// IB-007: only the pause closest to the ideal start gets tolerance
    #[test]
    fn test_ib_007_ideal_time_picks_primary() {
        // Pauses: 10:00-11:05 (65) and 12:30-13:40 (70); ideal 12:00
        let entries = day(&[
            "08:00:00", "10:00:00", "11:05:00", "12:30:00", "13:40:00", "17:00:00",
        ]);
        let intervals = build_intervals(&entries, &rules(Some("12:00:00")));

        assert!(!intervals[1].is_primary_pause);
        assert_eq!(intervals[1].pause_considered_minutes, Some(65));
        assert!(intervals[2].is_primary_pause);
        assert_eq!(intervals[2].pause_considered_minutes, Some(60));
        assert_eq!(
            intervals.iter().filter(|i| i.tolerance_credit_minutes > 0).count(),
            1
        );
    }

    /// IB-008: without an ideal time the first qualifying pause is primary
    #[test]
    fn test_ib_008_first_qualifying_pause_without_ideal() {
        let entries = day(&[
            "08:00:00", "09:00:00", "09:20:00", "12:00:00", "13:10:00", "17:00:00",
        ]);
        let intervals = build_intervals(&entries, &rules(None));
        assert!(!intervals[1].is_primary_pause); // 20 minutes, too short
        assert!(intervals[2].is_primary_pause);
        assert_eq!(intervals[2].tolerance_credit_minutes, 10);
    }

    /// IB-009: equidistant pauses resolve to the earlier one
    #[test]
    fn test_ib_009_tie_goes_to_earlier_pause() {
        // Pause starts 11:00 and 13:00, ideal 12:00
        let entries = day(&[
            "08:00:00", "11:00:00", "12:05:00", "13:00:00", "14:05:00", "17:00:00",
        ]);
        let intervals = build_intervals(&entries, &rules(Some("12:00:00")));
        assert!(intervals[1].is_primary_pause);
        assert!(!intervals[2].is_primary_pause);
    }

    #[test]
    fn test_non_alternating_entries_pair_positionally() {
        let entries = vec![
            TimeEntry::new("acme", make_datetime("2026-01-15", "08:00:00"), Direction::In),
            TimeEntry::new("acme", make_datetime("2026-01-15", "09:00:00"), Direction::In),
        ];
        let intervals = build_intervals(&entries, &rules(None));
        assert_eq!(intervals.len(), 1);
        assert_eq!(intervals[0].duration_minutes, Some(60));
    }

    #[test]
    fn test_in_progress_minutes_for_open_interval() {
        let intervals = build_intervals(&day(&["08:00:00", "12:00:00", "13:10:00"]), &rules(None));
        let now = make_datetime("2026-01-15", "15:10:00");
        // 120 elapsed + 10 tolerance credit
        assert_eq!(in_progress_minutes(&intervals, now), Some(130));
        assert_eq!(closed_worked_minutes(&intervals), 240);
    }

    #[test]
    fn test_main_break_falls_back_to_longest_pause() {
        let entries = day(&[
            "08:00:00", "10:00:00", "10:30:00", "12:00:00", "12:40:00", "17:00:00",
        ]);
        let intervals = build_intervals(&entries, &rules(None));
        assert_eq!(main_break_minutes(&intervals), Some(40));
    }
}
