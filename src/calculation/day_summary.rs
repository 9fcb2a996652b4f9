//! Day summary calculation.
//!
//! This module combines interval building, special-day classification and
//! partial-day excuses into a [`DaySummary`]: worked minutes, effective
//! expectation, balance and the day status.

use chrono::{NaiveDate, NaiveDateTime};
use tracing::debug;

use crate::config::DayLimits;
use crate::error::EngineResult;
use crate::models::{
    Absence, AuditStep, DayStatus, DaySummary, Direction, ScheduleVersion, TimeEntry, WorkInterval,
};

use super::intervals::{
    BreakRules, build_intervals, closed_worked_minutes, in_progress_minutes, main_break_minutes,
};
use super::special_day::{SpecialDayClassification, classify_day};

/// Everything the engine needs to summarize one workspace day.
#[derive(Debug, Clone, Copy)]
pub struct DayInputs<'a> {
    /// The workspace of the day.
    pub workspace_id: &'a str,
    /// The calendar date.
    pub date: NaiveDate,
    /// The day's entries, in any order.
    pub entries: &'a [TimeEntry],
    /// The schedule version covering `date`.
    pub schedule: &'a ScheduleVersion,
    /// Absence markers that may cover `date`.
    pub absences: &'a [Absence],
    /// Day status limits.
    pub limits: &'a DayLimits,
}

/// True when entries alternate IN/OUT starting with IN.
pub fn is_sequence_valid(entries: &[TimeEntry]) -> bool {
    entries.iter().enumerate().all(|(index, entry)| {
        let expected = if index % 2 == 0 {
            Direction::In
        } else {
            Direction::Out
        };
        entry.direction == expected
    })
}

/// Computes the summary of a day, excluding any open interval's elapsed time.
///
/// An open shift leaves `balance_minutes` undefined here; use
/// [`compute_day_summary_with_in_progress`] for a provisional figure.
///
/// # Arguments
///
/// * `inputs` - Entries, schedule, absences and limits for the day
/// * `today` - The current date, which distinguishes `IN_PROGRESS` from
///   `INCOMPLETE`
///
/// # Returns
///
/// The day summary, or [`crate::error::EngineError::AmbiguousSpecialDay`]
/// when the absence markers leave the day type undefined.
pub fn compute_day_summary(inputs: &DayInputs<'_>, today: NaiveDate) -> EngineResult<DaySummary> {
    summarize(inputs, today, None)
}

/// Computes the summary of a day, counting the open interval up to `now`.
pub fn compute_day_summary_with_in_progress(
    inputs: &DayInputs<'_>,
    now: NaiveDateTime,
) -> EngineResult<DaySummary> {
    summarize(inputs, now.date(), Some(now))
}

fn summarize(
    inputs: &DayInputs<'_>,
    today: NaiveDate,
    now: Option<NaiveDateTime>,
) -> EngineResult<DaySummary> {
    let date = inputs.date;
    let mut audit_steps = Vec::new();

    // Step 1: Classify the day
    let classification = classify_day(date, inputs.absences)?;
    let day_config = inputs.schedule.day_config(date);
    let configured_expected = day_config.expected_minutes();
    let expected_minutes_effective = if classification.zeroes_expected_workload {
        0
    } else {
        configured_expected
    };
    audit_steps.push(classification_step(
        &classification,
        configured_expected,
        expected_minutes_effective,
    ));

    // Step 2: Pair entries and apply tolerance
    let mut entries = inputs.entries.to_vec();
    entries.sort_by_key(|e| e.timestamp);
    let rules = BreakRules {
        minimum_break_minutes: day_config.minimum_break_minutes,
        tolerance_minutes: day_config.tolerance_minutes,
        ideal_break_start: day_config.ideal_break_start,
    };
    let intervals = build_intervals(&entries, &rules);
    audit_steps.push(intervals_step(&intervals, &rules));

    // Step 3: Worked time and balance
    let entry_count = entries.len();
    let sequence_valid = is_sequence_valid(&entries);
    let has_open = intervals.last().is_some_and(|i| i.open);
    let worked_minutes = if !sequence_valid || (entry_count % 2 == 1 && date != today) {
        None
    } else {
        Some(closed_worked_minutes(&intervals))
    };
    let in_progress = match (worked_minutes, now) {
        (Some(_), Some(now)) => in_progress_minutes(&intervals, now),
        _ => None,
    };
    let excused_minutes = classification.excused_minutes;
    let balance_minutes = worked_minutes.and_then(|worked| {
        let counted = if has_open {
            worked + in_progress?
        } else {
            worked
        };
        Some(counted + excused_minutes - expected_minutes_effective)
    });
    audit_steps.push(AuditStep {
        step_number: 3,
        rule_id: "balance_calculation".to_string(),
        rule_name: "Day Balance Calculation".to_string(),
        input: serde_json::json!({
            "worked_minutes": worked_minutes,
            "in_progress_minutes": in_progress,
            "excused_minutes": excused_minutes,
            "expected_minutes_effective": expected_minutes_effective
        }),
        output: serde_json::json!({ "balance_minutes": balance_minutes }),
        reasoning: match balance_minutes {
            Some(balance) => format!(
                "{} worked + {} excused - {} expected = {} minutes",
                worked_minutes.unwrap_or(0) + in_progress.unwrap_or(0),
                excused_minutes,
                expected_minutes_effective,
                balance
            ),
            None => "Balance undefined: worked time cannot be derived yet".to_string(),
        },
    });

    // Step 4: Status
    let status = evaluate_status(
        &entries,
        &intervals,
        worked_minutes,
        inputs,
        &classification,
        expected_minutes_effective,
        today,
    );
    audit_steps.push(AuditStep {
        step_number: 4,
        rule_id: "status_evaluation".to_string(),
        rule_name: "Day Status Evaluation".to_string(),
        input: serde_json::json!({
            "entry_count": entry_count,
            "sequence_valid": sequence_valid,
            "is_today": date == today
        }),
        output: serde_json::json!({ "status": status }),
        reasoning: format!("{} entries evaluated to {:?}", entry_count, status),
    });

    debug!(
        workspace_id = %inputs.workspace_id,
        date = %date,
        status = ?status,
        worked_minutes = ?worked_minutes,
        balance_minutes = ?balance_minutes,
        "Day summary computed"
    );

    Ok(DaySummary {
        workspace_id: inputs.workspace_id.to_string(),
        date,
        day_type: classification.day_type,
        worked_minutes,
        in_progress_minutes: in_progress,
        expected_minutes_effective,
        excused_minutes,
        balance_minutes,
        status,
        intervals,
        audit_steps,
    })
}

/// Runs the status state machine; the first matching rule wins.
fn evaluate_status(
    entries: &[TimeEntry],
    intervals: &[WorkInterval],
    worked_minutes: Option<i64>,
    inputs: &DayInputs<'_>,
    classification: &SpecialDayClassification,
    expected_minutes_effective: i64,
    today: NaiveDate,
) -> DayStatus {
    let count = entries.len();
    if count == 0 {
        return if expected_minutes_effective == 0 {
            DayStatus::NonWorkingDay
        } else {
            DayStatus::NoRecords
        };
    }
    if count > inputs.limits.max_entries_per_day {
        return DayStatus::ExcessEntries;
    }
    if count % 2 == 1 {
        let single_open_in = count == 1 && entries[0].direction == Direction::In;
        return if single_open_in && inputs.date == today {
            DayStatus::InProgress
        } else {
            DayStatus::Incomplete
        };
    }
    if !is_sequence_valid(entries) {
        return DayStatus::SequenceInvalid;
    }
    if let (Some(worked), Some(max)) = (worked_minutes, inputs.schedule.max_daily_minutes) {
        if worked > max {
            return DayStatus::OvertimeExceeded;
        }
    }

    let minimum_break = inputs.schedule.day_config(inputs.date).minimum_break_minutes;
    if count >= 4 && !classification.zeroes_expected_workload && minimum_break > 0 {
        let threshold = minimum_break - inputs.limits.break_leniency_minutes;
        if main_break_minutes(intervals).is_some_and(|length| length < threshold) {
            return DayStatus::InsufficientBreak;
        }
    }
    if count == 2 {
        return DayStatus::CompleteNoBreak;
    }
    DayStatus::Complete
}

fn classification_step(
    classification: &SpecialDayClassification,
    configured_expected: i64,
    expected_effective: i64,
) -> AuditStep {
    AuditStep {
        step_number: 1,
        rule_id: "special_day_classification".to_string(),
        rule_name: "Special Day Classification".to_string(),
        input: serde_json::json!({
            "configured_expected_minutes": configured_expected,
            "governing_absence_id": classification.governing_absence_id
        }),
        output: serde_json::json!({
            "day_type": classification.day_type,
            "zeroes_expected_workload": classification.zeroes_expected_workload,
            "expected_minutes_effective": expected_effective,
            "excused_minutes": classification.excused_minutes
        }),
        reasoning: if classification.zeroes_expected_workload {
            format!(
                "{:?} zeroes the expected {} minutes",
                classification.day_type, configured_expected
            )
        } else {
            format!(
                "{:?} keeps the expected {} minutes",
                classification.day_type, configured_expected
            )
        },
    }
}

fn intervals_step(intervals: &[WorkInterval], rules: &BreakRules) -> AuditStep {
    let primary = intervals.iter().find(|i| i.is_primary_pause);
    let reasoning = match primary {
        Some(p) if p.tolerance_credit_minutes > 0 => format!(
            "Primary pause of {} minutes within tolerance; considered {} and credited {} minutes",
            p.pause_before_minutes.unwrap_or(0),
            p.pause_considered_minutes.unwrap_or(0),
            p.tolerance_credit_minutes
        ),
        Some(p) => format!(
            "Primary pause of {} minutes outside the tolerance window; no credit",
            p.pause_before_minutes.unwrap_or(0)
        ),
        None => format!(
            "No pause of at least {} minutes; no tolerance applied",
            rules.minimum_break_minutes
        ),
    };

    AuditStep {
        step_number: 2,
        rule_id: "interval_pairing".to_string(),
        rule_name: "Interval Pairing and Break Tolerance".to_string(),
        input: serde_json::json!({
            "minimum_break_minutes": rules.minimum_break_minutes,
            "tolerance_minutes": rules.tolerance_minutes,
            "ideal_break_start": rules.ideal_break_start.map(|t| t.to_string())
        }),
        output: serde_json::json!({
            "interval_count": intervals.len(),
            "pauses": intervals
                .iter()
                .filter_map(|i| i.pause_before_minutes.map(|raw| serde_json::json!({
                    "raw": raw,
                    "considered": i.pause_considered_minutes,
                    "primary": i.is_primary_pause
                })))
                .collect::<Vec<_>>()
        }),
        reasoning,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AbsenceType, DayScheduleConfig, DayType, TimeRange};
    use chrono::{NaiveTime, Weekday};

    fn make_datetime(date_str: &str, time_str: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(&format!("{} {}", date_str, time_str), "%Y-%m-%d %H:%M:%S")
            .unwrap()
    }

    fn make_date(date_str: &str) -> NaiveDate {
        NaiveDate::parse_from_str(date_str, "%Y-%m-%d").unwrap()
    }

    // 2026-01-15 is a Thursday
    const DAY: &str = "2026-01-15";

    fn schedule() -> ScheduleVersion {
        ScheduleVersion::new("acme", make_date("2026-01-01"))
            .with_day(DayScheduleConfig::workday(Weekday::Thu, 492, 60, 15))
            .with_max_daily_minutes(600)
    }

    fn entries(times: &[&str]) -> Vec<TimeEntry> {
        times
            .iter()
            .enumerate()
            .map(|(i, t)| {
                let direction = if i % 2 == 0 {
                    Direction::In
                } else {
                    Direction::Out
                };
                TimeEntry::new("acme", make_datetime(DAY, t), direction)
            })
            .collect()
    }

    fn summarize_day(times: &[&str], absences: &[Absence], today: &str) -> DaySummary {
        let schedule = schedule();
        let limits = DayLimits::default();
        let entries = entries(times);
        let inputs = DayInputs {
            workspace_id: "acme",
            date: make_date(DAY),
            entries: &entries,
            schedule: &schedule,
            absences,
            limits: &limits,
        };
        compute_day_summary(&inputs, make_date(today)).unwrap()
    }

    /// DS-001: standard day with exact minimum break balances to zero
    #[test]
    fn test_ds_001_standard_complete_day() {
        let summary = summarize_day(
            &["08:00:00", "12:00:00", "13:00:00", "17:12:00"],
            &[],
            "2026-01-20",
        );
        assert_eq!(summary.worked_minutes, Some(492));
        assert_eq!(summary.balance_minutes, Some(0));
        assert_eq!(summary.status, DayStatus::Complete);
        assert_eq!(summary.audit_steps.len(), 4);
    }

    /// DS-002: a 50 minute break is not tolerated and yields credit
    #[test]
    fn test_ds_002_short_break_increases_worked() {
        let summary = summarize_day(
            &["08:00:00", "12:00:00", "12:50:00", "17:12:00"],
            &[],
            "2026-01-20",
        );
        assert_eq!(summary.worked_minutes, Some(502));
        assert_eq!(summary.balance_minutes, Some(10));
        // 50 is within the 10 minute leniency of 60
        assert_eq!(summary.status, DayStatus::Complete);
    }

    /// DS-003: a single IN today is in progress, yesterday incomplete
    #[test]
    fn test_ds_003_single_in_today_vs_yesterday() {
        let today = summarize_day(&["08:00:00"], &[], DAY);
        assert_eq!(today.status, DayStatus::InProgress);
        assert_eq!(today.worked_minutes, Some(0));
        assert_eq!(today.balance_minutes, None);

        let later = summarize_day(&["08:00:00"], &[], "2026-01-16");
        assert_eq!(later.status, DayStatus::Incomplete);
        assert_eq!(later.worked_minutes, None);
        assert_eq!(later.balance_minutes, None);
    }

    /// DS-004: holiday without entries is a zeroed non-working day
    #[test]
    fn test_ds_004_holiday_without_entries() {
        let holiday = Absence::single_day("acme", AbsenceType::Holiday, make_date(DAY));
        let summary = summarize_day(&[], &[holiday], "2026-01-20");
        assert_eq!(summary.expected_minutes_effective, 0);
        assert_eq!(summary.worked_minutes, Some(0));
        assert_eq!(summary.balance_minutes, Some(0));
        assert_eq!(summary.status, DayStatus::NonWorkingDay);
        assert_eq!(summary.day_type, DayType::Special(AbsenceType::Holiday));
    }

    /// DS-005: work on a holiday is all surplus
    #[test]
    fn test_ds_005_work_on_holiday_is_surplus() {
        let holiday = Absence::single_day("acme", AbsenceType::Holiday, make_date(DAY));
        let summary = summarize_day(&["09:00:00", "13:00:00"], &[holiday], "2026-01-20");
        assert_eq!(summary.balance_minutes, Some(240));
        assert_eq!(summary.status, DayStatus::CompleteNoBreak);
    }

    /// DS-006: no entries on a workday is a full debit
    #[test]
    fn test_ds_006_no_records_on_workday() {
        let summary = summarize_day(&[], &[], "2026-01-20");
        assert_eq!(summary.status, DayStatus::NoRecords);
        assert_eq!(summary.balance_minutes, Some(-492));
    }

    #[test]
    fn test_partial_declaration_excuses_minutes() {
        let declaration = Absence::partial_day(
            "acme",
            AbsenceType::MedicalDeclaration,
            make_date(DAY),
            TimeRange {
                start: NaiveTime::from_hms_opt(13, 0, 0).unwrap(),
                end: NaiveTime::from_hms_opt(17, 12, 0).unwrap(),
            },
        );
        let summary = summarize_day(&["08:00:00", "12:00:00"], &[declaration], "2026-01-20");
        assert_eq!(summary.excused_minutes, 252);
        assert_eq!(summary.expected_minutes_effective, 492);
        assert_eq!(summary.balance_minutes, Some(0));
    }

    #[test]
    fn test_sequence_invalid_has_undefined_worked() {
        let schedule = schedule();
        let limits = DayLimits::default();
        let entries = vec![
            TimeEntry::new("acme", make_datetime(DAY, "08:00:00"), Direction::Out),
            TimeEntry::new("acme", make_datetime(DAY, "12:00:00"), Direction::In),
        ];
        let inputs = DayInputs {
            workspace_id: "acme",
            date: make_date(DAY),
            entries: &entries,
            schedule: &schedule,
            absences: &[],
            limits: &limits,
        };
        let summary = compute_day_summary(&inputs, make_date("2026-01-20")).unwrap();
        assert_eq!(summary.status, DayStatus::SequenceInvalid);
        assert_eq!(summary.worked_minutes, None);
    }

    #[test]
    fn test_overtime_exceeded() {
        let summary = summarize_day(
            &["06:00:00", "12:00:00", "13:00:00", "18:30:00"],
            &[],
            "2026-01-20",
        );
        assert_eq!(summary.worked_minutes, Some(690));
        assert_eq!(summary.status, DayStatus::OvertimeExceeded);
    }

    #[test]
    fn test_insufficient_break() {
        let summary = summarize_day(
            &["08:00:00", "12:00:00", "12:30:00", "17:00:00"],
            &[],
            "2026-01-20",
        );
        assert_eq!(summary.status, DayStatus::InsufficientBreak);
    }

    #[test]
    fn test_excess_entries() {
        let times = [
            "07:00:00", "07:30:00", "08:00:00", "08:30:00", "09:00:00", "09:30:00", "10:00:00",
            "10:30:00", "11:00:00", "11:30:00", "12:00:00", "12:30:00",
        ];
        let summary = summarize_day(&times, &[], "2026-01-20");
        assert_eq!(summary.status, DayStatus::ExcessEntries);
        assert_eq!(summary.worked_minutes, Some(180));
    }

    #[test]
    fn test_three_entries_today_is_incomplete_with_open_interval() {
        let summary = summarize_day(&["08:00:00", "12:00:00", "13:00:00"], &[], DAY);
        assert_eq!(summary.status, DayStatus::Incomplete);
        assert_eq!(summary.worked_minutes, Some(240));
        assert_eq!(summary.balance_minutes, None);
    }

    #[test]
    fn test_with_in_progress_counts_open_interval() {
        let schedule = schedule();
        let limits = DayLimits::default();
        let entries = entries(&["08:00:00", "12:00:00", "13:00:00"]);
        let inputs = DayInputs {
            workspace_id: "acme",
            date: make_date(DAY),
            entries: &entries,
            schedule: &schedule,
            absences: &[],
            limits: &limits,
        };
        let summary =
            compute_day_summary_with_in_progress(&inputs, make_datetime(DAY, "15:00:00")).unwrap();
        assert_eq!(summary.worked_minutes, Some(240));
        assert_eq!(summary.in_progress_minutes, Some(120));
        assert_eq!(summary.balance_minutes, Some(360 - 492));
    }

    #[test]
    fn test_compute_is_idempotent() {
        let first = summarize_day(
            &["08:00:00", "12:00:00", "13:10:00", "17:00:00"],
            &[],
            "2026-01-20",
        );
        let schedule = schedule();
        let limits = DayLimits::default();
        let inputs = DayInputs {
            workspace_id: "acme",
            date: make_date(DAY),
            entries: &first
                .intervals
                .iter()
                .flat_map(|i| std::iter::once(i.entry_in.clone()).chain(i.entry_out.clone()))
                .collect::<Vec<_>>(),
            schedule: &schedule,
            absences: &[],
            limits: &limits,
        };
        let again = compute_day_summary(&inputs, make_date("2026-01-20")).unwrap();
        let once_more = compute_day_summary(&inputs, make_date("2026-01-20")).unwrap();
        assert_eq!(again, once_more);
        assert_eq!(again, first);
    }
}
