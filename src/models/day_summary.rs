//! Derived day models.
//!
//! This module contains the [`WorkInterval`] and [`DaySummary`] types
//! produced by the calculation layer. Neither is ever persisted; both are
//! recomputed from entries, schedule and absences on every read.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{AbsenceType, AuditStep, TimeEntry};

/// A positional (in, out) pair of entries and the pause preceding it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkInterval {
    /// The entry opening the interval.
    pub entry_in: TimeEntry,
    /// The entry closing the interval; `None` while the interval is open.
    pub entry_out: Option<TimeEntry>,
    /// Worked minutes including any tolerance credit; `None` while open.
    pub duration_minutes: Option<i64>,
    /// Raw gap since the previous interval's OUT; `None` for the first.
    pub pause_before_minutes: Option<i64>,
    /// Gap as considered after tolerance; `None` for the first.
    pub pause_considered_minutes: Option<i64>,
    /// Whether the preceding pause is the day's primary pause.
    pub is_primary_pause: bool,
    /// Minutes of the preceding pause forgiven by tolerance.
    pub tolerance_credit_minutes: i64,
    /// True when the interval has no OUT yet.
    pub open: bool,
}

/// The governing classification of a date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "absence_type")]
pub enum DayType {
    /// No full-day marker applies.
    Normal,
    /// A full-day marker of the given type applies.
    Special(AbsenceType),
}

/// Outcome of the day status state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DayStatus {
    /// No entries on a day with work expected.
    NoRecords,
    /// No entries on a day whose expectation is zero.
    NonWorkingDay,
    /// More entries than the configured maximum.
    ExcessEntries,
    /// A single IN today: shift under way.
    InProgress,
    /// Odd entry count that is not an in-progress shift.
    Incomplete,
    /// Entries do not alternate IN/OUT starting with IN.
    SequenceInvalid,
    /// Worked time exceeds the daily cap.
    OvertimeExceeded,
    /// The main break is shorter than the minimum, beyond leniency.
    InsufficientBreak,
    /// A single closed interval.
    CompleteNoBreak,
    /// A complete day with breaks.
    Complete,
}

/// The derived summary of one workspace day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DaySummary {
    /// The workspace of the day.
    pub workspace_id: String,
    /// The calendar date.
    pub date: NaiveDate,
    /// The date's classification.
    pub day_type: DayType,
    /// Sum of closed interval durations; `None` when it cannot be derived.
    pub worked_minutes: Option<i64>,
    /// Elapsed minutes of the open interval, in-progress variant only.
    pub in_progress_minutes: Option<i64>,
    /// Expected minutes after special-day zeroing.
    pub expected_minutes_effective: i64,
    /// Partial-day excused minutes.
    pub excused_minutes: i64,
    /// `worked + excused - expected`; `None` while undefined or provisional.
    pub balance_minutes: Option<i64>,
    /// The day status.
    pub status: DayStatus,
    /// The day's intervals in order.
    pub intervals: Vec<WorkInterval>,
    /// Record of the derivation.
    pub audit_steps: Vec<AuditStep>,
}

impl DaySummary {
    /// Worked time in hours, when defined.
    pub fn worked_hours(&self) -> Option<Decimal> {
        self.worked_minutes.map(minutes_to_hours)
    }

    /// Balance in hours, when defined.
    pub fn balance_hours(&self) -> Option<Decimal> {
        self.balance_minutes.map(minutes_to_hours)
    }

    /// The primary pause interval, if the day has one.
    pub fn primary_pause(&self) -> Option<&WorkInterval> {
        self.intervals.iter().find(|i| i.is_primary_pause)
    }
}

/// Converts minutes to decimal hours, rounded to two places.
///
/// # Example
///
/// ```
/// use timeclock_engine::models::minutes_to_hours;
/// use rust_decimal::Decimal;
///
/// assert_eq!(minutes_to_hours(492), Decimal::new(820, 2));
/// assert_eq!(minutes_to_hours(-45), Decimal::new(-75, 2));
/// ```
pub fn minutes_to_hours(minutes: i64) -> Decimal {
    (Decimal::new(minutes, 0) / Decimal::new(60, 0)).round_dp(2)
}
