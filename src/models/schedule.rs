//! Schedule models.
//!
//! A [`ScheduleVersion`] is an effective-dated block of per-weekday
//! [`DayScheduleConfig`] records for one workspace. Versions are held and
//! resolved by [`crate::config::ScheduleHistory`].

use chrono::{Datelike, NaiveDate, NaiveTime, Weekday};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Expected parameters for one weekday.
///
/// # Example
///
/// ```
/// use timeclock_engine::models::DayScheduleConfig;
/// use chrono::Weekday;
///
/// let monday = DayScheduleConfig::workday(Weekday::Mon, 480, 60, 15);
/// assert!(monday.active);
/// assert_eq!(monday.expected_minutes(), 480);
///
/// let sunday = DayScheduleConfig::rest_day(Weekday::Sun);
/// assert_eq!(sunday.expected_minutes(), 0);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayScheduleConfig {
    /// The weekday this record applies to.
    pub weekday: Weekday,
    /// Whether this weekday is a workday.
    #[serde(default = "default_active")]
    pub active: bool,
    /// Minutes of work expected on an active day.
    #[serde(default)]
    pub expected_minutes: i64,
    /// Minimum length of the main break.
    #[serde(default)]
    pub minimum_break_minutes: i64,
    /// Overrun of the main break forgiven by tolerance.
    #[serde(default)]
    pub tolerance_minutes: i64,
    /// Ideal clock-in time.
    #[serde(default)]
    pub ideal_in: Option<NaiveTime>,
    /// Ideal break start; drives primary pause selection.
    #[serde(default)]
    pub ideal_break_start: Option<NaiveTime>,
    /// Ideal return from break.
    #[serde(default)]
    pub ideal_break_end: Option<NaiveTime>,
    /// Ideal clock-out time.
    #[serde(default)]
    pub ideal_out: Option<NaiveTime>,
}

fn default_active() -> bool {
    true
}

impl DayScheduleConfig {
    /// An active workday without ideal times.
    pub fn workday(
        weekday: Weekday,
        expected_minutes: i64,
        minimum_break_minutes: i64,
        tolerance_minutes: i64,
    ) -> Self {
        Self {
            weekday,
            active: true,
            expected_minutes,
            minimum_break_minutes,
            tolerance_minutes,
            ideal_in: None,
            ideal_break_start: None,
            ideal_break_end: None,
            ideal_out: None,
        }
    }

    /// An inactive weekday.
    pub fn rest_day(weekday: Weekday) -> Self {
        Self {
            active: false,
            ..Self::workday(weekday, 0, 0, 0)
        }
    }

    /// Sets the ideal break start.
    pub fn with_ideal_break_start(mut self, time: NaiveTime) -> Self {
        self.ideal_break_start = Some(time);
        self
    }

    /// Expected minutes, zero for inactive days.
    pub fn expected_minutes(&self) -> i64 {
        if self.active { self.expected_minutes } else { 0 }
    }
}

/// An effective-dated schedule block for a workspace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleVersion {
    /// Unique identifier of the version.
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,
    /// The workspace this version belongs to; filled in from the schedule
    /// file when omitted.
    #[serde(default)]
    pub workspace_id: String,
    /// First day the version applies (inclusive).
    pub effective_start: NaiveDate,
    /// Last day the version applies (inclusive); `None` while open-ended.
    #[serde(default)]
    pub effective_end: Option<NaiveDate>,
    /// Position of the version in the workspace history (1-based).
    #[serde(default)]
    pub sequence: u32,
    /// Daily work cap; exceeding it flags overtime.
    #[serde(default)]
    pub max_daily_minutes: Option<i64>,
    /// Minimum rest between the end of one day and the start of the next.
    #[serde(default)]
    pub min_rest_between_shifts_minutes: Option<i64>,
    /// Per-weekday configuration; missing weekdays are inactive.
    #[serde(default)]
    pub days: Vec<DayScheduleConfig>,
}

impl ScheduleVersion {
    /// Creates an open-ended version with no day records.
    pub fn new(workspace_id: &str, effective_start: NaiveDate) -> Self {
        Self {
            id: Uuid::new_v4(),
            workspace_id: workspace_id.to_string(),
            effective_start,
            effective_end: None,
            sequence: 0,
            max_daily_minutes: None,
            min_rest_between_shifts_minutes: None,
            days: Vec::new(),
        }
    }

    /// Adds or replaces the record for a weekday.
    pub fn with_day(mut self, day: DayScheduleConfig) -> Self {
        self.days.retain(|d| d.weekday != day.weekday);
        self.days.push(day);
        self
    }

    /// Sets the daily work cap.
    pub fn with_max_daily_minutes(mut self, minutes: i64) -> Self {
        self.max_daily_minutes = Some(minutes);
        self
    }

    /// Sets the minimum rest between shifts.
    pub fn with_min_rest_minutes(mut self, minutes: i64) -> Self {
        self.min_rest_between_shifts_minutes = Some(minutes);
        self
    }

    /// Whether `date` lies inside the version's range.
    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.effective_start && self.effective_end.is_none_or(|end| date <= end)
    }

    /// True when `self` and `other` share at least one date.
    pub fn overlaps(&self, other: &ScheduleVersion) -> bool {
        let self_before_other = self
            .effective_end
            .is_some_and(|end| end < other.effective_start);
        let other_before_self = other
            .effective_end
            .is_some_and(|end| end < self.effective_start);
        !self_before_other && !other_before_self
    }

    /// The configuration for the weekday of `date`.
    pub fn day_config(&self, date: NaiveDate) -> DayScheduleConfig {
        let weekday = date.weekday();
        self.days
            .iter()
            .find(|d| d.weekday == weekday)
            .cloned()
            .unwrap_or_else(|| DayScheduleConfig::rest_day(weekday))
    }
}
