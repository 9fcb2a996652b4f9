//! Special-day markers (absences, holidays and leave).
//!
//! This module defines the [`Absence`] record. Whether a type zeroes the
//! expected workload is decided by
//! [`crate::calculation::zeroes_expected_workload`], not by the type itself.

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{EngineError, EngineResult};

/// The kind of special day a marker declares.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AbsenceType {
    /// Public holiday.
    Holiday,
    /// Bridge day between a holiday and a weekend.
    BridgeDay,
    /// Official non-working day declared by the employer or authority.
    OfficialNonWorkDay,
    /// Vacation.
    Vacation,
    /// Medical certificate or attendance declaration.
    MedicalDeclaration,
    /// Absence justified by other means.
    JustifiedAbsence,
    /// Day off granted against the bank of hours.
    DayOff,
    /// Absence without justification; the day is still owed.
    UnjustifiedAbsence,
}

/// A time-of-day sub-range for partial-day markers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeRange {
    /// Start of the range.
    pub start: NaiveTime,
    /// End of the range (exclusive).
    pub end: NaiveTime,
}

impl TimeRange {
    /// Length of the range in minutes.
    pub fn minutes(&self) -> i64 {
        (self.end - self.start).num_minutes()
    }

    /// True when the two ranges share any instant.
    pub fn overlaps(&self, other: &TimeRange) -> bool {
        self.start < other.end && other.start < self.end
    }
}

/// The acquisition period a vacation is drawn from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AcquisitionPeriod {
    /// First day of the acquisition period.
    pub start: NaiveDate,
    /// Last day of the acquisition period.
    pub end: NaiveDate,
}

/// A special-day marker covering one date or an inclusive date range.
///
/// A marker with a `time_range` is a partial-day declaration: it only
/// applies to a single date and excuses part of that day.
///
/// # Example
///
/// ```
/// use timeclock_engine::models::{Absence, AbsenceType};
/// use chrono::NaiveDate;
///
/// let christmas = Absence::single_day(
///     "acme",
///     AbsenceType::Holiday,
///     NaiveDate::from_ymd_opt(2026, 12, 25).unwrap(),
/// );
/// assert!(christmas.covers(NaiveDate::from_ymd_opt(2026, 12, 25).unwrap()));
/// assert!(!christmas.is_partial_day());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Absence {
    /// Unique identifier of the marker.
    pub id: Uuid,
    /// The workspace the marker belongs to.
    pub workspace_id: String,
    /// What kind of day this is.
    pub absence_type: AbsenceType,
    /// First covered date (inclusive).
    pub start_date: NaiveDate,
    /// Last covered date (inclusive).
    pub end_date: NaiveDate,
    /// Time sub-range for partial-day declarations.
    #[serde(default)]
    pub time_range: Option<TimeRange>,
    /// Explicit excused minutes; defaults to the time range length.
    #[serde(default)]
    pub excused_minutes: Option<i64>,
    /// Acquisition period, vacation only.
    #[serde(default)]
    pub acquisition_period: Option<AcquisitionPeriod>,
    /// Reference to an attached document (certificate, declaration).
    #[serde(default)]
    pub attachment: Option<String>,
    /// Optional free-text note.
    #[serde(default)]
    pub note: Option<String>,
}

impl Absence {
    /// A full-day marker for a single date.
    pub fn single_day(workspace_id: &str, absence_type: AbsenceType, date: NaiveDate) -> Self {
        Self::range(workspace_id, absence_type, date, date)
    }

    /// A full-day marker for an inclusive date range.
    pub fn range(
        workspace_id: &str,
        absence_type: AbsenceType,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            workspace_id: workspace_id.to_string(),
            absence_type,
            start_date,
            end_date,
            time_range: None,
            excused_minutes: None,
            acquisition_period: None,
            attachment: None,
            note: None,
        }
    }

    /// A partial-day declaration excusing `time_range` on `date`.
    pub fn partial_day(
        workspace_id: &str,
        absence_type: AbsenceType,
        date: NaiveDate,
        time_range: TimeRange,
    ) -> Self {
        Self {
            time_range: Some(time_range),
            ..Self::single_day(workspace_id, absence_type, date)
        }
    }

    /// Sets the explicit excused minutes.
    pub fn with_excused_minutes(mut self, minutes: i64) -> Self {
        self.excused_minutes = Some(minutes);
        self
    }

    /// Sets the vacation acquisition period.
    pub fn with_acquisition_period(mut self, period: AcquisitionPeriod) -> Self {
        self.acquisition_period = Some(period);
        self
    }

    /// Whether the marker covers `date`.
    pub fn covers(&self, date: NaiveDate) -> bool {
        date >= self.start_date && date <= self.end_date
    }

    /// Whether the marker only excuses part of a day.
    pub fn is_partial_day(&self) -> bool {
        self.time_range.is_some()
    }

    /// Minutes this marker excuses on a covered date.
    ///
    /// Full-day markers excuse nothing; their effect is through the zeroed
    /// expectation instead.
    pub fn excused_minutes(&self) -> i64 {
        match (self.excused_minutes, self.time_range) {
            (Some(minutes), _) => minutes,
            (None, Some(range)) => range.minutes(),
            (None, None) => 0,
        }
    }

    /// True when two markers of the same workspace apply to a common date
    /// in a way that leaves precedence undefined.
    pub fn conflicts_with(&self, other: &Absence) -> bool {
        let dates_overlap = self.start_date <= other.end_date && other.start_date <= self.end_date;
        if !dates_overlap || self.workspace_id != other.workspace_id {
            return false;
        }
        match (self.time_range, other.time_range) {
            (Some(a), Some(b)) => a.overlaps(&b),
            _ => true,
        }
    }

    /// Checks the marker's own shape.
    pub fn validate(&self) -> EngineResult<()> {
        if self.end_date < self.start_date {
            return Err(EngineError::InvalidAbsence {
                message: format!(
                    "end date {} is before start date {}",
                    self.end_date, self.start_date
                ),
            });
        }
        if let Some(range) = self.time_range {
            if self.start_date != self.end_date {
                return Err(EngineError::InvalidAbsence {
                    message: "a time range is only allowed on a single-day marker".to_string(),
                });
            }
            if range.end <= range.start {
                return Err(EngineError::InvalidAbsence {
                    message: format!("time range {} - {} is empty", range.start, range.end),
                });
            }
        }
        if self.excused_minutes.is_some_and(|m| m < 0) {
            return Err(EngineError::InvalidAbsence {
                message: "excused minutes cannot be negative".to_string(),
            });
        }
        if self.acquisition_period.is_some() && self.absence_type != AbsenceType::Vacation {
            return Err(EngineError::InvalidAbsence {
                message: "acquisition period only applies to vacation".to_string(),
            });
        }
        if let Some(period) = self.acquisition_period {
            if period.end < period.start {
                return Err(EngineError::InvalidAbsence {
                    message: "acquisition period ends before it starts".to_string(),
                });
            }
        }
        Ok(())
    }
}
