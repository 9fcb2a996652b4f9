//! Special-day classification.
//!
//! This module decides which absence marker governs a date, whether the
//! date's expected workload is zeroed, and how many minutes partial-day
//! declarations excuse.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{EngineError, EngineResult};
use crate::models::{Absence, AbsenceType, DayType};

/// Whether a full-day marker of this type zeroes the expected workload.
///
/// Every type except an unjustified absence does.
pub fn zeroes_expected_workload(absence_type: AbsenceType) -> bool {
    !matches!(absence_type, AbsenceType::UnjustifiedAbsence)
}

/// Display label for an absence type.
pub fn absence_label(absence_type: AbsenceType) -> &'static str {
    match absence_type {
        AbsenceType::Holiday => "Holiday",
        AbsenceType::BridgeDay => "Bridge day",
        AbsenceType::OfficialNonWorkDay => "Official non-working day",
        AbsenceType::Vacation => "Vacation",
        AbsenceType::MedicalDeclaration => "Medical declaration",
        AbsenceType::JustifiedAbsence => "Justified absence",
        AbsenceType::DayOff => "Day off",
        AbsenceType::UnjustifiedAbsence => "Unjustified absence",
    }
}

/// The classification of one date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpecialDayClassification {
    /// The governing day type.
    pub day_type: DayType,
    /// Whether the expected workload is zeroed.
    pub zeroes_expected_workload: bool,
    /// The full-day marker governing the date, if any.
    pub governing_absence_id: Option<Uuid>,
    /// Minutes excused by partial-day markers.
    pub excused_minutes: i64,
}

/// Classifies `date` against the workspace's absence markers.
///
/// Markers not covering `date` are ignored. At most one full-day marker may
/// apply, and then nothing else may; several partial-day markers may apply
/// as long as their time ranges are disjoint, and their excused minutes add
/// up. Anything else is an [`EngineError::AmbiguousSpecialDay`].
///
/// # Examples
///
/// ```
/// use timeclock_engine::calculation::classify_day;
/// use timeclock_engine::models::{Absence, AbsenceType, DayType};
/// use chrono::NaiveDate;
///
/// let date = NaiveDate::from_ymd_opt(2026, 12, 25).unwrap();
/// let markers = vec![Absence::single_day("acme", AbsenceType::Holiday, date)];
///
/// let classification = classify_day(date, &markers).unwrap();
/// assert_eq!(classification.day_type, DayType::Special(AbsenceType::Holiday));
/// assert!(classification.zeroes_expected_workload);
/// ```
pub fn classify_day(date: NaiveDate, absences: &[Absence]) -> EngineResult<SpecialDayClassification> {
    let (full_day, partial): (Vec<&Absence>, Vec<&Absence>) = absences
        .iter()
        .filter(|a| a.covers(date))
        .partition(|a| !a.is_partial_day());
    let count = full_day.len() + partial.len();

    let ambiguous = full_day.len() > 1
        || (!full_day.is_empty() && !partial.is_empty())
        || partial
            .iter()
            .enumerate()
            .any(|(i, a)| partial[i + 1..].iter().any(|b| a.conflicts_with(b)));
    if ambiguous {
        return Err(EngineError::AmbiguousSpecialDay {
            date,
            count,
        });
    }

    if let Some(governing) = full_day.first() {
        return Ok(SpecialDayClassification {
            day_type: DayType::Special(governing.absence_type),
            zeroes_expected_workload: zeroes_expected_workload(governing.absence_type),
            governing_absence_id: Some(governing.id),
            excused_minutes: 0,
        });
    }

    Ok(SpecialDayClassification {
        day_type: DayType::Normal,
        zeroes_expected_workload: false,
        governing_absence_id: None,
        excused_minutes: partial.iter().map(|a| a.excused_minutes()).sum(),
    })
}
