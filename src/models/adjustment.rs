//! Manual adjustment model.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{EngineError, EngineResult};

/// A signed, justified correction to the bank of hours on a given date.
///
/// Adjustments are immutable once created; correcting one means deleting it
/// and creating a new one.
///
/// # Example
///
/// ```
/// use timeclock_engine::models::ManualAdjustment;
/// use chrono::NaiveDate;
///
/// let adjustment = ManualAdjustment::new(
///     "acme",
///     NaiveDate::from_ymd_opt(2026, 1, 15).unwrap(),
///     -30,
///     "Left early for a dentist appointment",
/// )
/// .unwrap();
/// assert_eq!(adjustment.minutes, -30);
///
/// assert!(ManualAdjustment::new("acme", adjustment.date, 15, "  ").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManualAdjustment {
    /// Unique identifier of the adjustment.
    pub id: Uuid,
    /// The workspace the adjustment applies to.
    pub workspace_id: String,
    /// The date the adjustment is booked on.
    pub date: NaiveDate,
    /// Signed minutes added to the balance.
    pub minutes: i64,
    /// Mandatory justification.
    pub justification: String,
}

impl ManualAdjustment {
    /// Creates an adjustment, rejecting a blank justification.
    pub fn new(
        workspace_id: &str,
        date: NaiveDate,
        minutes: i64,
        justification: &str,
    ) -> EngineResult<Self> {
        if justification.trim().is_empty() {
            return Err(EngineError::MissingJustification {
                context: format!("manual adjustment of {} minutes on {}", minutes, date),
            });
        }
        Ok(Self {
            id: Uuid::new_v4(),
            workspace_id: workspace_id.to_string(),
            date,
            minutes,
            justification: justification.trim().to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_justification_is_trimmed() {
        let adjustment = ManualAdjustment::new(
            "acme",
            NaiveDate::from_ymd_opt(2026, 1, 15).unwrap(),
            45,
            "  Overtime approved by manager ",
        )
        .unwrap();
        assert_eq!(adjustment.justification, "Overtime approved by manager");
    }

    #[test]
    fn test_blank_justification_is_rejected() {
        let result = ManualAdjustment::new(
            "acme",
            NaiveDate::from_ymd_opt(2026, 1, 15).unwrap(),
            45,
            "",
        );
        assert!(matches!(
            result,
            Err(EngineError::MissingJustification { .. })
        ));
    }
}
