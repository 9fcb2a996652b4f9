//! Period closing model.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The accumulation a closing freezes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClosingType {
    /// Weekly closing.
    Weekly,
    /// Monthly closing.
    Monthly,
    /// Bank-of-hours closing.
    BankOfHours,
}

impl std::fmt::Display for ClosingType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ClosingType::Weekly => write!(f, "weekly"),
            ClosingType::Monthly => write!(f, "monthly"),
            ClosingType::BankOfHours => write!(f, "bank_of_hours"),
        }
    }
}

/// An immutable snapshot of the balance known at a closing.
///
/// Days up to and including `period_end` no longer feed the accumulation of
/// this type; their total lives on as `prior_balance_minutes`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodClosing {
    /// Unique identifier of the closing.
    pub id: Uuid,
    /// The workspace that was closed.
    pub workspace_id: String,
    /// Which accumulation was closed.
    pub closing_type: ClosingType,
    /// The `as_of` date the closing was requested for.
    pub closing_date: NaiveDate,
    /// First day covered by the closing.
    pub period_start: NaiveDate,
    /// Last day covered by the closing.
    pub period_end: NaiveDate,
    /// The frozen balance carried into the next period.
    pub prior_balance_minutes: i64,
    /// When the snapshot was taken.
    pub closed_at: NaiveDateTime,
    /// Optional free-text note.
    #[serde(default)]
    pub note: Option<String>,
}

impl PeriodClosing {
    /// Whether `date` is frozen by this closing.
    pub fn covers(&self, date: NaiveDate) -> bool {
        date >= self.period_start && date <= self.period_end
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_closing_type_serializes_snake_case() {
        let json = serde_json::to_string(&ClosingType::BankOfHours).unwrap();
        assert_eq!(json, "\"bank_of_hours\"");
        assert_eq!(ClosingType::BankOfHours.to_string(), "bank_of_hours");
    }
}
