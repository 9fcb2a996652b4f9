//! Configuration types for the time-clock engine.
//!
//! This module contains the strongly-typed configuration structures that
//! are deserialized from YAML configuration files. Every field has a
//! default, so a partial `engine.yaml` is valid.

use serde::{Deserialize, Serialize};

use crate::models::ScheduleVersion;

/// Limits applied by the day status state machine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DayLimits {
    /// Entry count above which a day is `EXCESS_ENTRIES`.
    pub max_entries_per_day: usize,
    /// Shortfall of the main break tolerated before `INSUFFICIENT_BREAK`.
    pub break_leniency_minutes: i64,
}

impl Default for DayLimits {
    fn default() -> Self {
        Self {
            max_entries_per_day: 10,
            break_leniency_minutes: 10,
        }
    }
}

/// Thresholds used by the consistency validator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationRules {
    /// Entries older than this many days are flagged.
    pub past_entry_cutoff_days: i64,
    /// Clock skew allowed before an entry counts as future.
    pub future_grace_minutes: i64,
    /// Worked minutes after which a legal break is required.
    pub long_shift_minutes: i64,
    /// Minimum legal break once a long shift has been worked.
    pub legal_break_minutes: i64,
    /// Pauses shorter than this are implausible.
    pub min_plausible_break_minutes: i64,
    /// Pauses longer than this are implausible.
    pub max_plausible_break_minutes: i64,
    /// Whether entries must carry a location.
    pub require_location: bool,
}

impl Default for ValidationRules {
    fn default() -> Self {
        Self {
            past_entry_cutoff_days: 30,
            future_grace_minutes: 1,
            long_shift_minutes: 360,
            legal_break_minutes: 60,
            min_plausible_break_minutes: 5,
            max_plausible_break_minutes: 300,
            require_location: false,
        }
    }
}

/// Rules for bank-of-hours accumulation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BalanceRules {
    /// Whether past workdays without any entry count as owed time.
    pub count_missing_workdays: bool,
}

impl Default for BalanceRules {
    fn default() -> Self {
        Self {
            count_missing_workdays: true,
        }
    }
}

/// Engine-wide configuration loaded from `engine.yaml`.
///
/// # Example
///
/// ```
/// use timeclock_engine::config::EngineConfig;
///
/// let config: EngineConfig = serde_yaml::from_str("day:\n  max_entries_per_day: 8\n").unwrap();
/// assert_eq!(config.day.max_entries_per_day, 8);
/// assert_eq!(config.day.break_leniency_minutes, 10);
/// assert!(config.balance.count_missing_workdays);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Day status limits.
    pub day: DayLimits,
    /// Consistency validator thresholds.
    pub validation: ValidationRules,
    /// Accumulation rules.
    pub balance: BalanceRules,
}

/// Schedule file structure: every version of one workspace.
#[derive(Debug, Clone, Deserialize)]
pub struct ScheduleFile {
    /// The workspace the versions belong to.
    pub workspace_id: String,
    /// The versions, in any order.
    pub versions: Vec<ScheduleVersion>,
}
