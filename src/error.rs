//! Error types for the time-clock engine.
//!
//! This module provides strongly-typed errors using the `thiserror` crate
//! for every condition the engine refuses to paper over: blocking
//! inconsistencies, configuration errors and rejected closings.

use chrono::NaiveDate;
use thiserror::Error;
use uuid::Uuid;

use crate::models::ClosingType;

/// The main error type for the time-clock engine.
///
/// # Example
///
/// ```
/// use timeclock_engine::error::EngineError;
///
/// let error = EngineError::ConfigNotFound {
///     path: "/missing/engine.yaml".to_string(),
/// };
/// assert_eq!(error.to_string(), "Configuration file not found: /missing/engine.yaml");
/// ```
#[derive(Debug, Error)]
pub enum EngineError {
    /// Configuration file was not found at the specified path.
    #[error("Configuration file not found: {path}")]
    ConfigNotFound {
        /// The path that was not found.
        path: String,
    },

    /// Configuration file could not be parsed.
    #[error("Failed to parse configuration file '{path}': {message}")]
    ConfigParseError {
        /// The path to the file that failed to parse.
        path: String,
        /// A description of the parse error.
        message: String,
    },

    /// Two schedule versions of the same workspace share at least one date.
    #[error(
        "Schedule version starting {new_start} overlaps version starting {existing_start} in workspace '{workspace_id}'"
    )]
    ScheduleOverlap {
        /// The workspace owning both versions.
        workspace_id: String,
        /// Start date of the version already on record.
        existing_start: NaiveDate,
        /// Start date of the version being added.
        new_start: NaiveDate,
    },

    /// No schedule version covers the requested date.
    #[error("No schedule version for workspace '{workspace_id}' on {date}")]
    NoScheduleVersion {
        /// The workspace that was queried.
        workspace_id: String,
        /// The date that fell outside every version.
        date: NaiveDate,
    },

    /// A schedule version is malformed.
    #[error("Invalid schedule: {message}")]
    InvalidSchedule {
        /// A description of the problem.
        message: String,
    },

    /// More than one special-day marker governs the same date.
    #[error("Ambiguous special day on {date}: {count} markers apply")]
    AmbiguousSpecialDay {
        /// The contested date.
        date: NaiveDate,
        /// How many markers matched.
        count: usize,
    },

    /// An absence record is malformed.
    #[error("Invalid absence: {message}")]
    InvalidAbsence {
        /// A description of the problem.
        message: String,
    },

    /// A closing of the same type already covers the requested date.
    #[error("{closing_type} period already closed through {closed_through}; cannot close as of {as_of}")]
    PeriodAlreadyClosed {
        /// The closing type.
        closing_type: ClosingType,
        /// The requested closing date.
        as_of: NaiveDate,
        /// The last day frozen by the existing closing.
        closed_through: NaiveDate,
    },

    /// The requested closing would cover no days.
    #[error("Invalid closing period: {message}")]
    InvalidClosingPeriod {
        /// A description of the problem.
        message: String,
    },

    /// A HIGH severity finding refused the entry.
    #[error("Entry refused [{code}]: {detail}")]
    BlockingInconsistency {
        /// The inconsistency code (e.g. "DUPLICATE_IN").
        code: String,
        /// Human-readable detail.
        detail: String,
    },

    /// A justification or motive detail was required but blank.
    #[error("Justification required: {context}")]
    MissingJustification {
        /// What required the justification.
        context: String,
    },

    /// An entry was invalid for the requested operation.
    #[error("Invalid entry '{entry_id}': {message}")]
    InvalidEntry {
        /// The ID of the entry.
        entry_id: Uuid,
        /// A description of what made the entry invalid.
        message: String,
    },
}

/// A type alias for Results that return EngineError.
pub type EngineResult<T> = Result<T, EngineError>;
