//! Core data models for the time-clock engine.
//!
//! This module contains all the domain records used throughout the engine.

mod absence;
mod adjustment;
mod audit;
mod closing;
mod day_summary;
mod schedule;
mod time_entry;

pub use absence::{AcquisitionPeriod, Absence, AbsenceType, TimeRange};
pub use adjustment::ManualAdjustment;
pub use audit::AuditStep;
pub use closing::{ClosingType, PeriodClosing};
pub use day_summary::{DayStatus, DaySummary, DayType, WorkInterval, minutes_to_hours};
pub use schedule::{DayScheduleConfig, ScheduleVersion};
pub use time_entry::{
    AuditAction, Direction, EntryAuditRecord, EntrySource, GeoPoint, MotiveCode, TimeEntry,
    delete_entry, edit_entry, motive_label,
};
