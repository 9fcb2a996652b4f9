//! The persistence boundary consumed by the engine.
//!
//! [`TimeClockStore`] is the query and write surface the engine facade
//! needs; how records are persisted is up to the implementor.
//! [`InMemoryStore`] backs the tests and benchmarks.

mod memory;

use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::error::EngineResult;
use crate::models::{
    Absence, ClosingType, ManualAdjustment, PeriodClosing, ScheduleVersion, TimeEntry,
};

pub use memory::InMemoryStore;

/// Records the engine reads and writes.
///
/// Query methods return records of the requested workspace only. Entries
/// are returned ordered by timestamp.
pub trait TimeClockStore {
    /// Entries of one day.
    fn fetch_entries(&self, workspace_id: &str, date: NaiveDate) -> EngineResult<Vec<TimeEntry>>;

    /// Entries of an inclusive date range, grouped by day. Days without
    /// entries are absent from the map.
    fn fetch_entries_in_range(
        &self,
        workspace_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> EngineResult<BTreeMap<NaiveDate, Vec<TimeEntry>>>;

    /// The schedule version covering `date`, if any.
    fn fetch_schedule_version(
        &self,
        workspace_id: &str,
        date: NaiveDate,
    ) -> EngineResult<Option<ScheduleVersion>>;

    /// The first date covered by any schedule version.
    fn schedule_origin(&self, workspace_id: &str) -> EngineResult<Option<NaiveDate>>;

    /// Absence markers covering `date`.
    fn fetch_absences(&self, workspace_id: &str, date: NaiveDate) -> EngineResult<Vec<Absence>>;

    /// Manual adjustments dated within an inclusive range.
    fn fetch_manual_adjustments(
        &self,
        workspace_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> EngineResult<Vec<ManualAdjustment>>;

    /// The most recent closing of a type.
    fn fetch_last_closing(
        &self,
        workspace_id: &str,
        closing_type: ClosingType,
    ) -> EngineResult<Option<PeriodClosing>>;

    /// Persists an admitted entry, replacing any stored entry with its id.
    fn save_entry(&mut self, entry: TimeEntry) -> EngineResult<()>;

    /// Persists a closing snapshot.
    fn save_closing(&mut self, closing: PeriodClosing) -> EngineResult<()>;
}
