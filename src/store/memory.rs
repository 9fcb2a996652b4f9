//! An in-memory [`TimeClockStore`].

use std::collections::{BTreeMap, HashMap};

use chrono::{NaiveDate, NaiveDateTime};
use uuid::Uuid;

use crate::config::ScheduleHistory;
use crate::error::{EngineError, EngineResult};
use crate::models::{
    Absence, ClosingType, EntryAuditRecord, ManualAdjustment, MotiveCode, PeriodClosing,
    ScheduleVersion, TimeEntry, delete_entry, edit_entry,
};

use super::TimeClockStore;

/// Keeps every record in memory.
///
/// Besides the [`TimeClockStore`] surface it offers the write operations a
/// front end would perform: schedule versions, absence markers, manual
/// adjustments, and audited edits and deletions of entries.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    entries: HashMap<String, BTreeMap<NaiveDate, Vec<TimeEntry>>>,
    schedules: HashMap<String, ScheduleHistory>,
    absences: Vec<Absence>,
    adjustments: Vec<ManualAdjustment>,
    closings: Vec<PeriodClosing>,
    audit_log: Vec<EntryAuditRecord>,
}

impl InMemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store seeded with loaded schedule histories.
    pub fn with_schedules(schedules: HashMap<String, ScheduleHistory>) -> Self {
        Self {
            schedules,
            ..Self::default()
        }
    }

    /// Adds a schedule version, closing or rejecting against existing ones.
    pub fn add_schedule_version(&mut self, version: ScheduleVersion) -> EngineResult<()> {
        let workspace_id = version.workspace_id.clone();
        self.schedules
            .entry(workspace_id.clone())
            .or_insert_with(|| ScheduleHistory::new(&workspace_id))
            .insert(version)
    }

    /// Adds an absence marker after validating it.
    ///
    /// A marker conflicting with an existing one is rejected with
    /// [`EngineError::AmbiguousSpecialDay`].
    pub fn add_absence(&mut self, absence: Absence) -> EngineResult<()> {
        absence.validate()?;
        if let Some(existing) = self.absences.iter().find(|a| a.conflicts_with(&absence)) {
            let date = existing.start_date.max(absence.start_date);
            return Err(EngineError::AmbiguousSpecialDay { date, count: 2 });
        }
        self.absences.push(absence);
        Ok(())
    }

    /// Adds a manual adjustment.
    pub fn add_adjustment(&mut self, adjustment: ManualAdjustment) {
        self.adjustments.push(adjustment);
    }

    /// Removes a manual adjustment; adjustments are replaced, never edited.
    pub fn remove_adjustment(&mut self, adjustment_id: Uuid) -> Option<ManualAdjustment> {
        let position = self.adjustments.iter().position(|a| a.id == adjustment_id)?;
        Some(self.adjustments.remove(position))
    }

    /// Moves an entry to a new timestamp under a motive code.
    pub fn edit_entry(
        &mut self,
        workspace_id: &str,
        entry_id: Uuid,
        new_timestamp: NaiveDateTime,
        motive: MotiveCode,
        recorded_at: NaiveDateTime,
    ) -> EngineResult<TimeEntry> {
        let current = self.take_entry(workspace_id, entry_id)?;
        match edit_entry(&current, new_timestamp, motive, recorded_at) {
            Ok((edited, record)) => {
                self.insert_entry(edited.clone());
                self.audit_log.push(record);
                Ok(edited)
            }
            Err(e) => {
                self.insert_entry(current);
                Err(e)
            }
        }
    }

    /// Deletes an entry under a motive code.
    pub fn delete_entry(
        &mut self,
        workspace_id: &str,
        entry_id: Uuid,
        motive: MotiveCode,
        recorded_at: NaiveDateTime,
    ) -> EngineResult<TimeEntry> {
        let current = self.take_entry(workspace_id, entry_id)?;
        match delete_entry(&current, motive, recorded_at) {
            Ok(record) => {
                self.audit_log.push(record);
                Ok(current)
            }
            Err(e) => {
                self.insert_entry(current);
                Err(e)
            }
        }
    }

    /// Every audited edit and deletion, oldest first.
    pub fn audit_log(&self) -> &[EntryAuditRecord] {
        &self.audit_log
    }

    /// Every closing of a workspace, oldest first.
    pub fn closings(&self, workspace_id: &str) -> Vec<&PeriodClosing> {
        self.closings
            .iter()
            .filter(|c| c.workspace_id == workspace_id)
            .collect()
    }

    fn insert_entry(&mut self, entry: TimeEntry) {
        let day = self
            .entries
            .entry(entry.workspace_id.clone())
            .or_default()
            .entry(entry.date())
            .or_default();
        let position = day.partition_point(|e| e.timestamp <= entry.timestamp);
        day.insert(position, entry);
    }

    fn take_entry(&mut self, workspace_id: &str, entry_id: Uuid) -> EngineResult<TimeEntry> {
        let not_found = || EngineError::InvalidEntry {
            entry_id,
            message: format!("no entry in workspace '{}'", workspace_id),
        };
        let days = self.entries.get_mut(workspace_id).ok_or_else(not_found)?;

        let mut found = None;
        for (date, day) in days.iter_mut() {
            if let Some(position) = day.iter().position(|e| e.id == entry_id) {
                found = Some((*date, day.remove(position)));
                break;
            }
        }
        let (date, entry) = found.ok_or_else(not_found)?;
        if days.get(&date).is_some_and(|day| day.is_empty()) {
            days.remove(&date);
        }
        Ok(entry)
    }
}

impl TimeClockStore for InMemoryStore {
    fn fetch_entries(&self, workspace_id: &str, date: NaiveDate) -> EngineResult<Vec<TimeEntry>> {
        Ok(self
            .entries
            .get(workspace_id)
            .and_then(|days| days.get(&date))
            .cloned()
            .unwrap_or_default())
    }

    fn fetch_entries_in_range(
        &self,
        workspace_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> EngineResult<BTreeMap<NaiveDate, Vec<TimeEntry>>> {
        if end < start {
            return Ok(BTreeMap::new());
        }
        Ok(self
            .entries
            .get(workspace_id)
            .map(|days| {
                days.range(start..=end)
                    .map(|(date, day)| (*date, day.clone()))
                    .collect()
            })
            .unwrap_or_default())
    }

    fn fetch_schedule_version(
        &self,
        workspace_id: &str,
        date: NaiveDate,
    ) -> EngineResult<Option<ScheduleVersion>> {
        Ok(self
            .schedules
            .get(workspace_id)
            .and_then(|history| history.find(date))
            .cloned())
    }

    fn schedule_origin(&self, workspace_id: &str) -> EngineResult<Option<NaiveDate>> {
        Ok(self
            .schedules
            .get(workspace_id)
            .and_then(ScheduleHistory::origin))
    }

    fn fetch_absences(&self, workspace_id: &str, date: NaiveDate) -> EngineResult<Vec<Absence>> {
        Ok(self
            .absences
            .iter()
            .filter(|a| a.workspace_id == workspace_id && a.covers(date))
            .cloned()
            .collect())
    }

    fn fetch_manual_adjustments(
        &self,
        workspace_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> EngineResult<Vec<ManualAdjustment>> {
        Ok(self
            .adjustments
            .iter()
            .filter(|a| a.workspace_id == workspace_id && a.date >= start && a.date <= end)
            .cloned()
            .collect())
    }

    fn fetch_last_closing(
        &self,
        workspace_id: &str,
        closing_type: ClosingType,
    ) -> EngineResult<Option<PeriodClosing>> {
        Ok(self
            .closings
            .iter()
            .filter(|c| c.workspace_id == workspace_id && c.closing_type == closing_type)
            .max_by_key(|c| c.period_end)
            .cloned())
    }

    fn save_entry(&mut self, entry: TimeEntry) -> EngineResult<()> {
        // Same id replaces, wherever the stored copy sits
        self.take_entry(&entry.workspace_id, entry.id).ok();
        self.insert_entry(entry);
        Ok(())
    }

    fn save_closing(&mut self, closing: PeriodClosing) -> EngineResult<()> {
        self.closings.push(closing);
        Ok(())
    }
}
