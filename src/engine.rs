//! The engine facade.
//!
//! [`TimeClockEngine`] fetches what a computation needs from a
//! [`TimeClockStore`] and hands it to the pure functions of
//! [`crate::calculation`]. The current date or instant is always a
//! parameter; the engine never reads the wall clock.

use chrono::{NaiveDate, NaiveDateTime};
use tracing::{debug, info};

use crate::calculation::{
    self, BalanceWindow, BankBalance, DayInputs, Inconsistency, PeriodBalance, ValidationContext,
    accumulate_balance, accumulation_window, admit_entry, closing_period_end,
    counts_toward_balance, ensure_not_closed, month_range, period_balance, week_range,
};
use crate::config::EngineConfig;
use crate::error::{EngineError, EngineResult};
use crate::models::{ClosingType, DaySummary, Direction, PeriodClosing, TimeEntry};
use crate::store::TimeClockStore;

/// Computes day summaries, balances and closings over a store.
///
/// # Example
///
/// ```
/// use timeclock_engine::config::EngineConfig;
/// use timeclock_engine::engine::TimeClockEngine;
/// use timeclock_engine::models::{DayScheduleConfig, DayStatus, Direction, ScheduleVersion, TimeEntry};
/// use timeclock_engine::store::InMemoryStore;
/// use chrono::{NaiveDate, Weekday};
///
/// let day = NaiveDate::from_ymd_opt(2026, 1, 15).unwrap();
/// let mut store = InMemoryStore::new();
/// store
///     .add_schedule_version(
///         ScheduleVersion::new("acme", NaiveDate::from_ymd_opt(2026, 1, 1).unwrap())
///             .with_day(DayScheduleConfig::workday(Weekday::Thu, 480, 60, 15)),
///     )
///     .unwrap();
///
/// let mut engine = TimeClockEngine::new(store, EngineConfig::default());
/// let now = day.and_hms_opt(18, 0, 0).unwrap();
/// for (h, direction) in [(8, Direction::In), (12, Direction::Out), (13, Direction::In), (17, Direction::Out)] {
///     let entry = TimeEntry::new("acme", day.and_hms_opt(h, 0, 0).unwrap(), direction);
///     engine.record_entry(entry, now, None).unwrap();
/// }
///
/// let summary = engine.compute_day_summary("acme", day, day).unwrap();
/// assert_eq!(summary.worked_minutes, Some(480));
/// assert_eq!(summary.balance_minutes, Some(0));
/// assert_eq!(summary.status, DayStatus::Complete);
/// ```
#[derive(Debug, Clone)]
pub struct TimeClockEngine<S: TimeClockStore> {
    store: S,
    config: EngineConfig,
}

impl<S: TimeClockStore> TimeClockEngine<S> {
    /// Creates an engine over `store`.
    pub fn new(store: S, config: EngineConfig) -> Self {
        Self { store, config }
    }

    /// The underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Mutable access to the underlying store.
    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    /// The engine configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Summary of one day, with open intervals left undefined.
    pub fn compute_day_summary(
        &self,
        workspace_id: &str,
        date: NaiveDate,
        today: NaiveDate,
    ) -> EngineResult<DaySummary> {
        self.summarize_day(workspace_id, date, |inputs| {
            calculation::compute_day_summary(inputs, today)
        })
    }

    /// Summary of one day, counting open intervals up to `now`.
    pub fn compute_day_summary_with_in_progress(
        &self,
        workspace_id: &str,
        date: NaiveDate,
        now: NaiveDateTime,
    ) -> EngineResult<DaySummary> {
        self.summarize_day(workspace_id, date, |inputs| {
            calculation::compute_day_summary_with_in_progress(inputs, now)
        })
    }

    fn summarize_day<F>(&self, workspace_id: &str, date: NaiveDate, compute: F) -> EngineResult<DaySummary>
    where
        F: FnOnce(&DayInputs<'_>) -> EngineResult<DaySummary>,
    {
        let schedule = self
            .store
            .fetch_schedule_version(workspace_id, date)?
            .ok_or_else(|| EngineError::NoScheduleVersion {
                workspace_id: workspace_id.to_string(),
                date,
            })?;
        let entries = self.store.fetch_entries(workspace_id, date)?;
        let absences = self.store.fetch_absences(workspace_id, date)?;

        compute(&DayInputs {
            workspace_id,
            date,
            entries: &entries,
            schedule: &schedule,
            absences: &absences,
            limits: &self.config.day,
        })
    }

    /// Every inconsistency of a day's stored entries.
    pub fn validate_entries(
        &self,
        workspace_id: &str,
        date: NaiveDate,
        now: NaiveDateTime,
    ) -> EngineResult<Vec<Inconsistency>> {
        let entries = self.store.fetch_entries(workspace_id, date)?;
        let schedule = self.store.fetch_schedule_version(workspace_id, date)?;
        let previous_day_last_out = self.previous_day_last_out(workspace_id, date)?;

        let ctx = ValidationContext {
            now,
            rules: &self.config.validation,
            limits: &self.config.day,
            schedule: schedule.as_ref(),
            previous_day_last_out,
        };
        Ok(calculation::validate_entries(&entries, &ctx))
    }

    /// Validates and stores a new entry.
    ///
    /// A blocking finding on the entry refuses it unless an override
    /// justification is given. On success the day's advisories are returned.
    pub fn record_entry(
        &mut self,
        entry: TimeEntry,
        now: NaiveDateTime,
        override_justification: Option<&str>,
    ) -> EngineResult<Vec<Inconsistency>> {
        let workspace_id = entry.workspace_id.clone();
        let date = entry.date();
        let existing = self.store.fetch_entries(&workspace_id, date)?;
        let schedule = self.store.fetch_schedule_version(&workspace_id, date)?;
        let previous_day_last_out = self.previous_day_last_out(&workspace_id, date)?;

        let ctx = ValidationContext {
            now,
            rules: &self.config.validation,
            limits: &self.config.day,
            schedule: schedule.as_ref(),
            previous_day_last_out,
        };
        let findings = admit_entry(&existing, &entry, &ctx, override_justification)?;

        info!(
            workspace_id = %workspace_id,
            entry_id = %entry.id,
            date = %date,
            direction = %entry.direction,
            advisories = findings.len(),
            "Entry recorded"
        );
        self.store.save_entry(entry)?;
        Ok(findings)
    }

    /// The bank of hours of one closing type, accumulated through `through`.
    ///
    /// `today` decides which days without records are already owed.
    pub fn compute_bank_balance(
        &self,
        workspace_id: &str,
        closing_type: ClosingType,
        through: NaiveDate,
        today: NaiveDate,
    ) -> EngineResult<BankBalance> {
        let last_closing = self.store.fetch_last_closing(workspace_id, closing_type)?;
        let origin = match (self.store.schedule_origin(workspace_id)?, &last_closing) {
            (Some(origin), _) => origin,
            (None, Some(closing)) => closing.period_start,
            (None, None) => {
                return Err(EngineError::NoScheduleVersion {
                    workspace_id: workspace_id.to_string(),
                    date: through,
                });
            }
        };

        let window = accumulation_window(last_closing.as_ref(), origin, through);
        let summaries = self.counted_summaries(workspace_id, window, today)?;
        let adjustments = self
            .store
            .fetch_manual_adjustments(workspace_id, window.start, window.end)?;

        Ok(accumulate_balance(
            closing_type,
            window,
            &summaries,
            &adjustments,
            last_closing.as_ref(),
        ))
    }

    /// Totals of the calendar week containing `date`.
    pub fn week_balance(
        &self,
        workspace_id: &str,
        date: NaiveDate,
        today: NaiveDate,
    ) -> EngineResult<PeriodBalance> {
        self.range_balance(workspace_id, week_range(date), today)
    }

    /// Totals of the calendar month containing `date`.
    pub fn month_balance(
        &self,
        workspace_id: &str,
        date: NaiveDate,
        today: NaiveDate,
    ) -> EngineResult<PeriodBalance> {
        self.range_balance(workspace_id, month_range(date), today)
    }

    fn range_balance(
        &self,
        workspace_id: &str,
        range: BalanceWindow,
        today: NaiveDate,
    ) -> EngineResult<PeriodBalance> {
        let summaries = self.counted_summaries(workspace_id, range, today)?;
        let adjustments = self
            .store
            .fetch_manual_adjustments(workspace_id, range.start, range.end)?;
        Ok(period_balance(&summaries, &adjustments, range))
    }

    /// Freezes the balance of `closing_type` through the day before `as_of`.
    ///
    /// Fails with [`EngineError::PeriodAlreadyClosed`] when the range is
    /// already covered by a closing of the same type.
    pub fn close_period(
        &mut self,
        workspace_id: &str,
        closing_type: ClosingType,
        as_of: NaiveDate,
        closed_at: NaiveDateTime,
        note: Option<String>,
    ) -> EngineResult<PeriodClosing> {
        let last_closing = self.store.fetch_last_closing(workspace_id, closing_type)?;
        ensure_not_closed(closing_type, as_of, last_closing.as_ref())?;

        let period_end = closing_period_end(as_of)?;
        let balance =
            self.compute_bank_balance(workspace_id, closing_type, period_end, closed_at.date())?;
        let closing = calculation::close_period(
            workspace_id,
            as_of,
            &balance,
            last_closing.as_ref(),
            closed_at,
            note,
        )?;

        self.store.save_closing(closing.clone())?;
        Ok(closing)
    }

    /// Summaries of every scheduled day of `window` that feeds a balance.
    fn counted_summaries(
        &self,
        workspace_id: &str,
        window: BalanceWindow,
        today: NaiveDate,
    ) -> EngineResult<Vec<DaySummary>> {
        let mut entries_by_day = self
            .store
            .fetch_entries_in_range(workspace_id, window.start, window.end)?;

        let mut summaries = Vec::new();
        for date in window.days() {
            let Some(schedule) = self.store.fetch_schedule_version(workspace_id, date)? else {
                debug!(workspace_id = %workspace_id, date = %date, "Skipping day outside any schedule");
                continue;
            };
            let entries = entries_by_day.remove(&date).unwrap_or_default();
            let absences = self.store.fetch_absences(workspace_id, date)?;

            let summary = calculation::compute_day_summary(
                &DayInputs {
                    workspace_id,
                    date,
                    entries: &entries,
                    schedule: &schedule,
                    absences: &absences,
                    limits: &self.config.day,
                },
                today,
            )?;
            if counts_toward_balance(&summary, today, &self.config.balance) {
                summaries.push(summary);
            }
        }
        Ok(summaries)
    }

    fn previous_day_last_out(
        &self,
        workspace_id: &str,
        date: NaiveDate,
    ) -> EngineResult<Option<NaiveDateTime>> {
        let Some(previous) = date.pred_opt() else {
            return Ok(None);
        };
        Ok(self
            .store
            .fetch_entries(workspace_id, previous)?
            .iter()
            .rev()
            .find(|e| e.direction == Direction::Out)
            .map(|e| e.timestamp))
    }
}
