//! Calculation logic for the time-clock engine.
//!
//! Every function here is pure: it takes the entries, schedule and markers
//! it needs as parameters, along with the current date or instant when the
//! result depends on it. Nothing is cached between calls.
//!
//! The pipeline runs interval pairing and tolerance, then special-day
//! classification and the day summary. Consistency validation is advisory
//! on the side. Balance accumulation and period closings fold day summaries
//! over longer horizons.

mod balance;
mod closing;
mod consistency;
mod day_summary;
mod intervals;
mod special_day;

pub use balance::{
    BalanceWindow, BankBalance, PeriodBalance, accumulate_balance, accumulation_window,
    counts_toward_balance, month_range, period_balance, week_range,
};
pub use closing::{close_period, closing_period_end, ensure_not_closed};
pub use consistency::{
    Inconsistency, InconsistencyKind, Severity, ValidationContext, admit_entry,
    inconsistency_code, severity, validate_entries,
};
pub use day_summary::{
    DayInputs, compute_day_summary, compute_day_summary_with_in_progress, is_sequence_valid,
};
pub use intervals::{
    BreakRules, build_intervals, closed_worked_minutes, in_progress_minutes,
    is_tolerance_eligible, main_break_minutes,
};
pub use special_day::{
    SpecialDayClassification, absence_label, classify_day, zeroes_expected_workload,
};
