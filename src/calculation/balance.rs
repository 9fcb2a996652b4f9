//! Bank-of-hours accumulation.
//!
//! Balances are always recomputed by summing per-day contributions over a
//! window. Nothing here keeps a running total between calls, so changing one
//! day only changes that day's term of the sum.

use chrono::{Datelike, Days, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::BalanceRules;
use crate::models::{
    ClosingType, DayStatus, DaySummary, ManualAdjustment, PeriodClosing, minutes_to_hours,
};

/// An inclusive range of dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceWindow {
    /// First day (inclusive).
    pub start: NaiveDate,
    /// Last day (inclusive).
    pub end: NaiveDate,
}

impl BalanceWindow {
    /// Creates a window; `end < start` yields an empty window.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// True when the window holds no day.
    pub fn is_empty(&self) -> bool {
        self.end < self.start
    }

    /// Whether `date` falls in the window.
    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }

    /// Number of days in the window.
    pub fn day_count(&self) -> i64 {
        if self.is_empty() {
            0
        } else {
            (self.end - self.start).num_days() + 1
        }
    }

    /// Every date of the window, in order.
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.start.iter_days().take_while(move |d| *d <= self.end)
    }
}

/// The calendar week (Monday to Sunday) containing `date`.
pub fn week_range(date: NaiveDate) -> BalanceWindow {
    let from_monday = u64::from(date.weekday().num_days_from_monday());
    let start = date.checked_sub_days(Days::new(from_monday)).unwrap_or(date);
    let end = start.checked_add_days(Days::new(6)).unwrap_or(NaiveDate::MAX);
    BalanceWindow::new(start, end)
}

/// The calendar month containing `date`.
pub fn month_range(date: NaiveDate) -> BalanceWindow {
    let start = date.with_day(1).unwrap_or(date);
    let end = start
        .checked_add_months(chrono::Months::new(1))
        .and_then(|next| next.pred_opt())
        .unwrap_or(NaiveDate::MAX);
    BalanceWindow::new(start, end)
}

/// The window a balance of one closing type accumulates over.
///
/// It starts the day after the last closing's `period_end`, or at `origin`
/// when the type was never closed, and ends at `through`.
pub fn accumulation_window(
    last_closing: Option<&PeriodClosing>,
    origin: NaiveDate,
    through: NaiveDate,
) -> BalanceWindow {
    let start = match last_closing {
        Some(closing) => closing.period_end.succ_opt().unwrap_or(NaiveDate::MAX),
        None => origin,
    };
    BalanceWindow::new(start, through)
}

/// Whether a day summary feeds the bank of hours.
///
/// Days without records only count once they are in the past, and only when
/// `count_missing_workdays` is set. Every other day counts, pending or not.
pub fn counts_toward_balance(summary: &DaySummary, today: NaiveDate, rules: &BalanceRules) -> bool {
    if summary.status != DayStatus::NoRecords {
        return true;
    }
    rules.count_missing_workdays && summary.date < today
}

/// The accumulated bank of hours for one closing type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BankBalance {
    /// The accumulation this balance belongs to.
    pub closing_type: ClosingType,
    /// The summed window.
    pub window: BalanceWindow,
    /// Balance carried from the last closing.
    pub prior_balance_minutes: i64,
    /// Sum of defined day balances in the window.
    pub days_balance_minutes: i64,
    /// Sum of manual adjustments in the window.
    pub adjustments_minutes: i64,
    /// Prior balance plus days plus adjustments.
    pub total_minutes: i64,
    /// Days whose balance was added.
    pub days_counted: usize,
    /// Days in the window whose balance is still undefined.
    pub pending_days: Vec<NaiveDate>,
}

impl BankBalance {
    /// Total as decimal hours.
    pub fn total_hours(&self) -> Decimal {
        minutes_to_hours(self.total_minutes)
    }

    /// True when no day of the window is pending.
    pub fn is_settled(&self) -> bool {
        self.pending_days.is_empty()
    }
}

/// Sums day balances and adjustments over `window`.
///
/// Summaries and adjustments outside the window are ignored, so callers may
/// pass wider slices. Order of the inputs does not matter.
pub fn accumulate_balance(
    closing_type: ClosingType,
    window: BalanceWindow,
    summaries: &[DaySummary],
    adjustments: &[ManualAdjustment],
    last_closing: Option<&PeriodClosing>,
) -> BankBalance {
    let mut days_balance_minutes = 0;
    let mut days_counted = 0;
    let mut pending_days = Vec::new();

    for summary in summaries.iter().filter(|s| window.contains(s.date)) {
        match summary.balance_minutes {
            Some(balance) => {
                days_balance_minutes += balance;
                days_counted += 1;
            }
            None => pending_days.push(summary.date),
        }
    }
    pending_days.sort();

    let adjustments_minutes: i64 = adjustments
        .iter()
        .filter(|a| window.contains(a.date))
        .map(|a| a.minutes)
        .sum();

    let prior_balance_minutes = last_closing.map_or(0, |c| c.prior_balance_minutes);
    let total_minutes = prior_balance_minutes + days_balance_minutes + adjustments_minutes;

    debug!(
        closing_type = %closing_type,
        start = %window.start,
        end = %window.end,
        days_counted,
        pending = pending_days.len(),
        total_minutes,
        "Accumulated balance"
    );

    BankBalance {
        closing_type,
        window,
        prior_balance_minutes,
        days_balance_minutes,
        adjustments_minutes,
        total_minutes,
        days_counted,
        pending_days,
    }
}

/// Worked, expected and balance totals over a calendar range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodBalance {
    /// The summed range.
    pub range: BalanceWindow,
    /// Sum of defined worked minutes.
    pub worked_minutes: i64,
    /// Sum of effective expected minutes.
    pub expected_minutes: i64,
    /// Sum of excused minutes.
    pub excused_minutes: i64,
    /// Sum of defined day balances.
    pub balance_minutes: i64,
    /// Sum of manual adjustments.
    pub adjustments_minutes: i64,
    /// Days whose balance is undefined.
    pub pending_days: Vec<NaiveDate>,
}

impl PeriodBalance {
    /// Day balances plus adjustments.
    pub fn net_minutes(&self) -> i64 {
        self.balance_minutes + self.adjustments_minutes
    }
}

/// Totals for a week or month view, independent of closings.
pub fn period_balance(
    summaries: &[DaySummary],
    adjustments: &[ManualAdjustment],
    range: BalanceWindow,
) -> PeriodBalance {
    let in_range: Vec<&DaySummary> = summaries.iter().filter(|s| range.contains(s.date)).collect();

    let mut pending_days: Vec<NaiveDate> = in_range
        .iter()
        .filter(|s| s.balance_minutes.is_none())
        .map(|s| s.date)
        .collect();
    pending_days.sort();

    PeriodBalance {
        range,
        worked_minutes: in_range.iter().filter_map(|s| s.worked_minutes).sum(),
        expected_minutes: in_range.iter().map(|s| s.expected_minutes_effective).sum(),
        excused_minutes: in_range.iter().map(|s| s.excused_minutes).sum(),
        balance_minutes: in_range.iter().filter_map(|s| s.balance_minutes).sum(),
        adjustments_minutes: adjustments
            .iter()
            .filter(|a| range.contains(a.date))
            .map(|a| a.minutes)
            .sum(),
        pending_days,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DayType;
    use chrono::NaiveDateTime;
    use uuid::Uuid;

    fn make_date(date_str: &str) -> NaiveDate {
        NaiveDate::parse_from_str(date_str, "%Y-%m-%d").unwrap()
    }

    fn summary(date: &str, balance: Option<i64>, status: DayStatus) -> DaySummary {
        DaySummary {
            workspace_id: "acme".to_string(),
            date: make_date(date),
            day_type: DayType::Normal,
            worked_minutes: balance.map(|b| 480 + b),
            in_progress_minutes: None,
            expected_minutes_effective: 480,
            excused_minutes: 0,
            balance_minutes: balance,
            status,
            intervals: Vec::new(),
            audit_steps: Vec::new(),
        }
    }

    fn closing(end: &str, prior: i64) -> PeriodClosing {
        PeriodClosing {
            id: Uuid::new_v4(),
            workspace_id: "acme".to_string(),
            closing_type: ClosingType::BankOfHours,
            closing_date: make_date(end).succ_opt().unwrap(),
            period_start: make_date("2026-01-01"),
            period_end: make_date(end),
            prior_balance_minutes: prior,
            closed_at: NaiveDateTime::parse_from_str("2026-02-01 09:00:00", "%Y-%m-%d %H:%M:%S")
                .unwrap(),
            note: None,
        }
    }

    /// BA-001: sum of defined balances, pending days excluded
    #[test]
    fn test_ba_001_sums_defined_days() {
        let window = BalanceWindow::new(make_date("2026-01-12"), make_date("2026-01-16"));
        let summaries = vec![
            summary("2026-01-12", Some(10), DayStatus::Complete),
            summary("2026-01-13", Some(-30), DayStatus::Complete),
            summary("2026-01-14", None, DayStatus::Incomplete),
            summary("2026-01-15", Some(5), DayStatus::Complete),
        ];
        let balance = accumulate_balance(ClosingType::BankOfHours, window, &summaries, &[], None);

        assert_eq!(balance.days_balance_minutes, -15);
        assert_eq!(balance.days_counted, 3);
        assert_eq!(balance.pending_days, vec![make_date("2026-01-14")]);
        assert_eq!(balance.total_minutes, -15);
        assert!(!balance.is_settled());
    }

    /// BA-002: window starts after the last closing and carries its balance
    #[test]
    fn test_ba_002_window_after_closing() {
        let last = closing("2026-01-31", 120);
        let window = accumulation_window(Some(&last), make_date("2026-01-01"), make_date("2026-02-05"));
        assert_eq!(window.start, make_date("2026-02-01"));

        let summaries = vec![
            summary("2026-01-30", Some(999), DayStatus::Complete),
            summary("2026-02-02", Some(-20), DayStatus::Complete),
        ];
        let adjustment = ManualAdjustment::new("acme", make_date("2026-02-03"), 45, "training").unwrap();
        let balance = accumulate_balance(
            ClosingType::BankOfHours,
            window,
            &summaries,
            &[adjustment],
            Some(&last),
        );

        assert_eq!(balance.prior_balance_minutes, 120);
        assert_eq!(balance.days_balance_minutes, -20);
        assert_eq!(balance.adjustments_minutes, 45);
        assert_eq!(balance.total_minutes, 145);
        assert_eq!(balance.total_hours(), Decimal::new(242, 2));
    }

    /// BA-003: summation is independent of input order
    #[test]
    fn test_ba_003_order_independent() {
        let window = BalanceWindow::new(make_date("2026-01-01"), make_date("2026-01-31"));
        let mut summaries = vec![
            summary("2026-01-05", Some(12), DayStatus::Complete),
            summary("2026-01-06", None, DayStatus::Incomplete),
            summary("2026-01-07", Some(-7), DayStatus::Complete),
            summary("2026-01-08", None, DayStatus::SequenceInvalid),
        ];
        let forward = accumulate_balance(ClosingType::Monthly, window, &summaries, &[], None);
        summaries.reverse();
        let backward = accumulate_balance(ClosingType::Monthly, window, &summaries, &[], None);
        assert_eq!(forward, backward);
    }

    #[test]
    fn test_missing_workday_counting() {
        let rules = BalanceRules::default();
        let today = make_date("2026-01-15");
        let past = summary("2026-01-14", Some(-480), DayStatus::NoRecords);
        let current = summary("2026-01-15", Some(-480), DayStatus::NoRecords);
        let worked = summary("2026-01-15", Some(0), DayStatus::Complete);

        assert!(counts_toward_balance(&past, today, &rules));
        assert!(!counts_toward_balance(&current, today, &rules));
        assert!(counts_toward_balance(&worked, today, &rules));

        let lenient = BalanceRules {
            count_missing_workdays: false,
        };
        assert!(!counts_toward_balance(&past, today, &lenient));
    }

    #[test]
    fn test_week_and_month_ranges() {
        // 2026-01-15 is a Thursday
        let week = week_range(make_date("2026-01-15"));
        assert_eq!(week.start, make_date("2026-01-12"));
        assert_eq!(week.end, make_date("2026-01-18"));
        assert_eq!(week.day_count(), 7);

        let february = month_range(make_date("2028-02-10"));
        assert_eq!(february.start, make_date("2028-02-01"));
        assert_eq!(february.end, make_date("2028-02-29"));

        let december = month_range(make_date("2026-12-31"));
        assert_eq!(december.end, make_date("2026-12-31"));
    }

    #[test]
    fn test_period_balance_totals() {
        let summaries = vec![
            summary("2026-01-12", Some(10), DayStatus::Complete),
            summary("2026-01-13", None, DayStatus::Incomplete),
            summary("2026-01-20", Some(60), DayStatus::Complete),
        ];
        let adjustment = ManualAdjustment::new("acme", make_date("2026-01-14"), -15, "late badge").unwrap();
        let week = period_balance(&summaries, &[adjustment], week_range(make_date("2026-01-12")));

        assert_eq!(week.worked_minutes, 490);
        assert_eq!(week.expected_minutes, 960);
        assert_eq!(week.balance_minutes, 10);
        assert_eq!(week.adjustments_minutes, -15);
        assert_eq!(week.net_minutes(), -5);
        assert_eq!(week.pending_days, vec![make_date("2026-01-13")]);
    }

    #[test]
    fn test_empty_window() {
        let window = BalanceWindow::new(make_date("2026-02-01"), make_date("2026-01-31"));
        assert!(window.is_empty());
        assert_eq!(window.day_count(), 0);
        assert_eq!(window.days().count(), 0);
    }
}
