//! Period closings.
//!
//! A closing freezes the accumulated balance of one type up to the day
//! before `as_of`. Later accumulation for that type starts after the
//! closing's `period_end`, so edits to frozen days no longer move the total.

use chrono::{NaiveDate, NaiveDateTime};
use tracing::{info, warn};
use uuid::Uuid;

use super::balance::BankBalance;
use crate::error::{EngineError, EngineResult};
use crate::models::{ClosingType, PeriodClosing};

/// The last day a closing requested for `as_of` freezes.
pub fn closing_period_end(as_of: NaiveDate) -> EngineResult<NaiveDate> {
    as_of.pred_opt().ok_or_else(|| EngineError::InvalidClosingPeriod {
        message: format!("no day precedes {}", as_of),
    })
}

/// Checks that `as_of` is not already covered by `last_closing`.
pub fn ensure_not_closed(
    closing_type: ClosingType,
    as_of: NaiveDate,
    last_closing: Option<&PeriodClosing>,
) -> EngineResult<()> {
    if let Some(last) = last_closing {
        // as_of == period_end + 1 would freeze an empty range
        if as_of <= last.period_end || last.period_end.succ_opt() == Some(as_of) {
            return Err(EngineError::PeriodAlreadyClosed {
                closing_type,
                as_of,
                closed_through: last.period_end,
            });
        }
    }
    Ok(())
}

/// Builds the snapshot for a closing of `balance`.
///
/// `balance` must have been accumulated for the same type through
/// `as_of - 1`. The returned closing carries the balance total as its
/// `prior_balance_minutes`; persisting it is up to the caller.
pub fn close_period(
    workspace_id: &str,
    as_of: NaiveDate,
    balance: &BankBalance,
    last_closing: Option<&PeriodClosing>,
    closed_at: NaiveDateTime,
    note: Option<String>,
) -> EngineResult<PeriodClosing> {
    let closing_type = balance.closing_type;
    ensure_not_closed(closing_type, as_of, last_closing)?;

    let period_end = closing_period_end(as_of)?;
    if balance.window.end != period_end {
        return Err(EngineError::InvalidClosingPeriod {
            message: format!(
                "balance accumulated through {}, closing as of {} needs {}",
                balance.window.end, as_of, period_end
            ),
        });
    }
    if balance.window.is_empty() {
        return Err(EngineError::InvalidClosingPeriod {
            message: format!(
                "nothing to close between {} and {}",
                balance.window.start, period_end
            ),
        });
    }

    if !balance.is_settled() {
        warn!(
            workspace_id = %workspace_id,
            closing_type = %closing_type,
            pending = balance.pending_days.len(),
            "Closing period with pending days; they are frozen at zero"
        );
    }

    let closing = PeriodClosing {
        id: Uuid::new_v4(),
        workspace_id: workspace_id.to_string(),
        closing_type,
        closing_date: as_of,
        period_start: balance.window.start,
        period_end,
        prior_balance_minutes: balance.total_minutes,
        closed_at,
        note,
    };

    info!(
        workspace_id = %workspace_id,
        closing_type = %closing_type,
        period_start = %closing.period_start,
        period_end = %closing.period_end,
        prior_balance_minutes = closing.prior_balance_minutes,
        "Period closed"
    );

    Ok(closing)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculation::balance::{BalanceWindow, accumulate_balance};

    fn make_date(date_str: &str) -> NaiveDate {
        NaiveDate::parse_from_str(date_str, "%Y-%m-%d").unwrap()
    }

    fn make_datetime(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap()
    }

    fn balance_through(start: &str, end: &str, last: Option<&PeriodClosing>) -> BankBalance {
        accumulate_balance(
            ClosingType::Monthly,
            BalanceWindow::new(make_date(start), make_date(end)),
            &[],
            &[],
            last,
        )
    }

    /// PC-001: closing freezes through the day before as_of
    #[test]
    fn test_pc_001_freezes_through_previous_day() {
        let balance = balance_through("2026-01-01", "2026-01-31", None);
        let closing = close_period(
            "acme",
            make_date("2026-02-01"),
            &balance,
            None,
            make_datetime("2026-02-01 08:00:00"),
            Some("January".to_string()),
        )
        .unwrap();

        assert_eq!(closing.period_start, make_date("2026-01-01"));
        assert_eq!(closing.period_end, make_date("2026-01-31"));
        assert_eq!(closing.closing_date, make_date("2026-02-01"));
        assert_eq!(closing.closing_type, ClosingType::Monthly);
        assert!(closing.covers(make_date("2026-01-31")));
        assert!(!closing.covers(make_date("2026-02-01")));
    }

    /// PC-002: closing again over a covered range is rejected
    #[test]
    fn test_pc_002_double_closing_rejected() {
        let balance = balance_through("2026-01-01", "2026-01-31", None);
        let first = close_period(
            "acme",
            make_date("2026-02-01"),
            &balance,
            None,
            make_datetime("2026-02-01 08:00:00"),
            None,
        )
        .unwrap();

        for as_of in ["2026-01-20", "2026-02-01"] {
            let result = ensure_not_closed(ClosingType::Monthly, make_date(as_of), Some(&first));
            match result {
                Err(EngineError::PeriodAlreadyClosed { closed_through, .. }) => {
                    assert_eq!(closed_through, make_date("2026-01-31"))
                }
                other => panic!("Expected PeriodAlreadyClosed, got {:?}", other),
            }
        }
        assert!(ensure_not_closed(ClosingType::Monthly, make_date("2026-02-02"), Some(&first)).is_ok());
    }

    /// PC-003: the next closing carries the previous total forward
    #[test]
    fn test_pc_003_chained_closing_carries_prior() {
        let mut first = close_period(
            "acme",
            make_date("2026-02-01"),
            &balance_through("2026-01-01", "2026-01-31", None),
            None,
            make_datetime("2026-02-01 08:00:00"),
            None,
        )
        .unwrap();
        first.prior_balance_minutes = 90;

        let second_balance = balance_through("2026-02-01", "2026-02-28", Some(&first));
        let second = close_period(
            "acme",
            make_date("2026-03-01"),
            &second_balance,
            Some(&first),
            make_datetime("2026-03-01 08:00:00"),
            None,
        )
        .unwrap();
        assert_eq!(second.period_start, make_date("2026-02-01"));
        assert_eq!(second.prior_balance_minutes, 90);
    }

    #[test]
    fn test_mismatched_balance_window_rejected() {
        let balance = balance_through("2026-01-01", "2026-01-15", None);
        let result = close_period(
            "acme",
            make_date("2026-02-01"),
            &balance,
            None,
            make_datetime("2026-02-01 08:00:00"),
            None,
        );
        assert!(matches!(result, Err(EngineError::InvalidClosingPeriod { .. })));
    }

    #[test]
    fn test_empty_window_rejected() {
        // Origin after the closing day
        let balance = balance_through("2026-02-10", "2026-01-31", None);
        let result = close_period(
            "acme",
            make_date("2026-02-01"),
            &balance,
            None,
            make_datetime("2026-02-01 08:00:00"),
            None,
        );
        assert!(matches!(result, Err(EngineError::InvalidClosingPeriod { .. })));
    }
}
