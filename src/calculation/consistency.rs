//! Consistency validation of a day's entries.
//!
//! Each rule inspects every entry of the day and yields at most one
//! [`Inconsistency`] for it. Severity is looked up from the kind;
//! HIGH findings are blocking and are enforced by [`admit_entry`].

use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;

use crate::config::{DayLimits, ValidationRules};
use crate::error::{EngineError, EngineResult};
use crate::models::{Direction, ScheduleVersion, TimeEntry};

/// How serious a finding is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Severity {
    /// Informational.
    Low,
    /// Warning.
    Medium,
    /// Blocking.
    High,
}

/// The kind of inconsistency found.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InconsistencyKind {
    /// OUT with no IN before it.
    OutWithoutIn,
    /// IN directly after an IN.
    DuplicateIn,
    /// OUT directly after an OUT.
    DuplicateOut,
    /// Timestamp in the future.
    FutureEntry,
    /// Returned from a break shorter than the legal minimum after a long shift.
    InsufficientLegalBreak,
    /// Entry older than the configured cutoff.
    EntryTooOld,
    /// Pause implausibly long.
    BreakTooLong,
    /// Entry beyond the daily maximum count.
    ExcessEntries,
    /// Cumulative work passed the daily cap.
    MaxDailyExceeded,
    /// Too little rest since the previous day.
    InsufficientRest,
    /// Pause implausibly short.
    BreakTooShort,
    /// Required location missing.
    MissingLocation,
    /// Manually edited or backfilled entry.
    ManualEntry,
}

/// Severity of each kind.
pub fn severity(kind: InconsistencyKind) -> Severity {
    use InconsistencyKind::*;
    match kind {
        OutWithoutIn | DuplicateIn | DuplicateOut | FutureEntry | InsufficientLegalBreak => {
            Severity::High
        }
        EntryTooOld | BreakTooLong | ExcessEntries | MaxDailyExceeded | InsufficientRest => {
            Severity::Medium
        }
        BreakTooShort | MissingLocation | ManualEntry => Severity::Low,
    }
}

/// Stable code of each kind.
pub fn inconsistency_code(kind: InconsistencyKind) -> &'static str {
    use InconsistencyKind::*;
    match kind {
        OutWithoutIn => "OUT_WITHOUT_IN",
        DuplicateIn => "DUPLICATE_IN",
        DuplicateOut => "DUPLICATE_OUT",
        FutureEntry => "FUTURE_ENTRY",
        InsufficientLegalBreak => "INSUFFICIENT_LEGAL_BREAK",
        EntryTooOld => "ENTRY_TOO_OLD",
        BreakTooLong => "BREAK_TOO_LONG",
        ExcessEntries => "EXCESS_ENTRIES",
        MaxDailyExceeded => "MAX_DAILY_EXCEEDED",
        InsufficientRest => "INSUFFICIENT_REST",
        BreakTooShort => "BREAK_TOO_SHORT",
        MissingLocation => "MISSING_LOCATION",
        ManualEntry => "MANUAL_ENTRY",
    }
}

/// A single finding about one entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Inconsistency {
    /// What was found.
    pub kind: InconsistencyKind,
    /// The entry the finding is about.
    pub entry_id: Uuid,
    /// Human-readable detail.
    pub detail: String,
}

impl Inconsistency {
    fn new(kind: InconsistencyKind, entry: &TimeEntry, detail: String) -> Self {
        Self {
            kind,
            entry_id: entry.id,
            detail,
        }
    }

    /// Severity of the finding.
    pub fn severity(&self) -> Severity {
        severity(self.kind)
    }

    /// Stable code of the finding.
    pub fn code(&self) -> &'static str {
        inconsistency_code(self.kind)
    }

    /// Whether the finding refuses the entry.
    pub fn is_blocking(&self) -> bool {
        self.severity() == Severity::High
    }
}

/// Context for validating one day.
#[derive(Debug, Clone, Copy)]
pub struct ValidationContext<'a> {
    /// The current instant.
    pub now: NaiveDateTime,
    /// Validator thresholds.
    pub rules: &'a ValidationRules,
    /// Day limits (maximum entry count).
    pub limits: &'a DayLimits,
    /// The schedule version covering the day, if known.
    pub schedule: Option<&'a ScheduleVersion>,
    /// The previous day's last OUT, for the rest rule.
    pub previous_day_last_out: Option<NaiveDateTime>,
}

/// Validates a day's entries.
///
/// Entries are sorted by timestamp first. The returned list holds every
/// finding, ordered by entry then rule; callers decide whether to block or
/// warn based on [`Inconsistency::severity`].
pub fn validate_entries(entries: &[TimeEntry], ctx: &ValidationContext<'_>) -> Vec<Inconsistency> {
    let mut sorted = entries.to_vec();
    sorted.sort_by_key(|e| e.timestamp);

    let mut findings = Vec::new();
    let mut previous: Option<&TimeEntry> = None;
    let mut worked_before = 0_i64;
    let mut legal_break_taken = false;
    let mut max_daily_flagged = false;
    let mut open_since: Option<NaiveDateTime> = None;

    for (index, entry) in sorted.iter().enumerate() {
        let mut push = |kind: InconsistencyKind, detail: String| {
            findings.push(Inconsistency::new(kind, entry, detail));
        };

        // Sequencing
        match (entry.direction, previous.map(|p| p.direction)) {
            (Direction::Out, None) => push(
                InconsistencyKind::OutWithoutIn,
                format!("OUT at {} has no IN before it", entry.timestamp.time()),
            ),
            (Direction::In, Some(Direction::In)) => push(
                InconsistencyKind::DuplicateIn,
                format!("IN at {} follows another IN", entry.timestamp.time()),
            ),
            (Direction::Out, Some(Direction::Out)) => push(
                InconsistencyKind::DuplicateOut,
                format!("OUT at {} follows another OUT", entry.timestamp.time()),
            ),
            _ => {}
        }

        // Timing against the clock
        let grace = Duration::minutes(ctx.rules.future_grace_minutes);
        if entry.timestamp > ctx.now + grace {
            push(
                InconsistencyKind::FutureEntry,
                format!("entry at {} is in the future", entry.timestamp),
            );
        }
        let age_days = (ctx.now.date() - entry.date()).num_days();
        if age_days > ctx.rules.past_entry_cutoff_days {
            push(
                InconsistencyKind::EntryTooOld,
                format!(
                    "entry is {} days old, beyond the {} day cutoff",
                    age_days, ctx.rules.past_entry_cutoff_days
                ),
            );
        }

        // Pauses, measured on an IN returning from an OUT
        if let (Direction::In, Some(prev)) = (entry.direction, previous) {
            if prev.direction == Direction::Out {
                let pause = (entry.timestamp - prev.timestamp).num_minutes();
                if pause < ctx.rules.legal_break_minutes
                    && worked_before >= ctx.rules.long_shift_minutes
                    && !legal_break_taken
                {
                    push(
                        InconsistencyKind::InsufficientLegalBreak,
                        format!(
                            "{} minute break after {} worked minutes; {} required",
                            pause, worked_before, ctx.rules.legal_break_minutes
                        ),
                    );
                }
                if pause >= ctx.rules.legal_break_minutes {
                    legal_break_taken = true;
                }
                if pause < ctx.rules.min_plausible_break_minutes {
                    push(
                        InconsistencyKind::BreakTooShort,
                        format!("{} minute break is implausibly short", pause),
                    );
                } else if pause > ctx.rules.max_plausible_break_minutes {
                    push(
                        InconsistencyKind::BreakTooLong,
                        format!("{} minute break is implausibly long", pause),
                    );
                }
            }
        }

        // Work accumulation
        match entry.direction {
            Direction::In => open_since = Some(entry.timestamp),
            Direction::Out => {
                if let Some(start) = open_since.take() {
                    worked_before += (entry.timestamp - start).num_minutes();
                }
                if let Some(max) = ctx.schedule.and_then(|s| s.max_daily_minutes) {
                    if worked_before > max && !max_daily_flagged {
                        max_daily_flagged = true;
                        push(
                            InconsistencyKind::MaxDailyExceeded,
                            format!("{} minutes worked exceeds the {} minute cap", worked_before, max),
                        );
                    }
                }
            }
        }

        // Count
        if index == ctx.limits.max_entries_per_day {
            push(
                InconsistencyKind::ExcessEntries,
                format!("more than {} entries on the day", ctx.limits.max_entries_per_day),
            );
        }

        // Rest since the previous day
        if index == 0 && entry.direction == Direction::In {
            let min_rest = ctx.schedule.and_then(|s| s.min_rest_between_shifts_minutes);
            if let (Some(min_rest), Some(last_out)) = (min_rest, ctx.previous_day_last_out) {
                let rest = (entry.timestamp - last_out).num_minutes();
                if rest < min_rest {
                    push(
                        InconsistencyKind::InsufficientRest,
                        format!("{} minutes of rest since the previous day; {} required", rest, min_rest),
                    );
                }
            }
        }

        // Capture quality
        if ctx.rules.require_location && entry.location.is_none() {
            push(
                InconsistencyKind::MissingLocation,
                "no location captured".to_string(),
            );
        }
        if entry.is_manual() {
            push(
                InconsistencyKind::ManualEntry,
                format!("{:?} entry, edited: {}", entry.source, entry.manually_edited),
            );
        }

        previous = Some(entry);
    }

    findings
}

/// Validates a candidate entry against the day it would join.
///
/// Fails with [`EngineError::BlockingInconsistency`] when adding the
/// candidate raises a HIGH finding the day did not already carry, on the
/// candidate or on any other entry, and no override justification is
/// given. Fails with
/// [`EngineError::MissingJustification`] when the override is blank.
/// Otherwise returns every finding of the day as advisories.
///
/// # Examples
///
/// ```
/// use timeclock_engine::calculation::{ValidationContext, admit_entry};
/// use timeclock_engine::config::{DayLimits, ValidationRules};
/// use timeclock_engine::models::{Direction, TimeEntry};
/// use chrono::NaiveDateTime;
///
/// let at = |s: &str| NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M").unwrap();
/// let rules = ValidationRules::default();
/// let limits = DayLimits::default();
/// let ctx = ValidationContext {
///     now: at("2026-01-15 12:00"),
///     rules: &rules,
///     limits: &limits,
///     schedule: None,
///     previous_day_last_out: None,
/// };
///
/// let existing = vec![TimeEntry::new("acme", at("2026-01-15 08:00"), Direction::In)];
/// let duplicate = TimeEntry::new("acme", at("2026-01-15 09:00"), Direction::In);
///
/// assert!(admit_entry(&existing, &duplicate, &ctx, None).is_err());
/// assert!(admit_entry(&existing, &duplicate, &ctx, Some("clocked twice on purpose")).is_ok());
/// ```
pub fn admit_entry(
    existing: &[TimeEntry],
    candidate: &TimeEntry,
    ctx: &ValidationContext<'_>,
    override_justification: Option<&str>,
) -> EngineResult<Vec<Inconsistency>> {
    let mut day: Vec<TimeEntry> = existing
        .iter()
        .filter(|e| e.id != candidate.id)
        .cloned()
        .collect();
    let before = validate_entries(&day, ctx);
    day.push(candidate.clone());

    // A backfilled entry can move a finding onto its neighbour
    let findings = validate_entries(&day, ctx);
    let blocking = findings.iter().find(|f| {
        f.is_blocking()
            && !before
                .iter()
                .any(|b| b.kind == f.kind && b.entry_id == f.entry_id)
    });

    if let Some(finding) = blocking {
        match override_justification {
            None => {
                warn!(
                    entry_id = %candidate.id,
                    code = finding.code(),
                    "Entry refused by blocking inconsistency"
                );
                return Err(EngineError::BlockingInconsistency {
                    code: finding.code().to_string(),
                    detail: finding.detail.clone(),
                });
            }
            Some(justification) if justification.trim().is_empty() => {
                return Err(EngineError::MissingJustification {
                    context: format!("override of {}", finding.code()),
                });
            }
            Some(justification) => {
                warn!(
                    entry_id = %candidate.id,
                    code = finding.code(),
                    justification = %justification,
                    "Blocking inconsistency overridden"
                );
            }
        }
    }

    Ok(findings)
}
