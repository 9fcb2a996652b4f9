//! Time entry model and audited edit operations.
//!
//! A [`TimeEntry`] is a single clock event. Entries are never mutated in
//! place: [`edit_entry`] returns an edited copy together with the
//! [`EntryAuditRecord`] that justifies it, and [`delete_entry`] only yields
//! the audit record the caller must persist alongside the removal.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{EngineError, EngineResult};

/// Direction of a clock event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// Clock-in.
    In,
    /// Clock-out.
    Out,
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Direction::In => write!(f, "IN"),
            Direction::Out => write!(f, "OUT"),
        }
    }
}

/// How an entry came into existence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntrySource {
    /// Captured live by the clock.
    #[default]
    Clock,
    /// Typed in by the user after the fact.
    Manual,
    /// Imported or reconstructed for a past date.
    Backfill,
}

/// Location captured with an entry.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    /// Latitude in decimal degrees.
    pub latitude: f64,
    /// Longitude in decimal degrees.
    pub longitude: f64,
}

/// A single clock-in or clock-out event.
///
/// # Example
///
/// ```
/// use timeclock_engine::models::{Direction, TimeEntry};
/// use chrono::NaiveDateTime;
///
/// let entry = TimeEntry::new(
///     "acme",
///     NaiveDateTime::parse_from_str("2026-01-15 08:00:00", "%Y-%m-%d %H:%M:%S").unwrap(),
///     Direction::In,
/// );
/// assert!(!entry.manually_edited);
/// assert_eq!(entry.date().to_string(), "2026-01-15");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeEntry {
    /// Unique identifier of the entry.
    pub id: Uuid,
    /// The employer workspace the entry belongs to.
    pub workspace_id: String,
    /// When the event happened (local wall time).
    pub timestamp: NaiveDateTime,
    /// IN or OUT.
    pub direction: Direction,
    /// Whether the entry went through an audited edit.
    #[serde(default)]
    pub manually_edited: bool,
    /// How the entry was created.
    #[serde(default)]
    pub source: EntrySource,
    /// Location captured with the entry, if any.
    #[serde(default)]
    pub location: Option<GeoPoint>,
    /// Optional free-text note.
    #[serde(default)]
    pub note: Option<String>,
}

impl TimeEntry {
    /// Creates a clock-captured entry with a fresh identifier.
    pub fn new(workspace_id: &str, timestamp: NaiveDateTime, direction: Direction) -> Self {
        Self {
            id: Uuid::new_v4(),
            workspace_id: workspace_id.to_string(),
            timestamp,
            direction,
            manually_edited: false,
            source: EntrySource::Clock,
            location: None,
            note: None,
        }
    }

    /// Sets how the entry was created.
    pub fn with_source(mut self, source: EntrySource) -> Self {
        self.source = source;
        self
    }

    /// Attaches a captured location.
    pub fn with_location(mut self, location: GeoPoint) -> Self {
        self.location = Some(location);
        self
    }

    /// Attaches a note.
    pub fn with_note(mut self, note: &str) -> Self {
        self.note = Some(note.to_string());
        self
    }

    /// The calendar day this entry is booked on.
    pub fn date(&self) -> NaiveDate {
        self.timestamp.date()
    }

    /// True when the entry did not come straight from the clock.
    pub fn is_manual(&self) -> bool {
        self.manually_edited || self.source != EntrySource::Clock
    }
}

/// Reason code required for editing or deleting an entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "code")]
pub enum MotiveCode {
    /// The user forgot to clock at the time.
    ForgotToClock,
    /// The recorded time was wrong.
    WrongTime,
    /// The device or app failed to record.
    DeviceFailure,
    /// Work was performed off-site.
    ExternalWork,
    /// Any other reason; the detail is mandatory.
    Other {
        /// Free-text explanation.
        detail: String,
    },
}

/// Short label for a motive code.
pub fn motive_label(motive: &MotiveCode) -> &'static str {
    match motive {
        MotiveCode::ForgotToClock => "Forgot to clock",
        MotiveCode::WrongTime => "Wrong time recorded",
        MotiveCode::DeviceFailure => "Device failure",
        MotiveCode::ExternalWork => "External work",
        MotiveCode::Other { .. } => "Other",
    }
}

fn check_motive(motive: &MotiveCode, entry_id: Uuid) -> EngineResult<()> {
    match motive {
        MotiveCode::Other { detail } if detail.trim().is_empty() => {
            Err(EngineError::MissingJustification {
                context: format!("motive 'other' for entry {}", entry_id),
            })
        }
        _ => Ok(()),
    }
}

/// The audited action applied to an entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "action")]
pub enum AuditAction {
    /// The timestamp was changed.
    Edited {
        /// Timestamp before the edit.
        previous_timestamp: NaiveDateTime,
        /// Timestamp after the edit.
        new_timestamp: NaiveDateTime,
    },
    /// The entry was removed.
    Deleted {
        /// Timestamp of the removed entry.
        timestamp: NaiveDateTime,
    },
}

/// Audit log record for an edit or deletion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryAuditRecord {
    /// The entry that was changed.
    pub entry_id: Uuid,
    /// The workspace of the entry.
    pub workspace_id: String,
    /// What happened.
    pub action: AuditAction,
    /// Why it happened.
    pub motive: MotiveCode,
    /// When the change was recorded.
    pub recorded_at: NaiveDateTime,
}

/// Edits an entry's timestamp under a motive code.
///
/// Returns the edited copy, flagged as manually edited, and the audit record
/// to persist with it. Fails when the motive is `Other` with a blank detail,
/// or when the new timestamp equals the current one.
pub fn edit_entry(
    entry: &TimeEntry,
    new_timestamp: NaiveDateTime,
    motive: MotiveCode,
    recorded_at: NaiveDateTime,
) -> EngineResult<(TimeEntry, EntryAuditRecord)> {
    check_motive(&motive, entry.id)?;
    if new_timestamp == entry.timestamp {
        return Err(EngineError::InvalidEntry {
            entry_id: entry.id,
            message: "edit does not change the timestamp".to_string(),
        });
    }

    let mut edited = entry.clone();
    edited.timestamp = new_timestamp;
    edited.manually_edited = true;

    let record = EntryAuditRecord {
        entry_id: entry.id,
        workspace_id: entry.workspace_id.clone(),
        action: AuditAction::Edited {
            previous_timestamp: entry.timestamp,
            new_timestamp,
        },
        motive,
        recorded_at,
    };
    Ok((edited, record))
}

/// Produces the audit record for deleting an entry.
pub fn delete_entry(
    entry: &TimeEntry,
    motive: MotiveCode,
    recorded_at: NaiveDateTime,
) -> EngineResult<EntryAuditRecord> {
    check_motive(&motive, entry.id)?;
    Ok(EntryAuditRecord {
        entry_id: entry.id,
        workspace_id: entry.workspace_id.clone(),
        action: AuditAction::Deleted {
            timestamp: entry.timestamp,
        },
        motive,
        recorded_at,
    })
}
