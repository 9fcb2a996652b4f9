//! Versioned schedule resolution.
//!
//! [`ScheduleHistory`] keeps a workspace's [`ScheduleVersion`]s as a sorted
//! list of non-overlapping date ranges. Overlaps are rejected when a version
//! is inserted, so resolution never has to pick between candidates.

use chrono::{Days, NaiveDate};

use crate::error::{EngineError, EngineResult};
use crate::models::ScheduleVersion;

/// The effective-dated schedule versions of one workspace.
///
/// # Example
///
/// ```
/// use timeclock_engine::config::ScheduleHistory;
/// use timeclock_engine::models::ScheduleVersion;
/// use chrono::NaiveDate;
///
/// let jan = NaiveDate::from_ymd_opt(2026, 1, 1).unwrap();
/// let mar = NaiveDate::from_ymd_opt(2026, 3, 1).unwrap();
///
/// let mut history = ScheduleHistory::new("acme");
/// history.insert(ScheduleVersion::new("acme", jan)).unwrap();
/// history.insert(ScheduleVersion::new("acme", mar)).unwrap();
///
/// // The January version was closed the day before March started
/// let first = &history.versions()[0];
/// assert_eq!(first.effective_end, NaiveDate::from_ymd_opt(2026, 2, 28));
/// assert_eq!(history.resolve(mar).unwrap().sequence, 2);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScheduleHistory {
    workspace_id: String,
    versions: Vec<ScheduleVersion>,
}

impl ScheduleHistory {
    /// Creates an empty history.
    pub fn new(workspace_id: &str) -> Self {
        Self {
            workspace_id: workspace_id.to_string(),
            versions: Vec::new(),
        }
    }

    /// Builds a history from versions in any order.
    ///
    /// Versions are inserted by start date, so each open-ended version is
    /// closed by its successor; explicit overlaps are rejected.
    pub fn from_versions(workspace_id: &str, versions: Vec<ScheduleVersion>) -> EngineResult<Self> {
        let mut sorted = versions;
        sorted.sort_by(|a, b| a.effective_start.cmp(&b.effective_start));

        let mut history = Self::new(workspace_id);
        for version in sorted {
            history.insert(version)?;
        }
        Ok(history)
    }

    /// The workspace this history belongs to.
    pub fn workspace_id(&self) -> &str {
        &self.workspace_id
    }

    /// All versions, oldest first.
    pub fn versions(&self) -> &[ScheduleVersion] {
        &self.versions
    }

    /// The first date covered by any version.
    pub fn origin(&self) -> Option<NaiveDate> {
        self.versions.first().map(|v| v.effective_start)
    }

    /// Inserts a version.
    ///
    /// A version starting after an open-ended latest version closes it to the
    /// day before the new start. Any other overlap, including an open-ended
    /// version that is not the latest, is a [`EngineError::ScheduleOverlap`].
    /// Sequence numbers are reassigned in start order.
    pub fn insert(&mut self, version: ScheduleVersion) -> EngineResult<()> {
        if version.workspace_id != self.workspace_id {
            return Err(EngineError::InvalidSchedule {
                message: format!(
                    "version for workspace '{}' added to history of '{}'",
                    version.workspace_id, self.workspace_id
                ),
            });
        }
        if version
            .effective_end
            .is_some_and(|end| end < version.effective_start)
        {
            return Err(EngineError::InvalidSchedule {
                message: format!(
                    "version ends {} before it starts {}",
                    version.effective_end.map(|d| d.to_string()).unwrap_or_default(),
                    version.effective_start
                ),
            });
        }

        if let Some(latest) = self.versions.last_mut() {
            if latest.effective_end.is_none() && latest.effective_start < version.effective_start {
                latest.effective_end = version.effective_start.checked_sub_days(Days::new(1));
            }
        }

        if let Some(existing) = self.versions.iter().find(|v| v.overlaps(&version)) {
            return Err(EngineError::ScheduleOverlap {
                workspace_id: self.workspace_id.clone(),
                existing_start: existing.effective_start,
                new_start: version.effective_start,
            });
        }

        let position = self
            .versions
            .partition_point(|v| v.effective_start < version.effective_start);
        self.versions.insert(position, version);
        for (index, v) in self.versions.iter_mut().enumerate() {
            v.sequence = index as u32 + 1;
        }
        Ok(())
    }

    /// Finds the version covering `date`.
    pub fn resolve(&self, date: NaiveDate) -> EngineResult<&ScheduleVersion> {
        self.find(date).ok_or_else(|| EngineError::NoScheduleVersion {
            workspace_id: self.workspace_id.clone(),
            date,
        })
    }

    /// Finds the version covering `date`, if any.
    pub fn find(&self, date: NaiveDate) -> Option<&ScheduleVersion> {
        let after = self.versions.partition_point(|v| v.effective_start <= date);
        after
            .checked_sub(1)
            .map(|index| &self.versions[index])
            .filter(|v| v.contains(date))
    }
}
