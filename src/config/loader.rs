//! Configuration loading functionality.
//!
//! This module provides the [`ConfigLoader`] type for loading the engine
//! configuration and workspace schedules from YAML files.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::error::{EngineError, EngineResult};

use super::schedule_history::ScheduleHistory;
use super::types::{EngineConfig, ScheduleFile};

/// Loads and provides access to engine configuration.
///
/// # Directory Structure
///
/// The configuration directory should have the following structure:
/// ```text
/// config/default/
/// ├── engine.yaml        # Day limits, validator thresholds, balance rules
/// └── schedules/
///     └── acme.yaml      # Schedule versions of one workspace
/// ```
///
/// # Example
///
/// ```no_run
/// use timeclock_engine::config::ConfigLoader;
/// use chrono::NaiveDate;
///
/// let loader = ConfigLoader::load("./config/default").unwrap();
/// let date = NaiveDate::from_ymd_opt(2026, 1, 15).unwrap();
/// let version = loader.schedule("acme").unwrap().resolve(date).unwrap();
/// println!("Version {} applies", version.sequence);
/// ```
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    config: EngineConfig,
    schedules: HashMap<String, ScheduleHistory>,
}

impl ConfigLoader {
    /// Loads configuration from the specified directory.
    ///
    /// # Returns
    ///
    /// Returns a `ConfigLoader` instance on success, or an error if:
    /// - `engine.yaml` or the `schedules` directory is missing
    /// - Any file contains invalid YAML
    /// - Two schedule versions of a workspace overlap
    pub fn load<P: AsRef<Path>>(path: P) -> EngineResult<Self> {
        let path = path.as_ref();

        let config = Self::load_yaml::<EngineConfig>(&path.join("engine.yaml"))?;
        let schedules = Self::load_schedules(&path.join("schedules"))?;

        Ok(Self { config, schedules })
    }

    /// Loads and parses a YAML file.
    fn load_yaml<T: serde::de::DeserializeOwned>(path: &Path) -> EngineResult<T> {
        let path_str = path.display().to_string();

        let content = fs::read_to_string(path).map_err(|_| EngineError::ConfigNotFound {
            path: path_str.clone(),
        })?;

        serde_yaml::from_str(&content).map_err(|e| EngineError::ConfigParseError {
            path: path_str,
            message: e.to_string(),
        })
    }

    /// Loads every schedule file of the schedules directory.
    fn load_schedules(schedules_dir: &Path) -> EngineResult<HashMap<String, ScheduleHistory>> {
        let schedules_dir_str = schedules_dir.display().to_string();

        let entries = fs::read_dir(schedules_dir).map_err(|_| EngineError::ConfigNotFound {
            path: schedules_dir_str.clone(),
        })?;

        let mut schedules = HashMap::new();

        for entry in entries {
            let entry = entry.map_err(|_| EngineError::ConfigNotFound {
                path: schedules_dir_str.clone(),
            })?;

            let path = entry.path();
            if !path.extension().is_some_and(|ext| ext == "yaml") {
                continue;
            }

            let file = Self::load_yaml::<ScheduleFile>(&path)?;
            let versions = file
                .versions
                .into_iter()
                .map(|mut v| {
                    if v.workspace_id.is_empty() {
                        v.workspace_id = file.workspace_id.clone();
                    }
                    v
                })
                .collect();
            let history = ScheduleHistory::from_versions(&file.workspace_id, versions)?;

            if schedules.insert(file.workspace_id.clone(), history).is_some() {
                return Err(EngineError::InvalidSchedule {
                    message: format!(
                        "workspace '{}' defined by more than one schedule file",
                        file.workspace_id
                    ),
                });
            }
        }

        Ok(schedules)
    }

    /// Returns the engine configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Returns every loaded schedule history, keyed by workspace.
    pub fn schedules(&self) -> &HashMap<String, ScheduleHistory> {
        &self.schedules
    }

    /// Gets the schedule history of a workspace.
    pub fn schedule(&self, workspace_id: &str) -> Option<&ScheduleHistory> {
        self.schedules.get(workspace_id)
    }

    /// Splits the loader into its configuration and schedules.
    pub fn into_parts(self) -> (EngineConfig, HashMap<String, ScheduleHistory>) {
        (self.config, self.schedules)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveTime, Weekday};

    fn config_path() -> &'static str {
        "./config/default"
    }

    #[test]
    fn test_load_valid_configuration() {
        let result = ConfigLoader::load(config_path());
        assert!(result.is_ok(), "Failed to load config: {:?}", result.err());

        let loader = result.unwrap();
        assert_eq!(loader.config().day.max_entries_per_day, 10);
        assert_eq!(loader.config().day.break_leniency_minutes, 10);
        assert_eq!(loader.config().validation.legal_break_minutes, 60);
        assert!(loader.config().balance.count_missing_workdays);
    }

    #[test]
    fn test_schedule_versions_loaded() {
        let loader = ConfigLoader::load(config_path()).unwrap();
        let history = loader.schedule("acme").expect("acme schedule");

        assert_eq!(history.versions().len(), 2);
        assert_eq!(history.origin(), NaiveDate::from_ymd_opt(2026, 1, 1));
        // The first version is closed by the second one
        assert_eq!(
            history.versions()[0].effective_end,
            NaiveDate::from_ymd_opt(2026, 6, 30)
        );
        assert!(history.versions().iter().all(|v| v.workspace_id == "acme"));
    }

    #[test]
    fn test_day_config_from_yaml() {
        let loader = ConfigLoader::load(config_path()).unwrap();
        let history = loader.schedule("acme").unwrap();

        // 2026-01-15 is a Thursday
        let version = history.resolve(NaiveDate::from_ymd_opt(2026, 1, 15).unwrap()).unwrap();
        let thursday = version.day_config(NaiveDate::from_ymd_opt(2026, 1, 15).unwrap());
        assert_eq!(thursday.weekday, Weekday::Thu);
        assert_eq!(thursday.expected_minutes(), 492);
        assert_eq!(thursday.minimum_break_minutes, 60);
        assert_eq!(thursday.tolerance_minutes, 15);
        assert_eq!(thursday.ideal_break_start, NaiveTime::from_hms_opt(12, 0, 0));
        assert_eq!(version.max_daily_minutes, Some(600));

        // 2026-01-17 is a Saturday
        let saturday = version.day_config(NaiveDate::from_ymd_opt(2026, 1, 17).unwrap());
        assert_eq!(saturday.expected_minutes(), 0);
    }

    #[test]
    fn test_unknown_workspace_has_no_schedule() {
        let loader = ConfigLoader::load(config_path()).unwrap();
        assert!(loader.schedule("globex").is_none());
    }

    #[test]
    fn test_load_missing_directory_returns_error() {
        let result = ConfigLoader::load("/nonexistent/path");
        assert!(result.is_err());

        match result {
            Err(EngineError::ConfigNotFound { path }) => {
                assert!(path.contains("engine.yaml"));
            }
            _ => panic!("Expected ConfigNotFound error"),
        }
    }
}
