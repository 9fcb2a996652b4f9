//! Configuration loading and management for the time-clock engine.
//!
//! This module provides the engine-wide [`EngineConfig`], the versioned
//! [`ScheduleHistory`] of each workspace, and the [`ConfigLoader`] that
//! reads both from YAML files.
//!
//! # Example
//!
//! ```no_run
//! use timeclock_engine::config::ConfigLoader;
//!
//! let loader = ConfigLoader::load("./config/default").unwrap();
//! println!("Max entries per day: {}", loader.config().day.max_entries_per_day);
//! ```

mod loader;
mod schedule_history;
mod types;

pub use loader::ConfigLoader;
pub use schedule_history::ScheduleHistory;
pub use types::{BalanceRules, DayLimits, EngineConfig, ScheduleFile, ValidationRules};
