//! Workday calculation and bank-of-hours engine for clock-in/out tracking
//!
//! This crate turns timestamped clock entries, versioned workday schedules
//! and absence markers into day summaries with a consistency status, and
//! folds those days into weekly, monthly and bank-of-hours balances that
//! period closings freeze.

#![warn(missing_docs)]

pub mod calculation;
pub mod config;
pub mod engine;
pub mod error;
pub mod models;
pub mod store;
