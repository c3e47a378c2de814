//! Market Oracle
//!
//! Aggregation and scoring core for a daily multi-forecaster prediction board:
//! consensus pick selection, leaderboard ranking with streaks, and cumulative
//! score series for charting. Everything under `consensus` and `scoring` is a
//! pure function of its inputs.

pub mod config;
pub mod consensus;
pub mod data;
pub mod numeric;
pub mod prefs;
pub mod report;
pub mod scoring;
pub mod simulator;
