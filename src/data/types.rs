use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::consensus::types::ConsensusCandidate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Direction::Up => write!(f, "up"),
            Direction::Down => write!(f, "down"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Timeframe {
    EndOfDay,
    EndOfWeek,
    EndOfMonth,
    #[serde(other)]
    Other,
}

/// One forecaster's call on one subject for the day.
///
/// Sports-style records share the batch file but carry no ticker, direction or
/// prices, so those fields are optional here and filtered by the grouper.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionRecord {
    pub id: String,
    #[serde(default)]
    pub ticker: Option<String>,
    #[serde(default)]
    pub direction: Option<Direction>,
    #[serde(default)]
    pub confidence: Option<f64>,
    #[serde(default)]
    pub target_price: Option<f64>,
    #[serde(default, rename = "current_price_at_prediction", alias = "entry_price")]
    pub entry_price: Option<f64>,
    #[serde(default)]
    pub timeframe: Option<Timeframe>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub reasoning: Option<String>,
}

impl PredictionRecord {
    /// Non-blank ticker, if the record names one.
    pub fn ticker(&self) -> Option<&str> {
        self.ticker.as_deref().map(str::trim).filter(|t| !t.is_empty())
    }
}

/// Daily prediction file for a single forecaster.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PredictionBatch {
    #[serde(default)]
    pub model_display_name: Option<String>,
    #[serde(default)]
    pub market_context: Option<String>,
    #[serde(default)]
    pub predictions: Vec<PredictionRecord>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SettlementStatus {
    #[serde(alias = "unresolved")]
    Pending,
    Resolved,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SettlementResult {
    pub prediction_id: String,
    pub status: SettlementStatus,
    #[serde(default)]
    pub direction_correct: Option<bool>,
    #[serde(default)]
    pub score: Option<f64>,
    #[serde(default)]
    pub actual_close: Option<f64>,
    #[serde(default)]
    pub model_display_name: Option<String>,
    #[serde(default)]
    pub ticker: Option<String>,
    #[serde(default, rename = "confidence_at_prediction", alias = "confidence")]
    pub confidence: Option<f64>,
}

impl SettlementResult {
    /// Resolved with both a correctness outcome and a score.
    pub fn is_resolved(&self) -> bool {
        self.status == SettlementStatus::Resolved
            && self.direction_correct.is_some()
            && self.score.is_some()
    }
}

/// Daily settlement file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SettlementBatch {
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub results: Vec<SettlementResult>,
}

impl SettlementBatch {
    /// Index results by `prediction_id`. Later duplicates replace earlier ones.
    pub fn by_prediction_id(&self) -> HashMap<&str, &SettlementResult> {
        self.results
            .iter()
            .map(|r| (r.prediction_id.as_str(), r))
            .collect()
    }

    /// Results attributed to one forecaster, in file order.
    pub fn results_for_model(&self, display_name: &str) -> Vec<SettlementResult> {
        self.results
            .iter()
            .filter(|r| r.model_display_name.as_deref() == Some(display_name))
            .cloned()
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeeklyScore {
    pub week: String,
    pub score: f64,
    #[serde(default)]
    pub predictions: u32,
    #[serde(default)]
    pub accuracy: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecasterSummary {
    pub model_id: String,
    #[serde(default)]
    pub model_display_name: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub total_score: f64,
    #[serde(default)]
    pub direction_accuracy: Option<f64>,
    #[serde(default)]
    pub total_predictions: u32,
    #[serde(default)]
    pub correct_directions: Option<u32>,
    #[serde(default)]
    pub avg_confidence: f64,
    #[serde(default)]
    pub current_streak: i32,
    #[serde(default)]
    pub best_streak: i32,
    #[serde(default)]
    pub worst_streak: i32,
    #[serde(default)]
    pub weekly_scores: Vec<WeeklyScore>,
}

impl ForecasterSummary {
    /// Name used on charts and in consensus model lists.
    pub fn label(&self) -> &str {
        self.model_display_name.as_deref().unwrap_or(&self.model_id)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeaderboardSnapshot {
    pub last_updated: DateTime<Utc>,
    #[serde(default)]
    pub models: Vec<ForecasterSummary>,
}

/// Published winner for the day, written by the batch process.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WinnerFile {
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub winner: Option<ConsensusCandidate>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeeklyModelScore {
    pub model: String,
    pub weekly_score: f64,
    #[serde(default)]
    pub predictions: u32,
    #[serde(default)]
    pub accuracy: f64,
    #[serde(default)]
    pub rank_change: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotableCall {
    pub model: String,
    pub ticker: String,
    #[serde(default)]
    pub score: Option<f64>,
    #[serde(default)]
    pub summary: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsensusAccuracy {
    pub total_consensus_calls: u32,
    pub consensus_correct: u32,
    pub accuracy: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeeklySummary {
    pub week: String,
    #[serde(default)]
    pub period: Option<String>,
    #[serde(default)]
    pub headline: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub scores: Vec<WeeklyModelScore>,
    #[serde(default)]
    pub best_call: Option<NotableCall>,
    #[serde(default)]
    pub worst_call: Option<NotableCall>,
    #[serde(default)]
    pub consensus_accuracy: Option<ConsensusAccuracy>,
}
