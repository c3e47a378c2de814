use futures::future::join_all;
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::config::ForecasterEntry;
use crate::consensus::grouper::ForecasterBatch;
use crate::data::types::{
    LeaderboardSnapshot, PredictionBatch, SettlementBatch, WeeklySummary, WinnerFile,
};
use crate::simulator::types::SimulatorState;

#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {path}: {source}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

impl LoadError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, LoadError::Io { source, .. } if source.kind() == std::io::ErrorKind::NotFound)
    }
}

/// Everything the daily view needs. Any piece that failed to load is absent.
#[derive(Debug, Clone, Default)]
pub struct DailyInputs {
    pub date: String,
    /// Loaded batches, in roster order.
    pub batches: Vec<ForecasterBatch>,
    pub settlements: Option<SettlementBatch>,
    pub published_winner: Option<WinnerFile>,
}

/// Reader for the published data directory layout.
#[derive(Debug, Clone)]
pub struct DataStore {
    root: PathBuf,
}

impl DataStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    async fn read_json<T: DeserializeOwned>(&self, rel: &str) -> Result<T, LoadError> {
        let path = self.root.join(rel);
        let display = path.display().to_string();

        let contents = tokio::fs::read_to_string(&path)
            .await
            .map_err(|source| LoadError::Io { path: display.clone(), source })?;

        serde_json::from_str(&contents).map_err(|source| LoadError::Json { path: display, source })
    }

    pub async fn load_leaderboard(&self) -> Result<LeaderboardSnapshot, LoadError> {
        self.read_json("leaderboard.json").await
    }

    pub async fn load_predictions(&self, date: &str, forecaster: &str) -> Result<PredictionBatch, LoadError> {
        self.read_json(&format!("predictions/{}/{}.json", date, forecaster)).await
    }

    pub async fn load_scores(&self, date: &str) -> Result<SettlementBatch, LoadError> {
        self.read_json(&format!("scores/{}.json", date)).await
    }

    pub async fn load_winner(&self) -> Result<WinnerFile, LoadError> {
        self.read_json("winner-today.json").await
    }

    pub async fn load_weekly_summary(&self, week: &str) -> Result<WeeklySummary, LoadError> {
        self.read_json(&format!("summaries/weekly/{}.json", week)).await
    }

    pub async fn load_simulator(&self) -> Result<SimulatorState, LoadError> {
        self.read_json("simulator.json").await
    }

    /// Load one day's inputs. Batches are fetched concurrently; failures are
    /// logged and leave that forecaster out.
    pub async fn load_day(&self, date: &str, roster: &[ForecasterEntry]) -> DailyInputs {
        let loads = roster.iter().map(|f| async move {
            let result = self.load_predictions(date, &f.id).await;
            (f, result)
        });

        let mut batches = Vec::new();
        for (forecaster, result) in join_all(loads).await {
            match result {
                Ok(mut batch) => {
                    if batch.model_display_name.is_none() {
                        batch.model_display_name = Some(forecaster.display_name.clone());
                    }
                    batches.push(ForecasterBatch::new(forecaster.id.clone(), batch));
                }
                Err(e) if e.is_not_found() => debug!("No batch for {} on {}", forecaster.id, date),
                Err(e) => warn!("Skipping {} on {}: {}", forecaster.id, date, e),
            }
        }

        let settlements = optional(self.load_scores(date).await);
        let published_winner = optional(self.load_winner().await).filter(|w| match &w.date {
            Some(d) if d != date => {
                warn!("Ignoring published winner for {} (requested {})", d, date);
                false
            }
            _ => true,
        });

        info!(
            "Loaded {} of {} prediction batches for {} (scores: {}, published winner: {})",
            batches.len(),
            roster.len(),
            date,
            settlements.is_some(),
            published_winner.as_ref().map_or(false, |w| w.winner.is_some()),
        );

        DailyInputs {
            date: date.to_string(),
            batches,
            settlements,
            published_winner,
        }
    }
}

fn optional<T>(result: Result<T, LoadError>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(e) if e.is_not_found() => {
            debug!("{}", e);
            None
        }
        Err(e) => {
            warn!("{}", e);
            None
        }
    }
}
