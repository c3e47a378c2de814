use std::collections::HashMap;
use tracing::debug;

use crate::config::ConsensusConfig;
use crate::consensus::types::{CandidateGroup, Contribution, GroupKey};
use crate::data::types::{PredictionBatch, PredictionRecord};

/// A forecaster's batch tagged with its roster id.
///
/// Callers pass these in roster order; that order decides both the `models`
/// list of each candidate and which group is seen first.
#[derive(Debug, Clone)]
pub struct ForecasterBatch {
    pub forecaster: String,
    pub batch: PredictionBatch,
}

impl ForecasterBatch {
    pub fn new(forecaster: impl Into<String>, batch: PredictionBatch) -> Self {
        Self {
            forecaster: forecaster.into(),
            batch,
        }
    }

    /// Name recorded in consensus model lists.
    pub fn model_name(&self) -> &str {
        self.batch
            .model_display_name
            .as_deref()
            .unwrap_or(&self.forecaster)
    }
}

/// Why a prediction was left out of grouping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exclusion {
    MissingTicker,
    ExcludedTicker,
    NonEquity,
    Sports,
    MissingDirection,
    MissingPrice,
    MissingConfidence,
}

/// Apply the per-prediction eligibility filter, in order.
pub fn check_prediction(pred: &PredictionRecord, config: &ConsensusConfig) -> Result<(), Exclusion> {
    let Some(ticker) = pred.ticker() else {
        return Err(Exclusion::MissingTicker);
    };
    if config.excluded_tickers.iter().any(|t| t == ticker) {
        return Err(Exclusion::ExcludedTicker);
    }
    if config
        .non_equity_suffixes
        .iter()
        .any(|suffix| ticker.ends_with(suffix.as_str()))
    {
        return Err(Exclusion::NonEquity);
    }
    if !usable_price(pred.target_price) || !usable_price(pred.entry_price) {
        return Err(Exclusion::MissingPrice);
    }
    if pred.category.as_deref() == Some("sports") {
        return Err(Exclusion::Sports);
    }
    if pred.direction.is_none() {
        return Err(Exclusion::MissingDirection);
    }
    if pred.confidence.is_none() {
        return Err(Exclusion::MissingConfidence);
    }
    Ok(())
}

fn usable_price(price: Option<f64>) -> bool {
    matches!(price, Some(p) if p != 0.0 && p.is_finite())
}

/// Partition same-direction predictions across forecasters into groups of at
/// least `config.min_models` contributions. Groups keep first-seen order.
pub fn group_predictions(batches: &[ForecasterBatch], config: &ConsensusConfig) -> Vec<CandidateGroup> {
    let mut groups: Vec<CandidateGroup> = Vec::new();
    let mut index: HashMap<GroupKey, usize> = HashMap::new();

    for fb in batches {
        let model = fb.model_name();
        for pred in &fb.batch.predictions {
            if let Err(reason) = check_prediction(pred, config) {
                debug!(
                    "Skipping {} {} from {}: {:?}",
                    pred.id,
                    pred.ticker().unwrap_or("-"),
                    model,
                    reason
                );
                continue;
            }

            // check_prediction guarantees these are present
            let (Some(ticker), Some(direction), Some(confidence), Some(target), Some(entry)) =
                (pred.ticker(), pred.direction, pred.confidence, pred.target_price, pred.entry_price)
            else {
                continue;
            };

            let key = GroupKey {
                ticker: ticker.to_string(),
                direction,
            };
            let contribution = Contribution {
                model: model.to_string(),
                confidence,
                target,
                entry,
            };

            match index.get(&key) {
                Some(&i) => groups[i].contributions.push(contribution),
                None => {
                    index.insert(key.clone(), groups.len());
                    groups.push(CandidateGroup {
                        key,
                        contributions: vec![contribution],
                    });
                }
            }
        }
    }

    groups.retain(|g| g.contributions.len() >= config.min_models);
    groups
}
