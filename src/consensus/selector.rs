use tracing::info;

use crate::config::ConsensusConfig;
use crate::consensus::grouper::{group_predictions, ForecasterBatch};
use crate::consensus::types::{CandidateGroup, ConsensusCandidate, ConsensusOutcome};
use crate::data::types::WinnerFile;
use crate::numeric::{mean, round_dp};

/// Score one group. `None` when it is too small or its average entry is zero.
///
/// Means are rounded for display (4dp confidence, 2dp prices) but the move and
/// score are computed from the unrounded means and rounded last.
pub fn score_group(group: &CandidateGroup, config: &ConsensusConfig) -> Option<ConsensusCandidate> {
    let picks = &group.contributions;
    if picks.len() < config.min_models {
        return None;
    }

    let confidences: Vec<f64> = picks.iter().map(|p| p.confidence).collect();
    let targets: Vec<f64> = picks.iter().map(|p| p.target).collect();
    let entries: Vec<f64> = picks.iter().map(|p| p.entry).collect();

    let avg_confidence = mean(&confidences)?;
    let avg_target = mean(&targets)?;
    let avg_entry = mean(&entries)?;

    if avg_entry == 0.0 {
        return None;
    }

    let expected_move_pct = ((avg_target - avg_entry) / avg_entry * 100.0).abs();
    let score = avg_confidence * expected_move_pct;

    Some(ConsensusCandidate {
        ticker: group.key.ticker.clone(),
        direction: group.key.direction,
        avg_confidence: round_dp(avg_confidence, 4),
        avg_target: round_dp(avg_target, 2),
        avg_entry: round_dp(avg_entry, 2),
        expected_move_pct: round_dp(expected_move_pct, 2),
        score: round_dp(score, 4),
        models: picks.iter().map(|p| p.model.clone()).collect(),
        model_count: picks.len(),
        high_conviction: avg_confidence >= config.high_conviction,
    })
}

/// Pick the highest-scoring eligible group. A later group only replaces the
/// current best on a strictly greater score, so ties go to the first seen.
pub fn select_winner(groups: &[CandidateGroup], config: &ConsensusConfig) -> Option<ConsensusCandidate> {
    let mut best: Option<ConsensusCandidate> = None;

    for candidate in groups.iter().filter_map(|g| score_group(g, config)) {
        let replace = match &best {
            None => true,
            Some(current) => candidate.score > current.score,
        };
        if replace {
            best = Some(candidate);
        }
    }

    best
}

/// Published winner, else computed winner, else no consensus.
///
/// `batches` is not read at all when a published winner is present.
pub fn resolve_winner(
    published: Option<&WinnerFile>,
    batches: &[ForecasterBatch],
    config: &ConsensusConfig,
) -> ConsensusOutcome {
    if let Some(winner) = published.and_then(|w| w.winner.as_ref()) {
        info!(
            "Using published winner: {} {} ({} models, score={:.2})",
            winner.ticker, winner.direction, winner.model_count, winner.score
        );
        return ConsensusOutcome::Published(winner.clone());
    }

    if batches.is_empty() {
        info!("No prediction batches available, no consensus");
        return ConsensusOutcome::NoConsensus;
    }

    let groups = group_predictions(batches, config);
    match select_winner(&groups, config) {
        Some(winner) => {
            info!(
                "Computed winner: {} {} ({} models, score={:.2})",
                winner.ticker, winner.direction, winner.model_count, winner.score
            );
            ConsensusOutcome::Computed(winner)
        }
        None => {
            info!(
                "No consensus (no ticker with {}+ models agreeing)",
                config.min_models
            );
            ConsensusOutcome::NoConsensus
        }
    }
}
