use serde::{Deserialize, Serialize};

use crate::data::types::Direction;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GroupKey {
    pub ticker: String,
    pub direction: Direction,
}

/// One forecaster's share of a (ticker, direction) group.
#[derive(Debug, Clone, PartialEq)]
pub struct Contribution {
    pub model: String,
    pub confidence: f64,
    pub target: f64,
    pub entry: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CandidateGroup {
    pub key: GroupKey,
    pub contributions: Vec<Contribution>,
}

/// Scored consensus group. Also the wire shape of a published winner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsensusCandidate {
    pub ticker: String,
    pub direction: Direction,
    pub avg_confidence: f64,
    pub avg_target: f64,
    pub avg_entry: f64,
    pub expected_move_pct: f64,
    pub score: f64,
    pub models: Vec<String>,
    pub model_count: usize,
    pub high_conviction: bool,
}

/// Where the day's winner came from.
#[derive(Debug, Clone, PartialEq)]
pub enum ConsensusOutcome {
    /// Supplied by the upstream batch process; local computation was skipped.
    Published(ConsensusCandidate),
    Computed(ConsensusCandidate),
    NoConsensus,
}

impl ConsensusOutcome {
    pub fn winner(&self) -> Option<&ConsensusCandidate> {
        match self {
            ConsensusOutcome::Published(c) | ConsensusOutcome::Computed(c) => Some(c),
            ConsensusOutcome::NoConsensus => None,
        }
    }

    pub fn into_winner(self) -> Option<ConsensusCandidate> {
        match self {
            ConsensusOutcome::Published(c) | ConsensusOutcome::Computed(c) => Some(c),
            ConsensusOutcome::NoConsensus => None,
        }
    }
}
