pub mod grouper;
pub mod selector;
pub mod types;

pub use grouper::{group_predictions, ForecasterBatch};
pub use selector::{resolve_winner, score_group, select_winner};
pub use types::{CandidateGroup, ConsensusCandidate, ConsensusOutcome, Contribution, GroupKey};
