use serde::Deserialize;
use std::cmp::Ordering;

use crate::data::types::ForecasterSummary;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    #[default]
    TotalScore,
    DirectionAccuracy,
    TotalPredictions,
    AvgConfidence,
}

impl std::fmt::Display for SortKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            SortKey::TotalScore => "total_score",
            SortKey::DirectionAccuracy => "direction_accuracy",
            SortKey::TotalPredictions => "total_predictions",
            SortKey::AvgConfidence => "avg_confidence",
        };
        write!(f, "{s}")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
pub enum SortDirection {
    #[serde(rename = "asc")]
    Ascending,
    #[default]
    #[serde(rename = "desc")]
    Descending,
}

impl SortDirection {
    pub fn flipped(self) -> Self {
        match self {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::Ascending,
        }
    }
}

/// Column sort selection, passed in by the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SortState {
    pub key: SortKey,
    pub direction: SortDirection,
}

impl SortState {
    pub fn new(key: SortKey, direction: SortDirection) -> Self {
        Self { key, direction }
    }

    /// Same key flips direction; a new key starts descending.
    pub fn toggle(self, key: SortKey) -> Self {
        if self.key == key {
            Self { key, direction: self.direction.flipped() }
        } else {
            Self { key, direction: SortDirection::Descending }
        }
    }
}

/// Leaderboard row. The rank is positional and never stored on the summary.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RankedEntry<'a> {
    pub rank: usize,
    pub summary: &'a ForecasterSummary,
}

fn sort_value(summary: &ForecasterSummary, key: SortKey) -> Option<f64> {
    match key {
        SortKey::TotalScore => Some(summary.total_score),
        SortKey::DirectionAccuracy => summary.direction_accuracy,
        SortKey::TotalPredictions => Some(summary.total_predictions as f64),
        SortKey::AvgConfidence => Some(summary.avg_confidence),
    }
}

/// Absent values order below every present value.
fn compare(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        // 0.0 and -0.0 tie
        (Some(x), Some(y)) if x == y => Ordering::Equal,
        (Some(x), Some(y)) => x.total_cmp(&y),
        (Some(_), None) => Ordering::Greater,
        (None, Some(_)) => Ordering::Less,
        (None, None) => Ordering::Equal,
    }
}

/// Stable sort of borrowed summaries. Equal keys keep input order.
pub fn sorted<'a>(models: &'a [ForecasterSummary], state: SortState) -> Vec<&'a ForecasterSummary> {
    let mut rows: Vec<&ForecasterSummary> = models.iter().collect();
    rows.sort_by(|a, b| {
        let ord = compare(sort_value(a, state.key), sort_value(b, state.key));
        match state.direction {
            SortDirection::Ascending => ord,
            SortDirection::Descending => ord.reverse(),
        }
    });
    rows
}

/// Sorted rows with 1-based positional ranks.
pub fn rank(models: &[ForecasterSummary], state: SortState) -> Vec<RankedEntry<'_>> {
    sorted(models, state)
        .into_iter()
        .enumerate()
        .map(|(i, summary)| RankedEntry { rank: i + 1, summary })
        .collect()
}

/// Owned copy of `models` in sorted order.
pub fn sort_summaries(models: &[ForecasterSummary], state: SortState) -> Vec<ForecasterSummary> {
    sorted(models, state).into_iter().cloned().collect()
}
