use crate::data::types::{ForecasterSummary, SettlementResult, WeeklyScore};

/// Historical streak extremes, maintained by the settlement process.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StreakExtremes {
    pub best: i32,
    pub worst: i32,
}

/// Signed run length of identical outcomes ending at the most recent resolved
/// result. Positive for a correct run, negative for a wrong run, 0 when
/// nothing has resolved. Pending results are skipped.
pub fn current_streak(results: &[SettlementResult]) -> i32 {
    let mut outcomes = results
        .iter()
        .filter(|r| r.is_resolved())
        .filter_map(|r| r.direction_correct)
        .rev();

    let Some(latest) = outcomes.next() else {
        return 0;
    };
    let run = 1 + outcomes.take_while(|&o| o == latest).count() as i32;

    if latest { run } else { -run }
}

/// Correct / resolved. `None` when nothing has resolved.
pub fn direction_accuracy(results: &[SettlementResult]) -> Option<f64> {
    let resolved: Vec<&SettlementResult> = results.iter().filter(|r| r.is_resolved()).collect();
    if resolved.is_empty() {
        return None;
    }
    let correct = resolved.iter().filter(|r| r.direction_correct == Some(true)).count();
    Some(correct as f64 / resolved.len() as f64)
}

/// Summarise a forecaster from its chronological settlement results.
///
/// Totals and ratios are kept unrounded; callers round for display.
pub fn rollup(
    model_id: &str,
    results: &[SettlementResult],
    extremes: StreakExtremes,
    weekly_scores: Vec<WeeklyScore>,
) -> ForecasterSummary {
    let resolved: Vec<&SettlementResult> = results.iter().filter(|r| r.is_resolved()).collect();

    let total_score: f64 = resolved.iter().filter_map(|r| r.score).sum();
    let correct = resolved.iter().filter(|r| r.direction_correct == Some(true)).count() as u32;

    let confidences: Vec<f64> = resolved.iter().filter_map(|r| r.confidence).collect();
    let avg_confidence = if confidences.is_empty() {
        0.0
    } else {
        confidences.iter().sum::<f64>() / confidences.len() as f64
    };

    ForecasterSummary {
        model_id: model_id.to_string(),
        model_display_name: None,
        color: None,
        total_score,
        direction_accuracy: direction_accuracy(results),
        total_predictions: resolved.len() as u32,
        correct_directions: Some(correct),
        avg_confidence,
        current_streak: current_streak(results),
        best_streak: extremes.best,
        worst_streak: extremes.worst,
        weekly_scores,
    }
}

/// Summarise a forecaster from precomputed weekly rows only.
///
/// Accuracy is weighted by each week's prediction count. Weekly rows carry no
/// per-prediction order, so `current_streak` is 0.
pub fn rollup_weekly(
    model_id: &str,
    weekly_scores: Vec<WeeklyScore>,
    avg_confidence: f64,
    extremes: StreakExtremes,
) -> ForecasterSummary {
    let total_score: f64 = weekly_scores.iter().map(|w| w.score).sum();
    let total_predictions: u32 = weekly_scores.iter().map(|w| w.predictions).sum();

    let direction_accuracy = if total_predictions == 0 {
        None
    } else {
        let weighted: f64 = weekly_scores
            .iter()
            .map(|w| w.accuracy * w.predictions as f64)
            .sum();
        Some(weighted / total_predictions as f64)
    };

    ForecasterSummary {
        model_id: model_id.to_string(),
        model_display_name: None,
        color: None,
        total_score,
        direction_accuracy,
        total_predictions,
        correct_directions: None,
        avg_confidence,
        current_streak: 0,
        best_streak: extremes.best,
        worst_streak: extremes.worst,
        weekly_scores,
    }
}
