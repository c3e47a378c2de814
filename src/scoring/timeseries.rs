//! Cumulative score series for the scoreboard chart.
//!
//! Every forecaster is laid out on the same sorted week axis. A week with no
//! entry for a forecaster is a gap (`None`), not a zero: the running total is
//! carried unchanged and the chart connects the surrounding points.

use chrono::{Datelike, NaiveDate};
use regex::Regex;
use std::collections::{BTreeSet, HashMap};
use std::sync::OnceLock;
use tracing::warn;

use crate::data::types::{ForecasterSummary, WeeklyScore};
use crate::numeric::round_dp;

fn week_label_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^\d{4}-W\d{2}$").expect("valid week label regex"))
}

/// Fixed-width `YYYY-Www` labels sort lexically in chronological order.
pub fn is_fixed_width_week(label: &str) -> bool {
    week_label_pattern().is_match(label)
}

/// ISO week label (`YYYY-Www`) for a `YYYY-MM-DD` date.
pub fn week_label(date: &str) -> Option<String> {
    let day = NaiveDate::parse_from_str(date, "%Y-%m-%d").ok()?;
    let week = day.iso_week();
    Some(format!("{}-W{:02}", week.year(), week.week()))
}

#[derive(Debug, Clone, PartialEq)]
pub struct ForecasterSeries {
    pub model: String,
    /// One point per axis week.
    pub points: Vec<Option<f64>>,
}

impl ForecasterSeries {
    pub fn last_value(&self) -> Option<f64> {
        self.points.iter().rev().find_map(|p| *p)
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct CumulativeSeries {
    pub weeks: Vec<String>,
    pub series: Vec<ForecasterSeries>,
}

impl CumulativeSeries {
    pub fn get(&self, model: &str) -> Option<&ForecasterSeries> {
        self.series.iter().find(|s| s.model == model)
    }
}

/// Align every forecaster's weekly deltas on the union week axis.
pub fn build_cumulative_series(inputs: &[(String, Vec<WeeklyScore>)]) -> CumulativeSeries {
    let axis: BTreeSet<&str> = inputs
        .iter()
        .flat_map(|(_, weeks)| weeks.iter().map(|w| w.week.as_str()))
        .collect();

    for label in axis.iter().filter(|l| !is_fixed_width_week(l)) {
        warn!("Week label {:?} is not YYYY-Www, axis order may not be chronological", label);
    }

    let series = inputs
        .iter()
        .map(|(model, weeks)| {
            let mut by_week: HashMap<&str, f64> = HashMap::new();
            for w in weeks {
                *by_week.entry(w.week.as_str()).or_insert(0.0) += w.score;
            }

            let mut running = 0.0;
            let points = axis
                .iter()
                .map(|week| {
                    by_week.get(week).map(|score| {
                        running += score;
                        round_dp(running, 2)
                    })
                })
                .collect();

            ForecasterSeries {
                model: model.clone(),
                points,
            }
        })
        .collect();

    CumulativeSeries {
        weeks: axis.into_iter().map(str::to_string).collect(),
        series,
    }
}

/// Chart series for a whole leaderboard, labelled by display name.
pub fn leaderboard_series(models: &[ForecasterSummary]) -> CumulativeSeries {
    let inputs: Vec<(String, Vec<WeeklyScore>)> = models
        .iter()
        .map(|m| (m.label().to_string(), m.weekly_scores.clone()))
        .collect();
    build_cumulative_series(&inputs)
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProfilePoint {
    pub week: String,
    pub cumulative: f64,
    pub weekly: f64,
    /// Percent, one decimal.
    pub accuracy_pct: f64,
}

/// Single-forecaster chart: running total, weekly delta and accuracy per week.
pub fn profile_series(weekly_scores: &[WeeklyScore]) -> Vec<ProfilePoint> {
    let mut running = 0.0;
    weekly_scores
        .iter()
        .map(|w| {
            running += w.score;
            ProfilePoint {
                week: w.week.clone(),
                cumulative: round_dp(running, 2),
                weekly: w.score,
                accuracy_pct: round_dp(w.accuracy * 100.0, 1),
            }
        })
        .collect()
}
