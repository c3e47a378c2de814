use anyhow::{Context, Result};
use std::borrow::Cow;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::scoring::leaderboard::RankedEntry;
use crate::scoring::timeseries::CumulativeSeries;

/// Quote a free-text cell when it holds a delimiter, quote or line break.
fn csv_field(value: &str) -> Cow<'_, str> {
    if value.contains([',', '"', '\n', '\r']) {
        Cow::Owned(format!("\"{}\"", value.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(value)
    }
}

/// Writes the ranked leaderboard and cumulative series as CSV files.
pub struct CsvReport {
    dir: PathBuf,
}

impl CsvReport {
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create report dir: {}", dir.display()))?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// One row per forecaster, in rank order.
    pub fn write_leaderboard(&self, date: &str, rows: &[RankedEntry<'_>]) -> Result<PathBuf> {
        let path = self.dir.join(format!("leaderboard-{}.csv", date));
        let mut file = File::create(&path)
            .with_context(|| format!("Failed to create {}", path.display()))?;

        writeln!(
            file,
            "rank,model,total_score,direction_accuracy,total_predictions,avg_confidence,current_streak,best_streak,worst_streak"
        )?;

        for row in rows {
            let s = row.summary;
            let accuracy = match s.direction_accuracy {
                Some(a) => format!("{:.4}", a),
                None => "".to_string(),
            };
            writeln!(
                file,
                "{},{},{:.2},{},{},{:.4},{},{},{}",
                row.rank,
                csv_field(s.label()),
                s.total_score,
                accuracy,
                s.total_predictions,
                s.avg_confidence,
                s.current_streak,
                s.best_streak,
                s.worst_streak
            )?;
        }

        Ok(path)
    }

    /// Wide layout: one row per week, one column per forecaster. Gaps stay empty.
    pub fn write_series(&self, date: &str, chart: &CumulativeSeries) -> Result<PathBuf> {
        let path = self.dir.join(format!("cumulative-{}.csv", date));
        let mut file = File::create(&path)
            .with_context(|| format!("Failed to create {}", path.display()))?;

        let header: Vec<Cow<'_, str>> = std::iter::once(Cow::Borrowed("week"))
            .chain(chart.series.iter().map(|s| csv_field(&s.model)))
            .collect();
        writeln!(file, "{}", header.join(","))?;

        for (i, week) in chart.weeks.iter().enumerate() {
            let cells: Vec<String> = chart
                .series
                .iter()
                .map(|s| match s.points.get(i).copied().flatten() {
                    Some(v) => format!("{:.2}", v),
                    None => "".to_string(),
                })
                .collect();
            writeln!(file, "{},{}", week, cells.join(","))?;
        }

        Ok(path)
    }
}
