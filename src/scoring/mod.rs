pub mod leaderboard;
pub mod rollup;
pub mod timeseries;

pub use leaderboard::{rank, sort_summaries, RankedEntry, SortDirection, SortKey, SortState};
pub use rollup::{current_streak, direction_accuracy, rollup, rollup_weekly, StreakExtremes};
pub use timeseries::{
    build_cumulative_series, leaderboard_series, profile_series, week_label, CumulativeSeries,
};
