use anyhow::Result;
use chrono::Utc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use market_oracle::config::{Config, EnvConfig};
use market_oracle::consensus::resolve_winner;
use market_oracle::data::DataStore;
use market_oracle::numeric::round_dp;
use market_oracle::report::CsvReport;
use market_oracle::scoring::{
    leaderboard_series, rank, rollup, week_label, SortState, StreakExtremes,
};
use market_oracle::simulator::SimulatorStats;

#[tokio::main]
async fn main() -> Result<()> {
    let env_config = EnvConfig::load()?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&env_config.log_level))
        .init();

    info!("🔮 Market Oracle starting...");

    let mut config = Config::load_or_default(&env_config.config_path)?;
    if let Some(dir) = &env_config.data_dir {
        config.data.dir = dir.clone();
    }

    let date = env_config
        .date
        .clone()
        .unwrap_or_else(|| Utc::now().format("%Y-%m-%d").to_string());

    let store = DataStore::new(&config.data.dir);

    info!("Data directory: {}", store.root().display());
    info!("Date: {}", date);
    info!(
        "Consensus: {}+ models, high conviction >= {:.2}",
        config.consensus.min_models, config.consensus.high_conviction
    );

    // Today's winner
    let day = store.load_day(&date, &config.roster.forecasters).await;
    let outcome = resolve_winner(day.published_winner.as_ref(), &day.batches, &config.consensus);
    match outcome.winner() {
        Some(w) => info!(
            "🏆 Today's winner: {} {} | {} models ({}) | confidence {:.0}% | move {:.2}%{}",
            w.ticker,
            w.direction.to_string().to_uppercase(),
            w.model_count,
            w.models.join(", "),
            w.avg_confidence * 100.0,
            w.expected_move_pct,
            if w.high_conviction { " | HIGH CONVICTION" } else { "" }
        ),
        None => info!("No consensus today"),
    }

    // Leaderboard
    let snapshot = match store.load_leaderboard().await {
        Ok(s) => Some(s),
        Err(e) => {
            warn!("Leaderboard unavailable: {}", e);
            None
        }
    };
    let models = snapshot.as_ref().map(|s| s.models.clone()).unwrap_or_default();

    if let Some(settlements) = &day.settlements {
        for entry in &config.roster.forecasters {
            let results = settlements.results_for_model(&entry.display_name);
            if results.is_empty() {
                continue;
            }
            let extremes = models
                .iter()
                .find(|m| m.model_id == entry.id || m.label() == entry.display_name)
                .map(|m| StreakExtremes { best: m.best_streak, worst: m.worst_streak })
                .unwrap_or_default();
            let day_summary = rollup(&entry.id, &results, extremes, Vec::new());
            info!(
                "{} on {}: score {:+.2}, accuracy {}, streak {:+}",
                entry.display_name,
                date,
                day_summary.total_score,
                day_summary
                    .direction_accuracy
                    .map(|a| format!("{:.1}%", a * 100.0))
                    .unwrap_or_else(|| "n/a".to_string()),
                day_summary.current_streak
            );
        }
    }

    let sort = SortState::new(config.leaderboard.sort_key, config.leaderboard.sort_direction);
    let ranked = rank(&models, sort);
    if let Some(s) = &snapshot {
        info!("📊 Leaderboard by {} (updated {})", sort.key, s.last_updated.to_rfc3339());
    }
    for row in &ranked {
        let s = row.summary;
        info!(
            "#{} {:<12} score {:+7.2} | accuracy {} | {} predictions | streak {:+}",
            row.rank,
            s.label(),
            s.total_score,
            s.direction_accuracy
                .map(|a| format!("{:5.1}%", a * 100.0))
                .unwrap_or_else(|| "  n/a".to_string()),
            s.total_predictions,
            s.current_streak
        );
    }

    // Cumulative series, cross-checked against each summary's total
    let chart = leaderboard_series(&models);
    for (series, summary) in chart.series.iter().zip(&models) {
        if let Some(last) = series.last_value() {
            let expected = round_dp(summary.total_score, 2);
            if last != expected {
                warn!(
                    "{}: weekly series ends at {:.2} but total_score is {:.2}",
                    series.model, last, expected
                );
            }
        }
    }
    info!("Cumulative series: {} weeks x {} forecasters", chart.weeks.len(), chart.series.len());

    // Weekly recap
    if let Some(week) = week_label(&date) {
        match store.load_weekly_summary(&week).await {
            Ok(recap) => {
                info!("📰 {}: {}", recap.week, recap.headline);
                if let Some(c) = &recap.consensus_accuracy {
                    info!(
                        "Consensus calls this week: {}/{} correct ({:.1}%)",
                        c.consensus_correct,
                        c.total_consensus_calls,
                        c.accuracy * 100.0
                    );
                }
            }
            Err(e) if e.is_not_found() => info!("No weekly summary for {} yet", week),
            Err(e) => warn!("Weekly summary unavailable: {}", e),
        }
    } else {
        warn!("Date {} is not YYYY-MM-DD, skipping weekly summary", date);
    }

    // Paper trading
    match store.load_simulator().await {
        Ok(sim) => {
            let stats = SimulatorStats::from_state(&sim);
            info!(
                "💰 Simulator: balance ${:.2} | P&L ${:+.2} ({:+.2}%) | win rate {:.1}% over {} trades",
                sim.balance, stats.total_pnl, stats.total_pnl_pct, stats.win_rate_pct, stats.closed_trades
            );
            if let Some(open) = &stats.open_trade {
                info!("Open trade: {} {} {} @ ${:.2}", open.direction, open.shares, open.ticker, open.entry_price);
            }
        }
        Err(e) if e.is_not_found() => {
            info!("No simulator ledger yet (starting balance ${:.2})", config.simulator.starting_balance);
        }
        Err(e) => warn!("Simulator unavailable: {}", e),
    }

    if config.report.csv_export {
        let report = CsvReport::new(&config.report.csv_path)?;
        let board = report.write_leaderboard(&date, &ranked)?;
        let series = report.write_series(&date, &chart)?;
        info!("📄 CSV report in {}", report.dir().display());
        info!("Wrote {} and {}", board.display(), series.display());
    }

    info!("✅ Done");
    Ok(())
}
