// Integration tests for the aggregation core
//
// These exercise the public API end to end:
// 1. Daily consensus (grouping, selection, published override)
// 2. Settlement rollup and leaderboard ordering
// 3. Cumulative series consistency with the rollup
// 4. Loading a data directory and feeding it through the core

use market_oracle::config::{Config, ConsensusConfig};
use market_oracle::consensus::{resolve_winner, ConsensusOutcome, ForecasterBatch};
use market_oracle::data::types::{
    Direction, PredictionBatch, PredictionRecord, SettlementResult, SettlementStatus, WeeklyScore,
    WinnerFile,
};

fn pred(id: &str, ticker: &str, direction: Direction, confidence: f64, entry: f64, target: f64) -> PredictionRecord {
    PredictionRecord {
        id: id.to_string(),
        ticker: Some(ticker.to_string()),
        direction: Some(direction),
        confidence: Some(confidence),
        target_price: Some(target),
        entry_price: Some(entry),
        timeframe: None,
        category: None,
        reasoning: None,
    }
}

fn batch(name: &str, predictions: Vec<PredictionRecord>) -> ForecasterBatch {
    ForecasterBatch::new(
        name.to_lowercase(),
        PredictionBatch {
            model_display_name: Some(name.to_string()),
            market_context: None,
            predictions,
        },
    )
}

// ============================================================================
// CONSENSUS TESTS
// ============================================================================

mod consensus_tests {
    use super::*;

    /// Four agreeing forecasters beat a higher-confidence pair
    #[test]
    fn test_four_way_agreement_wins() {
        let config = ConsensusConfig::default();
        let batches = vec![
            batch("A", vec![
                pred("a1", "TICK", Direction::Up, 0.8, 100.0, 105.0),
                pred("a2", "META", Direction::Up, 0.99, 500.0, 600.0),
            ]),
            batch("B", vec![
                pred("b1", "TICK", Direction::Up, 0.9, 100.0, 105.0),
                pred("b2", "META", Direction::Up, 0.99, 500.0, 600.0),
            ]),
            batch("C", vec![pred("c1", "TICK", Direction::Up, 0.7, 100.0, 105.0)]),
            batch("D", vec![pred("d1", "TICK", Direction::Up, 0.6, 100.0, 105.0)]),
        ];

        let outcome = resolve_winner(None, &batches, &config);
        let ConsensusOutcome::Computed(winner) = &outcome else {
            panic!("expected a computed winner, got {:?}", outcome);
        };
        assert_eq!(winner.ticker, "TICK");
        assert_eq!(winner.avg_confidence, 0.75);
        assert_eq!(winner.expected_move_pct, 5.0);
        assert_eq!(winner.score, 3.75);
        assert_eq!(winner.model_count, 4);
        assert!(!winner.high_conviction);
    }

    /// Only pairs agree -> no consensus, however many other tickers exist
    #[test]
    fn test_pairs_only_is_no_consensus() {
        let config = ConsensusConfig::default();
        let mut many: Vec<PredictionRecord> = (0..10)
            .map(|i| pred(&format!("x{i}"), &format!("T{i}"), Direction::Up, 0.9, 10.0, 12.0))
            .collect();
        many.push(pred("x10", "AAPL", Direction::Down, 0.8, 200.0, 190.0));

        let batches = vec![
            batch("Claude", many),
            batch("Gemini", vec![pred("g1", "AAPL", Direction::Down, 0.7, 200.0, 195.0)]),
            batch("Grok", vec![pred("k1", "AAPL", Direction::Up, 0.7, 200.0, 210.0)]),
        ];

        assert_eq!(resolve_winner(None, &batches, &config), ConsensusOutcome::NoConsensus);
    }

    /// Index proxies and crypto pairs never form a consensus
    #[test]
    fn test_excluded_subjects_ignored() {
        let config = ConsensusConfig::default();
        let batches: Vec<ForecasterBatch> = ["Claude", "Gemini", "Grok", "GPT-4o"]
            .iter()
            .map(|name| {
                batch(name, vec![
                    pred("s", "SPY", Direction::Up, 0.9, 500.0, 520.0),
                    pred("v", "VIX", Direction::Down, 0.9, 20.0, 15.0),
                    pred("b", "BTC-USD", Direction::Up, 0.9, 90000.0, 99000.0),
                    pred("z", "ZERO", Direction::Up, 0.9, 0.0, 10.0),
                ])
            })
            .collect();

        assert_eq!(resolve_winner(None, &batches, &config), ConsensusOutcome::NoConsensus);
    }

    /// A published winner is returned even when local computation disagrees
    #[test]
    fn test_published_winner_overrides_computation() {
        let config = ConsensusConfig::default();
        let batches = vec![
            batch("A", vec![pred("a1", "TICK", Direction::Up, 0.8, 100.0, 105.0)]),
            batch("B", vec![pred("b1", "TICK", Direction::Up, 0.9, 100.0, 105.0)]),
            batch("C", vec![pred("c1", "TICK", Direction::Up, 0.7, 100.0, 105.0)]),
        ];
        let computed = resolve_winner(None, &batches, &config).into_winner().unwrap();

        let mut published_pick = computed.clone();
        published_pick.ticker = "PUBL".to_string();
        published_pick.direction = Direction::Down;
        let published = WinnerFile {
            date: Some("2025-02-19".to_string()),
            winner: Some(published_pick.clone()),
        };

        let outcome = resolve_winner(Some(&published), &batches, &config);
        assert_eq!(outcome, ConsensusOutcome::Published(published_pick));
    }

    /// A null-ticker record only drops itself, not the forecaster's batch
    #[test]
    fn test_null_ticker_record_does_not_drop_batch() {
        let config = ConsensusConfig::default();
        let with_sports: PredictionBatch = serde_json::from_str(
            r#"{
                "model_display_name": "Grok",
                "predictions": [
                    {"id": "k1", "ticker": "NVDA", "direction": "up", "confidence": 0.8,
                     "target_price": 145.0, "current_price_at_prediction": 140.0},
                    {"id": "k2", "ticker": null, "category": "sports", "direction": "up",
                     "confidence": 0.6, "target_price": 1.0, "current_price_at_prediction": 1.0}
                ]
            }"#,
        )
        .unwrap();

        let batches = vec![
            batch("Claude", vec![pred("c1", "NVDA", Direction::Up, 0.7, 140.0, 145.0)]),
            batch("Gemini", vec![pred("g1", "NVDA", Direction::Up, 0.9, 140.0, 145.0)]),
            ForecasterBatch::new("grok", with_sports),
        ];

        let winner = resolve_winner(None, &batches, &config).into_winner().unwrap();
        assert_eq!(winner.ticker, "NVDA");
        assert_eq!(winner.models, vec!["Claude", "Gemini", "Grok"]);
    }

    /// Published file with a null winner falls back to computation
    #[test]
    fn test_null_published_winner_falls_back() {
        let config = ConsensusConfig::default();
        let batches = vec![
            batch("A", vec![pred("a1", "TICK", Direction::Up, 0.8, 100.0, 105.0)]),
            batch("B", vec![pred("b1", "TICK", Direction::Up, 0.9, 100.0, 105.0)]),
            batch("C", vec![pred("c1", "TICK", Direction::Up, 0.7, 100.0, 105.0)]),
        ];
        let published = WinnerFile { date: None, winner: None };
        let outcome = resolve_winner(Some(&published), &batches, &config);
        assert!(matches!(outcome, ConsensusOutcome::Computed(ref w) if w.ticker == "TICK"));
    }
}

// ============================================================================
// SCORING TESTS
// ============================================================================

mod scoring_tests {
    use super::*;
    use market_oracle::numeric::round_dp;
    use market_oracle::scoring::{
        build_cumulative_series, rank, rollup, rollup_weekly, sort_summaries, SortDirection, SortKey,
        SortState, StreakExtremes,
    };

    fn resolved(id: &str, correct: bool, score: f64) -> SettlementResult {
        SettlementResult {
            prediction_id: id.to_string(),
            status: SettlementStatus::Resolved,
            direction_correct: Some(correct),
            score: Some(score),
            actual_close: Some(101.0),
            model_display_name: None,
            ticker: None,
            confidence: Some(0.7),
        }
    }

    /// Chronological [T, T, F, T, T, T] ends on a +3 streak
    #[test]
    fn test_streak_from_history() {
        let results: Vec<SettlementResult> = [true, true, false, true, true, true]
            .iter()
            .enumerate()
            .map(|(i, &c)| resolved(&format!("p{i}"), c, if c { 0.7 } else { -0.7 }))
            .collect();
        let summary = rollup("claude", &results, StreakExtremes { best: 7, worst: -2 }, Vec::new());
        assert_eq!(summary.current_streak, 3);
        assert_eq!(summary.best_streak, 7);
        assert_eq!(summary.worst_streak, -2);

        let accuracy = summary.direction_accuracy.unwrap();
        assert!((0.0..=1.0).contains(&accuracy));
        assert_eq!(accuracy, 5.0 / 6.0);
    }

    /// Sorting twice by the same key changes nothing
    #[test]
    fn test_leaderboard_idempotent_and_stable() {
        let weeks = |s: f64| vec![WeeklyScore { week: "2025-W08".to_string(), score: s, predictions: 5, accuracy: 0.6 }];
        let models = vec![
            rollup_weekly("claude", weeks(2.0), 0.7, StreakExtremes::default()),
            rollup_weekly("gemini", weeks(3.0), 0.7, StreakExtremes::default()),
            rollup_weekly("grok", weeks(2.0), 0.7, StreakExtremes::default()),
        ];

        let state = SortState::default();
        let once = sort_summaries(&models, state);
        let twice = sort_summaries(&once, state);
        assert_eq!(once, twice);

        let ids: Vec<&str> = rank(&models, state).iter().map(|r| r.summary.model_id.as_str()).collect();
        assert_eq!(ids, vec!["gemini", "claude", "grok"]);

        let asc = state.toggle(SortKey::TotalScore);
        assert_eq!(asc.direction, SortDirection::Ascending);
        let ids: Vec<String> = sort_summaries(&models, asc).into_iter().map(|m| m.model_id).collect();
        assert_eq!(ids, vec!["claude", "grok", "gemini"]);
    }

    /// The final chart point equals the rolled-up total
    #[test]
    fn test_series_round_trip_with_rollup() {
        let claude = vec![
            WeeklyScore { week: "2025-W07".to_string(), score: 1.111, predictions: 5, accuracy: 0.6 },
            WeeklyScore { week: "2025-W09".to_string(), score: 2.226, predictions: 5, accuracy: 0.8 },
        ];
        let grok = vec![
            WeeklyScore { week: "2025-W08".to_string(), score: -0.5, predictions: 5, accuracy: 0.4 },
            WeeklyScore { week: "2025-W09".to_string(), score: 0.25, predictions: 5, accuracy: 0.6 },
        ];
        let gpt4o = vec![
            WeeklyScore { week: "2025-W07".to_string(), score: 0.00495, predictions: 5, accuracy: 0.6 },
            WeeklyScore { week: "2025-W08".to_string(), score: 0.01, predictions: 5, accuracy: 0.6 },
        ];
        let inputs = vec![
            ("claude".to_string(), claude.clone()),
            ("grok".to_string(), grok.clone()),
            ("gpt4o".to_string(), gpt4o.clone()),
        ];
        let chart = build_cumulative_series(&inputs);

        for (model, weeks) in [("claude", claude), ("grok", grok), ("gpt4o", gpt4o)] {
            let summary = rollup_weekly(model, weeks, 0.7, StreakExtremes::default());
            let last = chart.get(model).unwrap().last_value().unwrap();
            assert_eq!(last, round_dp(summary.total_score, 2));
        }

        assert_eq!(chart.get("claude").unwrap().points[1], None);
        assert_eq!(chart.get("grok").unwrap().points[0], None);
    }
}

// ============================================================================
// END-TO-END: data directory -> core
// ============================================================================

mod end_to_end_tests {
    use super::*;
    use market_oracle::data::DataStore;
    use market_oracle::scoring::{leaderboard_series, rank, SortState};
    use market_oracle::simulator::{close_trade, open_trade, SimulatorState, SimulatorStats};
    use std::fs;
    use std::path::Path;

    fn write(root: &Path, rel: &str, contents: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
    }

    fn prediction_file(name: &str, confidence: f64) -> String {
        format!(
            r#"{{
                "date": "2025-02-19",
                "model_display_name": "{name}",
                "market_context": "Futures flat ahead of FOMC minutes",
                "predictions": [
                    {{"id": "{name}-1", "ticker": "SPY", "direction": "down", "confidence": 0.6,
                      "target_price": 600.0, "current_price_at_prediction": 610.0, "timeframe": "end_of_day"}},
                    {{"id": "{name}-2", "ticker": "NVDA", "direction": "up", "confidence": {confidence},
                      "target_price": 143.0, "current_price_at_prediction": 140.0, "timeframe": "end_of_day"}},
                    {{"id": "{name}-3", "ticker": null, "category": "sports", "confidence": 0.55}}
                ]
            }}"#
        )
    }

    #[tokio::test]
    async fn test_day_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "predictions/2025-02-19/claude.json", &prediction_file("Claude", 0.7));
        write(dir.path(), "predictions/2025-02-19/gemini.json", &prediction_file("Gemini", 0.8));
        write(dir.path(), "predictions/2025-02-19/grok.json", &prediction_file("Grok", 0.9));
        // perplexity and gpt4o failed to publish

        let config = Config::default();
        let store = DataStore::new(dir.path());
        let day = store.load_day("2025-02-19", &config.roster.forecasters).await;
        assert_eq!(day.batches.len(), 3);

        let outcome = resolve_winner(day.published_winner.as_ref(), &day.batches, &config.consensus);
        let winner = outcome.winner().unwrap();
        assert_eq!(winner.ticker, "NVDA");
        assert_eq!(winner.models, vec!["Claude", "Gemini", "Grok"]);
        assert_eq!(winner.avg_entry, 140.0);
        assert_eq!(winner.expected_move_pct, 2.14);
        assert!(!winner.high_conviction);

        let sim = open_trade(&SimulatorState::default(), winner, &day.date).unwrap();
        let sim = close_trade(&sim, 141.0).unwrap();
        let stats = SimulatorStats::from_state(&sim);
        assert_eq!(stats.closed_trades, 1);
        assert_eq!(stats.wins, 1);
        assert!(stats.total_pnl > 0.0);
    }

    #[tokio::test]
    async fn test_leaderboard_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "leaderboard.json", r#"{
            "last_updated": "2025-02-21T22:31:00Z",
            "models": [
                {"model_id": "claude-sonnet", "model_display_name": "Claude", "total_score": 3.4,
                 "direction_accuracy": 0.64, "total_predictions": 25, "avg_confidence": 0.71,
                 "current_streak": 3, "best_streak": 5, "worst_streak": -2,
                 "weekly_scores": [{"week": "2025-W07", "score": 1.2, "predictions": 10, "accuracy": 0.6},
                                   {"week": "2025-W08", "score": 2.2, "predictions": 15, "accuracy": 0.667}]},
                {"model_id": "grok-2", "model_display_name": "Grok", "total_score": 4.1,
                 "direction_accuracy": 0.58, "total_predictions": 25, "avg_confidence": 0.79,
                 "current_streak": -1, "best_streak": 4, "worst_streak": -3,
                 "weekly_scores": [{"week": "2025-W08", "score": 4.1, "predictions": 25, "accuracy": 0.58}]}
            ]
        }"#);

        let store = DataStore::new(dir.path());
        let snapshot = store.load_leaderboard().await.unwrap();

        let ranked = rank(&snapshot.models, SortState::default());
        assert_eq!(ranked[0].summary.label(), "Grok");
        assert_eq!(ranked[0].rank, 1);
        assert_eq!(ranked[0].summary.worst_streak, -3);

        let chart = leaderboard_series(&snapshot.models);
        assert_eq!(chart.weeks, vec!["2025-W07", "2025-W08"]);
        assert_eq!(chart.get("Claude").unwrap().points, vec![Some(1.2), Some(3.4)]);
        assert_eq!(chart.get("Grok").unwrap().points, vec![None, Some(4.1)]);
    }
}
