use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::scoring::leaderboard::{SortDirection, SortKey};

#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub data: DataConfig,
    #[serde(default)]
    pub consensus: ConsensusConfig,
    #[serde(default)]
    pub roster: RosterConfig,
    #[serde(default)]
    pub leaderboard: LeaderboardConfig,
    #[serde(default)]
    pub simulator: SimulatorConfig,
    #[serde(default)]
    pub report: ReportConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DataConfig {
    #[serde(default = "default_data_dir")]
    pub dir: String,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self { dir: default_data_dir() }
    }
}

/// Eligibility and scoring knobs for the daily consensus pick.
#[derive(Debug, Clone, Deserialize)]
pub struct ConsensusConfig {
    #[serde(default = "default_min_models")]
    pub min_models: usize,
    #[serde(default = "default_high_conviction")]
    pub high_conviction: f64,
    /// Index proxies, volatility index and small-cap proxy.
    #[serde(default = "default_excluded_tickers")]
    pub excluded_tickers: Vec<String>,
    /// Ticker suffixes marking non-equity assets (crypto pairs).
    #[serde(default = "default_non_equity_suffixes")]
    pub non_equity_suffixes: Vec<String>,
}

impl Default for ConsensusConfig {
    fn default() -> Self {
        Self {
            min_models: default_min_models(),
            high_conviction: default_high_conviction(),
            excluded_tickers: default_excluded_tickers(),
            non_equity_suffixes: default_non_equity_suffixes(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct ForecasterEntry {
    pub id: String,
    pub display_name: String,
}

/// Declared forecaster order. Consensus tie-breaks follow this order.
#[derive(Debug, Clone, Deserialize)]
pub struct RosterConfig {
    #[serde(default = "default_forecasters")]
    pub forecasters: Vec<ForecasterEntry>,
}

impl Default for RosterConfig {
    fn default() -> Self {
        Self { forecasters: default_forecasters() }
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct LeaderboardConfig {
    #[serde(default)]
    pub sort_key: SortKey,
    #[serde(default)]
    pub sort_direction: SortDirection,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SimulatorConfig {
    #[serde(default = "default_starting_balance")]
    pub starting_balance: f64,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self { starting_balance: default_starting_balance() }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReportConfig {
    #[serde(default)]
    pub csv_export: bool,
    #[serde(default = "default_csv_path")]
    pub csv_path: String,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            csv_export: false,
            csv_path: default_csv_path(),
        }
    }
}

fn default_data_dir() -> String { "data".to_string() }
fn default_min_models() -> usize { 3 }
fn default_high_conviction() -> f64 { 0.85 }
fn default_starting_balance() -> f64 { 25000.0 }
fn default_csv_path() -> String { "reports".to_string() }

fn default_excluded_tickers() -> Vec<String> {
    ["SPY", "QQQ", "DIA", "VIX", "IWM"].iter().map(|s| s.to_string()).collect()
}

fn default_non_equity_suffixes() -> Vec<String> {
    vec!["-USD".to_string()]
}

fn default_forecasters() -> Vec<ForecasterEntry> {
    [
        ("claude", "Claude"),
        ("perplexity", "Perplexity"),
        ("gemini", "Gemini"),
        ("gpt4o", "GPT-4o"),
        ("grok", "Grok"),
    ]
    .iter()
    .map(|(id, name)| ForecasterEntry {
        id: id.to_string(),
        display_name: name.to_string(),
    })
    .collect()
}

#[derive(Debug, Clone)]
pub struct EnvConfig {
    pub config_path: String,
    pub data_dir: Option<String>,
    pub date: Option<String>,
    pub log_level: String,
}

impl Config {
    pub fn load(path: &str) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path))?;

        Self::parse(&contents).with_context(|| format!("Failed to parse config file: {}", path))
    }

    pub fn parse(contents: &str) -> Result<Self> {
        let config: Config = toml::from_str(contents)?;
        Ok(config)
    }

    /// Load `path` if it exists, otherwise fall back to built-in defaults.
    pub fn load_or_default(path: &str) -> Result<Self> {
        if Path::new(path).exists() {
            Self::load(path)
        } else {
            tracing::warn!("Config file {} not found, using defaults", path);
            Ok(Self::default())
        }
    }
}

impl EnvConfig {
    pub fn load() -> Result<Self> {
        dotenv::dotenv().ok();

        Ok(Self {
            config_path: std::env::var("ORACLE_CONFIG")
                .unwrap_or_else(|_| "config.toml".to_string()),
            data_dir: std::env::var("ORACLE_DATA_DIR").ok(),
            date: std::env::var("ORACLE_DATE").ok(),
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
        })
    }
}
