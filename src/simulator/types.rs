use serde::{Deserialize, Serialize};

use crate::data::types::Direction;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TradeStatus {
    Open,
    Closed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    pub date: String,
    pub ticker: String,
    pub direction: Direction,
    pub entry_price: f64,
    pub exit_price: Option<f64>,
    pub shares: u64,
    pub pnl: Option<f64>,
    pub pnl_pct: Option<f64>,
    #[serde(default)]
    pub models: Vec<String>,
    pub confidence: f64,
    pub status: TradeStatus,
}

/// Paper-trading ledger, the `simulator.json` shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulatorState {
    pub balance: f64,
    pub starting_balance: f64,
    #[serde(default)]
    pub trades: Vec<Trade>,
}

impl SimulatorState {
    pub fn new(starting_balance: f64) -> Self {
        Self {
            balance: starting_balance,
            starting_balance,
            trades: Vec::new(),
        }
    }

    pub fn open_trade(&self) -> Option<&Trade> {
        self.trades.iter().find(|t| t.status == TradeStatus::Open)
    }
}

impl Default for SimulatorState {
    fn default() -> Self {
        Self::new(25000.0)
    }
}
