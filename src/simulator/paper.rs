use tracing::info;

use crate::consensus::types::ConsensusCandidate;
use crate::data::types::Direction;
use crate::numeric::round_dp;
use crate::simulator::types::{SimulatorState, Trade, TradeStatus};

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum TradeError {
    #[error("Already have an open trade in {0}")]
    OpenTradeExists(String),

    #[error("Invalid entry price: ${0:.2}")]
    InvalidEntryPrice(f64),

    #[error("Insufficient balance: ${balance:.2} buys no shares at ${price:.2}")]
    InsufficientBalance { balance: f64, price: f64 },

    #[error("No open trade to close")]
    NoOpenTrade,
}

/// Open a whole-share position in the day's winner at its average entry.
///
/// Returns a new ledger; `state` is left untouched.
pub fn open_trade(
    state: &SimulatorState,
    winner: &ConsensusCandidate,
    date: &str,
) -> Result<SimulatorState, TradeError> {
    if let Some(open) = state.open_trade() {
        return Err(TradeError::OpenTradeExists(open.ticker.clone()));
    }

    let entry_price = winner.avg_entry;
    if entry_price <= 0.0 {
        return Err(TradeError::InvalidEntryPrice(entry_price));
    }

    let shares = (state.balance / entry_price).floor() as u64;
    if shares == 0 {
        return Err(TradeError::InsufficientBalance {
            balance: state.balance,
            price: entry_price,
        });
    }

    info!(
        "Opened trade: {} {} shares of {} @ ${:.2}",
        winner.direction, shares, winner.ticker, entry_price
    );

    let mut next = state.clone();
    next.trades.push(Trade {
        date: date.to_string(),
        ticker: winner.ticker.clone(),
        direction: winner.direction,
        entry_price,
        exit_price: None,
        shares,
        pnl: None,
        pnl_pct: None,
        models: winner.models.clone(),
        confidence: winner.avg_confidence,
        status: TradeStatus::Open,
    });
    Ok(next)
}

/// Close the open trade at `closing_price` and book the P&L.
pub fn close_trade(state: &SimulatorState, closing_price: f64) -> Result<SimulatorState, TradeError> {
    let mut next = state.clone();
    let trade = next
        .trades
        .iter_mut()
        .find(|t| t.status == TradeStatus::Open)
        .ok_or(TradeError::NoOpenTrade)?;

    let shares = trade.shares as f64;
    let pnl = match trade.direction {
        Direction::Up => (closing_price - trade.entry_price) * shares,
        Direction::Down => (trade.entry_price - closing_price) * shares,
    };
    let cost = trade.entry_price * shares;
    let pnl_pct = if cost != 0.0 { pnl / cost * 100.0 } else { 0.0 };

    trade.exit_price = Some(closing_price);
    trade.pnl = Some(round_dp(pnl, 2));
    trade.pnl_pct = Some(round_dp(pnl_pct, 2));
    trade.status = TradeStatus::Closed;

    info!(
        "Closed trade: {} @ ${:.2} - P&L: ${:+.2} ({:+.2}%)",
        trade.ticker, closing_price, pnl, pnl_pct
    );

    next.balance = round_dp(next.balance + pnl, 2);
    Ok(next)
}

/// Headline numbers for the simulator view.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulatorStats {
    pub total_pnl: f64,
    pub total_pnl_pct: f64,
    pub closed_trades: usize,
    pub wins: usize,
    pub win_rate_pct: f64,
    pub open_trade: Option<Trade>,
}

impl SimulatorStats {
    pub fn from_state(state: &SimulatorState) -> Self {
        let total_pnl = round_dp(state.balance - state.starting_balance, 2);
        let total_pnl_pct = if state.starting_balance != 0.0 {
            round_dp(total_pnl / state.starting_balance * 100.0, 2)
        } else {
            0.0
        };

        let closed: Vec<&Trade> = state
            .trades
            .iter()
            .filter(|t| t.status == TradeStatus::Closed)
            .collect();
        let wins = closed.iter().filter(|t| t.pnl.unwrap_or(0.0) > 0.0).count();
        let win_rate_pct = if closed.is_empty() {
            0.0
        } else {
            round_dp(wins as f64 / closed.len() as f64 * 100.0, 2)
        };

        Self {
            total_pnl,
            total_pnl_pct,
            closed_trades: closed.len(),
            wins,
            win_rate_pct,
            open_trade: state.open_trade().cloned(),
        }
    }
}
