pub mod paper;
pub mod types;

pub use paper::{close_trade, open_trade, SimulatorStats, TradeError};
pub use types::{SimulatorState, Trade, TradeStatus};
