//! Historical replay of a take-profit / stop-loss pair over the most recent
//! window of daily candles. One hypothetical entry per day at that day's open.

pub mod simulator;
pub mod summary;

pub use simulator::{simulate_entry, Targets, TieBreak};
pub use summary::summarize;

use shared::models::{BacktestReport, Candle};

pub const INSUFFICIENT_DATA_MESSAGE: &str = "Insufficient data for backtesting: at least 2 candles are required";

/// Replays `targets` over the last `window_len` candles of `history`.
///
/// Fewer than two candles yields an unsuccessful report with an empty ledger
/// and no statistics. The ledger is in chronological entry order and holds
/// one trade per candle of the window except the last.
pub fn run_backtest(history: &[Candle], targets: &Targets, window_len: usize) -> BacktestReport {
    let start = history.len().saturating_sub(window_len);
    let window = &history[start..];

    if window.len() < 2 {
        tracing::warn!(candles = window.len(), "Not enough candles to run a backtest");
        return BacktestReport {
            success: false,
            message: INSUFFICIENT_DATA_MESSAGE.to_string(),
            trades: Vec::new(),
            statistics: None,
        };
    }

    let tie_break = TieBreak::default();
    let trades: Vec<_> = (0..window.len() - 1)
        .filter_map(|entry_index| simulate_entry(window, entry_index, targets, tie_break))
        .collect();
    let statistics = summarize(&trades);

    tracing::debug!(
        direction = %targets.direction,
        take_profit = targets.take_profit,
        stop_loss = targets.stop_loss,
        trades = trades.len(),
        win_rate = ?statistics.as_ref().map(|s| s.win_rate),
        "Backtest replay finished"
    );

    BacktestReport {
        success: true,
        message: format!("Simulated {} entries over the last {} candles", trades.len(), window.len()),
        trades,
        statistics,
    }
}
