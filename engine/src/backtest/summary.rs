// Aggregate statistics, always recomputed from the ledger
use shared::models::{BacktestSummary, BacktestTrade};
use shared::utils::mean;

/// Reduces a ledger to summary statistics. `None` for an empty ledger.
///
/// Winners have a positive P/L and losers a negative one; break-even trades
/// count toward the total only. Profit factor is +inf with winners and no
/// losers, and 0 when there are neither.
pub fn summarize(trades: &[BacktestTrade]) -> Option<BacktestSummary> {
    if trades.is_empty() {
        return None;
    }

    let profit_losses: Vec<f64> = trades.iter().map(|t| t.profit_loss_percent).collect();
    let wins: Vec<f64> = profit_losses.iter().copied().filter(|pl| *pl > 0.0).collect();
    let losses: Vec<f64> = profit_losses.iter().copied().filter(|pl| *pl < 0.0).collect();

    let gross_profit: f64 = wins.iter().sum();
    let gross_loss: f64 = losses.iter().map(|pl| pl.abs()).sum();
    let profit_factor = if gross_loss > 0.0 {
        gross_profit / gross_loss
    } else if gross_profit > 0.0 {
        f64::INFINITY
    } else {
        0.0
    };

    let favorable: Vec<f64> = trades.iter().map(|t| t.metrics.max_favorable_excursion).collect();
    let adverse: Vec<f64> = trades.iter().map(|t| t.metrics.max_adverse_excursion).collect();

    Some(BacktestSummary {
        total_trades: trades.len(),
        winning_trades: wins.len(),
        losing_trades: losses.len(),
        win_rate: wins.len() as f64 / trades.len() as f64 * 100.0,
        average_profit: mean(&profit_losses).unwrap_or(0.0),
        max_profit: profit_losses.iter().copied().fold(f64::NEG_INFINITY, f64::max),
        max_loss: profit_losses.iter().copied().fold(f64::INFINITY, f64::min),
        profit_factor,
        average_win: mean(&wins).unwrap_or(0.0),
        average_loss: mean(&losses).unwrap_or(0.0),
        average_favorable_excursion: mean(&favorable).unwrap_or(0.0),
        average_adverse_excursion: mean(&adverse).unwrap_or(0.0),
    })
}
