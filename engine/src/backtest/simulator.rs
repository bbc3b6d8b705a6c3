// Forward scan of a single hypothetical entry
use crate::scoring::probability::risk_reward_ratio;
use shared::models::{BacktestTrade, Candle, Direction, TradeMetrics, TradeResult};
use shared::utils::percent_change;

/// How a candle that touches both targets is resolved. Daily bars carry no
/// intraday ordering, so this is a modelling choice rather than an observation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TieBreak {
    #[default]
    TakeProfitFirst,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Targets {
    pub take_profit: f64,
    pub stop_loss: f64,
    pub direction: Direction,
}

pub fn profit_loss_percent(entry: f64, exit: f64, direction: Direction) -> f64 {
    match direction {
        Direction::Long => percent_change(entry, exit),
        Direction::Short => -percent_change(entry, exit),
    }
}

fn touched(candle: &Candle, targets: &Targets, tie_break: TieBreak) -> Option<TradeResult> {
    let (hit_take_profit, hit_stop_loss) = match targets.direction {
        Direction::Long => (candle.high >= targets.take_profit, candle.low <= targets.stop_loss),
        Direction::Short => (candle.low <= targets.take_profit, candle.high >= targets.stop_loss),
    };
    match (hit_take_profit, hit_stop_loss, tie_break) {
        (true, _, TieBreak::TakeProfitFirst) => Some(TradeResult::TakeProfit),
        (false, true, _) => Some(TradeResult::StopLoss),
        _ => None,
    }
}

/// Enters at `window[entry_index].open` and scans forward for the first
/// candle that touches a target. Without a touch the trade is closed at the
/// next candle's close and tagged stop-loss. Returns `None` when there is no
/// candle after the entry.
pub fn simulate_entry(window: &[Candle], entry_index: usize, targets: &Targets, tie_break: TieBreak) -> Option<BacktestTrade> {
    let entry_candle = window.get(entry_index)?;
    let next_candle = window.get(entry_index + 1)?;
    let entry_price = entry_candle.open;

    let mut high_price = entry_price;
    let mut low_price = entry_price;
    let mut exit: Option<(usize, f64, TradeResult)> = None;

    for (offset, candle) in window[entry_index + 1..].iter().enumerate() {
        high_price = high_price.max(candle.high);
        low_price = low_price.min(candle.low);

        if let Some(result) = touched(candle, targets, tie_break) {
            let exit_price = match result {
                TradeResult::TakeProfit => targets.take_profit,
                TradeResult::StopLoss => targets.stop_loss,
            };
            exit = Some((entry_index + 1 + offset, exit_price, result));
            break;
        }
    }

    let (exit_index, exit_price, result) =
        exit.unwrap_or((entry_index + 1, next_candle.close, TradeResult::StopLoss));

    let (favorable, adverse) = match targets.direction {
        Direction::Long => (percent_change(entry_price, high_price), -percent_change(entry_price, low_price)),
        Direction::Short => (-percent_change(entry_price, low_price), percent_change(entry_price, high_price)),
    };

    Some(BacktestTrade {
        entry_time: entry_candle.timestamp,
        exit_time: window[exit_index].timestamp,
        entry_price,
        exit_price,
        high_price,
        low_price,
        result,
        profit_loss_percent: profit_loss_percent(entry_price, exit_price, targets.direction),
        stop_loss: targets.stop_loss,
        take_profit: targets.take_profit,
        metrics: TradeMetrics {
            max_favorable_excursion: favorable.max(0.0),
            max_adverse_excursion: adverse.max(0.0),
            time_to_exit_days: (exit_index - entry_index) as u32,
            risk_reward_ratio: risk_reward_ratio(entry_price, targets.take_profit, targets.stop_loss),
        },
    })
}
