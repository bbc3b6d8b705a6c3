// Take-profit / stop-loss hit probabilities
use shared::models::{Direction, TradeParameters};

/// Targets further than this (in percent of entry) get no distance credit.
const DISTANCE_HORIZON_PCT: f64 = 20.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TargetProbabilities {
    pub take_profit: u8,
    pub stop_loss: u8,
    pub take_profit_distance_pct: f64,
    pub stop_loss_distance_pct: f64,
    /// False when the take-profit sits on the losing side of the entry.
    pub take_profit_reachable: bool,
}

/// Percent distance from entry to a target; infinite for a non-positive entry.
pub fn distance_pct(entry: f64, target: f64) -> f64 {
    if entry <= 0.0 {
        return f64::INFINITY;
    }
    (target - entry).abs() / entry * 100.0
}

/// |take_profit - entry| / |entry - stop_loss|, 0 when the stop sits on the entry.
pub fn risk_reward_ratio(entry: f64, take_profit: f64, stop_loss: f64) -> f64 {
    let risk = (entry - stop_loss).abs();
    if risk == 0.0 {
        return 0.0;
    }
    (take_profit - entry).abs() / risk
}

pub fn take_profit_on_correct_side(params: &TradeParameters) -> bool {
    match params.direction {
        Direction::Long => params.take_profit > params.entry_price,
        Direction::Short => params.take_profit < params.entry_price,
    }
}

fn distance_decay(distance_pct: f64) -> f64 {
    (1.0 - distance_pct / DISTANCE_HORIZON_PCT).max(0.0)
}

pub fn target_probabilities(params: &TradeParameters, trend: f64, momentum: f64, volatility: f64) -> TargetProbabilities {
    let base_take_profit = 0.4 * trend + 0.4 * momentum + 0.2 * (100.0 - volatility);
    let base_stop_loss = 100.0 - base_take_profit;

    let trend_factor = trend / 100.0;
    let (tp_alignment, sl_alignment) = match params.direction {
        Direction::Long => (trend_factor, 1.0 - trend_factor),
        Direction::Short => (1.0 - trend_factor, trend_factor),
    };

    let take_profit_distance_pct = distance_pct(params.entry_price, params.take_profit);
    let stop_loss_distance_pct = distance_pct(params.entry_price, params.stop_loss);
    let take_profit_reachable = take_profit_on_correct_side(params);

    let raw_take_profit = if take_profit_reachable {
        base_take_profit * tp_alignment * distance_decay(take_profit_distance_pct) * (1.0 - volatility / 100.0)
    } else {
        0.0
    };
    let raw_stop_loss = base_stop_loss * sl_alignment * distance_decay(stop_loss_distance_pct) * (volatility / 100.0);

    // A wrong-side take-profit is infeasible whatever the stop-loss reads.
    let (take_profit, stop_loss) = if take_profit_reachable {
        normalize(raw_take_profit, raw_stop_loss)
    } else {
        (0, 100)
    };

    TargetProbabilities {
        take_profit,
        stop_loss,
        take_profit_distance_pct,
        stop_loss_distance_pct,
        take_profit_reachable,
    }
}

// Sum is exactly 100. Both zero falls back to an even split.
fn normalize(raw_take_profit: f64, raw_stop_loss: f64) -> (u8, u8) {
    let total = raw_take_profit + raw_stop_loss;
    if !(total.is_finite() && total > 0.0) {
        return (50, 50);
    }
    let take_profit = (raw_take_profit / total * 100.0).round().clamp(0.0, 100.0) as u8;
    (take_profit, 100 - take_profit)
}
