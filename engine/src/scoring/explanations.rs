// Human-readable rationale for each score component
use super::components::{TrendReading, VolatilityReading};
use super::probability::TargetProbabilities;
use shared::models::{Direction, Explanations};

const OVERBOUGHT_RSI: f64 = 70.0;
const OVERSOLD_RSI: f64 = 30.0;
const HIGH_VOLATILITY_RATIO: f64 = 1.5;
const LOW_VOLATILITY_RATIO: f64 = 0.75;

pub fn explain(
    direction: Direction,
    trend: &TrendReading,
    latest_rsi: Option<f64>,
    volatility: &VolatilityReading,
    probabilities: &TargetProbabilities,
    risk_reward: f64,
) -> Explanations {
    Explanations {
        trend: explain_trend(direction, trend),
        momentum: explain_momentum(direction, latest_rsi),
        volatility: explain_volatility(volatility),
        probability: explain_probability(probabilities, risk_reward),
    }
}

fn explain_trend(direction: Direction, trend: &TrendReading) -> String {
    let shape = if trend.strength > 2.0 {
        "a strong uptrend"
    } else if trend.strength > 0.5 {
        "a mild uptrend"
    } else if trend.strength < -2.0 {
        "a strong downtrend"
    } else if trend.strength < -0.5 {
        "a mild downtrend"
    } else {
        "a sideways market"
    };
    let aligned = match direction {
        Direction::Long => trend.strength > 0.5,
        Direction::Short => trend.strength < -0.5,
    };
    format!(
        "Price moved {:+.2}% over the lookback and sits {:+.2}% from its EMA, indicating {}. {}",
        trend.price_change,
        trend.ema_deviation,
        shape,
        if aligned {
            format!("The trend supports a {} position.", direction)
        } else {
            format!("The trend does not support a {} position.", direction)
        }
    )
}

fn explain_momentum(direction: Direction, latest_rsi: Option<f64>) -> String {
    let Some(rsi) = latest_rsi else {
        return "Not enough history to compute RSI; momentum is treated as neutral.".to_string();
    };
    let state = if rsi > OVERBOUGHT_RSI {
        "overbought"
    } else if rsi < OVERSOLD_RSI {
        "oversold"
    } else {
        "neutral"
    };
    let outlook = match (direction, state) {
        (Direction::Long, "overbought") => "a pullback is likely, which works against a long entry",
        (Direction::Long, "oversold") => "a rebound is likely, which favours a long entry",
        (Direction::Short, "overbought") => "a pullback is likely, which favours a short entry",
        (Direction::Short, "oversold") => "a rebound is likely, which works against a short entry",
        _ => "momentum gives no strong edge either way",
    };
    format!("RSI is {:.1}, the market is {}; {}.", rsi, state, outlook)
}

fn explain_volatility(volatility: &VolatilityReading) -> String {
    let Some(ratio) = volatility.ratio else {
        return "Not enough history for Bollinger Bands; volatility is treated as neutral.".to_string();
    };
    let level = if ratio > HIGH_VOLATILITY_RATIO {
        "high volatility, so both targets are more likely to be hit quickly and stops are riskier"
    } else if ratio < LOW_VOLATILITY_RATIO {
        "low volatility, so price may take longer to reach either target"
    } else {
        "normal volatility"
    };
    format!("Band width is {:.2}x its recent average, indicating {}.", ratio, level)
}

fn explain_probability(probabilities: &TargetProbabilities, risk_reward: f64) -> String {
    if !probabilities.take_profit_reachable {
        return format!(
            "The take-profit is on the wrong side of the entry for this direction and is not reachable; stop-loss probability {}%.",
            probabilities.stop_loss
        );
    }
    let distance_note = if probabilities.take_profit_distance_pct > 20.0 {
        " The take-profit is far from entry, which lowers its odds."
    } else {
        ""
    };
    format!(
        "Estimated {}% chance of reaching take-profit ({:.2}% away) versus {}% for stop-loss ({:.2}% away), risk/reward 1:{:.2}.{}",
        probabilities.take_profit,
        probabilities.take_profit_distance_pct,
        probabilities.stop_loss,
        probabilities.stop_loss_distance_pct,
        risk_reward,
        distance_note
    )
}
