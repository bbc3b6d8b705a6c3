//! Trade scoring: a hand-tuned weighted heuristic over EMA, RSI and
//! Bollinger readings. Weights and tier thresholds are part of the output
//! contract and must not drift.

pub mod components;
pub mod explanations;
pub mod probability;

use crate::config::settings::AnalysisSettings;
use crate::indicators;
use shared::models::{Direction, IndicatorSnapshot, ScoreResult, TradeParameters};
use shared::utils::clamp_score;

/// Scores a proposed trade against the close-price history.
pub fn score_trade(prices: &[f64], params: &TradeParameters, settings: &AnalysisSettings) -> ScoreResult {
    let snapshot = indicators::snapshot(prices, settings);
    score_with_snapshot(prices, &snapshot, params, settings)
}

/// Same as [`score_trade`] with indicators already computed.
pub fn score_with_snapshot(
    prices: &[f64],
    snapshot: &IndicatorSnapshot,
    params: &TradeParameters,
    settings: &AnalysisSettings,
) -> ScoreResult {
    let trend = components::trend(prices, snapshot.ema, settings.trend_lookback, params.direction);
    let momentum_score = components::momentum(snapshot.rsi, params.direction);
    let volatility = components::volatility(snapshot.bands, snapshot.average_band_width);

    let market_condition = components::market_condition(trend.score, momentum_score, volatility.score);
    let probabilities =
        probability::target_probabilities(params, trend.score, momentum_score, volatility.score);
    let risk_reward = probability::risk_reward_ratio(params.entry_price, params.take_profit, params.stop_loss);

    let trade_quality = 0.4 * f64::from(probabilities.take_profit)
        + 0.3 * (100.0 - f64::from(probabilities.stop_loss))
        + 0.3 * (risk_reward * 50.0).min(100.0);
    let overall_score = clamp_score((0.6 * market_condition + 0.4 * trade_quality).round());

    tracing::debug!(
        direction = %params.direction,
        trend = trend.score,
        momentum = momentum_score,
        volatility = volatility.score,
        take_profit_probability = probabilities.take_profit,
        stop_loss_probability = probabilities.stop_loss,
        risk_reward,
        overall_score,
        "Scored trade"
    );

    ScoreResult {
        trend_score: trend.score,
        momentum_score,
        volatility_score: volatility.score,
        market_score: market_condition.round(),
        overall_score,
        take_profit_probability: probabilities.take_profit,
        stop_loss_probability: probabilities.stop_loss,
        recommendation: recommendation(overall_score, params.direction).to_string(),
        explanations: explanations::explain(
            params.direction,
            &trend,
            snapshot.rsi,
            &volatility,
            &probabilities,
            risk_reward,
        ),
    }
}

/// Five tiers on the overall score, labelled per direction.
pub fn recommendation(overall_score: f64, direction: Direction) -> &'static str {
    let tier = if overall_score >= 80.0 {
        0
    } else if overall_score >= 60.0 {
        1
    } else if overall_score >= 40.0 {
        2
    } else if overall_score >= 20.0 {
        3
    } else {
        4
    };
    let labels = match direction {
        Direction::Long => ["Strong Buy", "Buy", "Neutral", "Avoid Long", "Strong Avoid Long"],
        Direction::Short => ["Strong Sell", "Sell", "Neutral", "Avoid Short", "Strong Avoid Short"],
    };
    labels[tier]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn long(entry: f64, tp: f64, sl: f64) -> TradeParameters {
        TradeParameters {
            entry_price: entry,
            take_profit: tp,
            stop_loss: sl,
            direction: Direction::Long,
        }
    }

    #[test]
    fn test_flat_history_long_trade() {
        let prices = vec![100.0; 90];
        let score = score_trade(&prices, &long(100.0, 110.0, 95.0), &AnalysisSettings::default());
        assert_eq!(score.trend_score, 50.0);
        // Flat history has no losses, so RSI is 100 and long momentum sits in the overbought tier.
        assert_eq!(score.momentum_score, 20.0);
        assert_eq!(score.volatility_score, 50.0);
        assert_eq!(score.market_score, 41.0);
        assert_eq!(score.take_profit_probability, 29);
        assert_eq!(score.stop_loss_probability, 71);
        assert_eq!(score.overall_score, 45.0);
        assert_eq!(score.recommendation, "Neutral");
        assert!(score.explanations.momentum.contains("overbought"));
    }

    #[test]
    fn test_empty_history_is_neutral_not_nan() {
        let score = score_trade(&[], &long(100.0, 110.0, 95.0), &AnalysisSettings::default());
        for value in [
            score.trend_score,
            score.momentum_score,
            score.volatility_score,
            score.market_score,
            score.overall_score,
        ] {
            assert!(value.is_finite());
            assert!((0.0..=100.0).contains(&value));
        }
        assert_eq!(
            u16::from(score.take_profit_probability) + u16::from(score.stop_loss_probability),
            100
        );
    }

    #[test]
    fn test_stop_on_entry_does_not_poison_score() {
        let prices: Vec<f64> = (0..40).map(|i| 100.0 + (i % 7) as f64).collect();
        let score = score_trade(&prices, &long(100.0, 110.0, 100.0), &AnalysisSettings::default());
        assert!(score.overall_score.is_finite());
    }

    #[test]
    fn test_recommendation_tiers() {
        assert_eq!(recommendation(80.0, Direction::Long), "Strong Buy");
        assert_eq!(recommendation(79.9, Direction::Long), "Buy");
        assert_eq!(recommendation(60.0, Direction::Short), "Sell");
        assert_eq!(recommendation(40.0, Direction::Short), "Neutral");
        assert_eq!(recommendation(20.0, Direction::Long), "Avoid Long");
        assert_eq!(recommendation(19.0, Direction::Short), "Strong Avoid Short");
    }

    #[test]
    fn test_scoring_is_deterministic() {
        let prices: Vec<f64> = (0..120).map(|i| 100.0 + (i as f64 * 0.3).sin() * 5.0).collect();
        let params = long(100.0, 104.0, 97.0);
        let settings = AnalysisSettings::default();
        assert_eq!(score_trade(&prices, &params, &settings), score_trade(&prices, &params, &settings));
    }
}
