// Trend, momentum and volatility component scores
use shared::models::{BandSet, Direction};
use shared::utils::{clamp_score, percent_change};

/// Neutral value used when a component cannot be computed.
pub const NEUTRAL_SCORE: f64 = 50.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrendReading {
    /// Percent change across the trailing lookback window.
    pub price_change: f64,
    /// Percent distance of the latest price from its EMA.
    pub ema_deviation: f64,
    pub strength: f64,
    pub score: f64,
}

pub fn trend(prices: &[f64], latest_ema: Option<f64>, lookback: usize, direction: Direction) -> TrendReading {
    let (price_change, ema_deviation) = match prices.last() {
        Some(&latest) => {
            let start = prices.len().saturating_sub(lookback.max(1));
            let change = percent_change(prices[start], latest);
            let deviation = latest_ema.map_or(0.0, |ema| percent_change(ema, latest));
            (change, deviation)
        }
        None => (0.0, 0.0),
    };

    let strength = (price_change + ema_deviation) / 2.0;
    let raw = match direction {
        Direction::Long => NEUTRAL_SCORE + strength * 5.0,
        Direction::Short => NEUTRAL_SCORE - strength * 5.0,
    };

    TrendReading {
        price_change,
        ema_deviation,
        strength,
        score: clamp_score(raw),
    }
}

/// Tiered RSI mapping. The tiers are discontinuous on purpose.
pub fn momentum(latest_rsi: Option<f64>, direction: Direction) -> f64 {
    let Some(rsi) = latest_rsi else {
        return NEUTRAL_SCORE;
    };

    match direction {
        Direction::Long => {
            if rsi < 30.0 {
                90.0
            } else if rsi < 40.0 {
                70.0
            } else if rsi > 70.0 {
                20.0
            } else {
                (70.0 - rsi).max(0.0)
            }
        }
        Direction::Short => {
            if rsi > 70.0 {
                90.0
            } else if rsi > 60.0 {
                70.0
            } else if rsi < 30.0 {
                20.0
            } else {
                (rsi - 30.0).max(0.0)
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VolatilityReading {
    /// Current band width over its trailing average; `None` without band data.
    pub ratio: Option<f64>,
    pub score: f64,
}

pub fn volatility(latest_bands: Option<BandSet>, average_band_width: Option<f64>) -> VolatilityReading {
    let Some(bands) = latest_bands else {
        return VolatilityReading {
            ratio: None,
            score: NEUTRAL_SCORE,
        };
    };

    // A zero average only happens on a flat history; treat it as "normal".
    let ratio = match average_band_width {
        Some(avg) if avg > 0.0 => bands.band_width / avg,
        _ => 1.0,
    };

    VolatilityReading {
        ratio: Some(ratio),
        score: clamp_score((ratio - 0.5) * 100.0),
    }
}

/// 0.4 trend + 0.3 momentum + 0.3 inverted volatility, unrounded.
pub fn market_condition(trend: f64, momentum: f64, volatility: f64) -> f64 {
    0.4 * trend + 0.3 * momentum + 0.3 * (100.0 - volatility)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn band(width: f64) -> BandSet {
        BandSet {
            upper: 0.0,
            middle: 0.0,
            lower: 0.0,
            band_width: width,
        }
    }

    #[test]
    fn test_trend_flat_is_neutral() {
        let reading = trend(&[100.0; 30], Some(100.0), 20, Direction::Long);
        assert_eq!(reading.score, 50.0);
        assert_eq!(reading.strength, 0.0);
    }

    #[test]
    fn test_trend_uses_trailing_window_and_ema() {
        let mut prices = vec![50.0; 10];
        prices.extend([100.0, 102.0, 104.0]);
        // Lookback 3 starts at 100; EMA given as 100 too.
        let reading = trend(&prices, Some(100.0), 3, Direction::Long);
        assert!((reading.price_change - 4.0).abs() < 1e-9);
        assert!((reading.ema_deviation - 4.0).abs() < 1e-9);
        assert!((reading.score - 70.0).abs() < 1e-9);

        let short = trend(&prices, Some(100.0), 3, Direction::Short);
        assert!((short.score - 30.0).abs() < 1e-9);
    }

    #[test]
    fn test_trend_clamps() {
        let prices = [10.0, 20.0];
        assert_eq!(trend(&prices, Some(10.0), 20, Direction::Long).score, 100.0);
        assert_eq!(trend(&prices, Some(10.0), 20, Direction::Short).score, 0.0);
    }

    #[test]
    fn test_trend_empty_history() {
        assert_eq!(trend(&[], None, 20, Direction::Long).score, 50.0);
    }

    #[test]
    fn test_momentum_long_tiers() {
        assert_eq!(momentum(Some(29.9), Direction::Long), 90.0);
        assert_eq!(momentum(Some(30.0), Direction::Long), 70.0);
        assert_eq!(momentum(Some(39.9), Direction::Long), 70.0);
        assert_eq!(momentum(Some(40.0), Direction::Long), 30.0);
        assert_eq!(momentum(Some(70.0), Direction::Long), 0.0);
        assert_eq!(momentum(Some(70.1), Direction::Long), 20.0);
        assert_eq!(momentum(Some(100.0), Direction::Long), 20.0);
    }

    #[test]
    fn test_momentum_short_tiers() {
        assert_eq!(momentum(Some(70.1), Direction::Short), 90.0);
        assert_eq!(momentum(Some(70.0), Direction::Short), 70.0);
        assert_eq!(momentum(Some(60.1), Direction::Short), 70.0);
        assert_eq!(momentum(Some(60.0), Direction::Short), 30.0);
        assert_eq!(momentum(Some(30.0), Direction::Short), 0.0);
        assert_eq!(momentum(Some(29.9), Direction::Short), 20.0);
    }

    #[test]
    fn test_momentum_without_rsi() {
        assert_eq!(momentum(None, Direction::Long), NEUTRAL_SCORE);
        assert_eq!(momentum(None, Direction::Short), NEUTRAL_SCORE);
    }

    #[test]
    fn test_volatility_ratio_mapping() {
        let high = volatility(Some(band(30.0)), Some(10.0));
        assert_eq!(high.ratio, Some(3.0));
        assert_eq!(high.score, 100.0);

        let normal = volatility(Some(band(10.0)), Some(10.0));
        assert_eq!(normal.score, 50.0);

        let calm = volatility(Some(band(4.0)), Some(10.0));
        assert_eq!(calm.score, 0.0);
    }

    #[test]
    fn test_volatility_guards() {
        assert_eq!(volatility(None, None).score, 50.0);
        assert_eq!(volatility(None, None).ratio, None);
        let flat = volatility(Some(band(0.0)), Some(0.0));
        assert_eq!(flat.ratio, Some(1.0));
        assert_eq!(flat.score, 50.0);
    }
}
