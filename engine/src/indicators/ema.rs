// Exponential Moving Average (EMA) indicator implementation
use super::IndicatorCalculator;
use serde_json::Value;
use shared::models::{closes, Candle, Indicator};

/// EMA seeded with the first price rather than an SMA of the first window.
/// Output has the same length as the input.
pub fn ema(prices: &[f64], period: usize) -> Vec<f64> {
    if prices.is_empty() || period == 0 {
        return Vec::new();
    }

    let multiplier = 2.0 / (period as f64 + 1.0);
    let mut results = Vec::with_capacity(prices.len());
    let mut previous = prices[0];
    results.push(previous);

    for &price in &prices[1..] {
        previous += (price - previous) * multiplier;
        results.push(previous);
    }
    results
}

pub struct Ema {
    name: String,
    period: usize,
}

impl Ema {
    pub fn new(period: usize) -> Self {
        Self {
            name: format!("EMA({})", period),
            period,
        }
    }
}

impl IndicatorCalculator for Ema {
    fn name(&self) -> &str {
        &self.name
    }

    fn parameters(&self) -> Value {
        serde_json::json!({ "period": self.period })
    }

    fn calculate(&self, data: &[Candle]) -> Vec<Indicator> {
        vec![Indicator {
            name: self.name.clone(),
            parameters: self.parameters(),
            values: ema(&closes(data), self.period),
        }]
    }
}
