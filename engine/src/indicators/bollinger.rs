// Bollinger Bands indicator implementation
use super::IndicatorCalculator;
use serde_json::Value;
use shared::models::{closes, BandSet, Candle, Indicator};
use shared::utils::mean;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BollingerOutput {
    /// One entry per full window of `period` prices, oldest first.
    pub bands: Vec<BandSet>,
    /// Mean of the trailing band widths; `None` when no window fits.
    pub average_band_width: Option<f64>,
}

/// Bands from the simple mean and population standard deviation of each
/// window. `average_band_width` covers the last `width_lookback` windows, or
/// all of them when fewer exist.
pub fn bollinger_bands(
    prices: &[f64],
    period: usize,
    std_dev_multiplier: f64,
    width_lookback: usize,
) -> BollingerOutput {
    if period == 0 || prices.len() < period {
        return BollingerOutput::default();
    }

    let bands: Vec<BandSet> = prices
        .windows(period)
        .map(|window| {
            let middle = window.iter().sum::<f64>() / period as f64;
            let variance = window.iter().map(|p| (p - middle).powi(2)).sum::<f64>() / period as f64;
            let offset = std_dev_multiplier * variance.sqrt();
            let upper = middle + offset;
            let lower = middle - offset;
            let band_width = if middle == 0.0 { 0.0 } else { (upper - lower) / middle * 100.0 };
            BandSet { upper, middle, lower, band_width }
        })
        .collect();

    let widths: Vec<f64> = bands.iter().map(|b| b.band_width).collect();
    let start = widths.len().saturating_sub(width_lookback.max(1));
    let average_band_width = mean(&widths[start..]);

    BollingerOutput { bands, average_band_width }
}

pub struct Bollinger {
    name: String,
    period: usize,
    std_dev_multiplier: f64,
}

impl Bollinger {
    pub fn new(period: usize, std_dev_multiplier: f64) -> Self {
        Self {
            name: format!("BB({},{})", period, std_dev_multiplier),
            period,
            std_dev_multiplier,
        }
    }
}

impl IndicatorCalculator for Bollinger {
    fn name(&self) -> &str {
        &self.name
    }

    fn parameters(&self) -> Value {
        serde_json::json!({ "period": self.period, "std_dev": self.std_dev_multiplier })
    }

    fn calculate(&self, data: &[Candle]) -> Vec<Indicator> {
        let output = bollinger_bands(&closes(data), self.period, self.std_dev_multiplier, usize::MAX);
        let line = |suffix: &str, pick: fn(&BandSet) -> f64| Indicator {
            name: format!("{} {}", self.name, suffix),
            parameters: self.parameters(),
            values: output.bands.iter().map(pick).collect(),
        };
        vec![
            line("upper", |b| b.upper),
            line("middle", |b| b.middle),
            line("lower", |b| b.lower),
            line("band_width", |b| b.band_width),
        ]
    }
}
