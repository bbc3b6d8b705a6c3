// Technical indicators module
pub mod bollinger;
pub mod ema;
pub mod rsi;

pub use bollinger::{bollinger_bands, Bollinger, BollingerOutput};
pub use ema::{ema, Ema};
pub use rsi::{rsi, Rsi};

use crate::config::settings::AnalysisSettings;
use serde_json::Value;
use shared::models::{Candle, Indicator, IndicatorSnapshot};

// Common trait for all indicators exposed through the service
pub trait IndicatorCalculator: Send + Sync {
    fn name(&self) -> &str;
    fn parameters(&self) -> Value; // Parameters used for this indicator instance
    fn calculate(&self, data: &[Candle]) -> Vec<Indicator>; // One entry per output line; values shorter than data when a warm-up is needed
}

/// Last value of every indicator the scorer consumes.
pub fn snapshot(prices: &[f64], settings: &AnalysisSettings) -> IndicatorSnapshot {
    let bollinger = bollinger_bands(
        prices,
        settings.bollinger_period,
        settings.bollinger_std_dev,
        settings.band_width_lookback,
    );
    IndicatorSnapshot {
        ema: ema(prices, settings.ema_period).last().copied(),
        rsi: rsi(prices, settings.rsi_period).last().copied(),
        bands: bollinger.bands.last().copied(),
        average_band_width: bollinger.average_band_width,
    }
}

#[cfg(test)]
pub(crate) fn test_candle(close: f64) -> Candle {
    Candle {
        timestamp: chrono::Utc::now(),
        open: close,
        high: close,
        low: close,
        close,
        volume: None,
    }
}
