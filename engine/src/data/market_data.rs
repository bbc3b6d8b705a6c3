// In-memory daily price history, one series per symbol
use crate::error::EngineError;
use chrono::{DateTime, NaiveDate, Utc};
use shared::models::{Candle, PriceSeries};
use std::collections::{BTreeMap, HashMap};

/// Supplies the daily history the engine analyses. Implementations may return
/// a shorter or empty series; the engine copes with any length.
pub trait PriceHistoryProvider: Send + Sync {
    /// The most recent `lookback_days` candles for `symbol`, oldest first.
    /// A lookback of 0 means the whole history.
    fn price_history(&self, symbol: &str, lookback_days: usize) -> Result<PriceSeries, EngineError>;
}

#[derive(Debug, Default)]
pub struct MarketDataStore {
    data: HashMap<String, Vec<Candle>>,
}

impl MarketDataStore {
    pub fn new() -> Self {
        MarketDataStore { data: HashMap::new() }
    }

    /// Merges candles into a symbol's history, keeping one candle per UTC day
    /// (the later arrival wins) in chronological order. Returns the new length.
    pub fn add_candles(&mut self, symbol: &str, new_candles: Vec<Candle>) -> usize {
        let series = self.data.entry(symbol.to_string()).or_default();

        let mut by_day: BTreeMap<NaiveDate, Candle> = series
            .drain(..)
            .map(|c| (c.timestamp.date_naive(), c))
            .collect();
        for candle in new_candles {
            by_day.insert(candle.timestamp.date_naive(), candle);
        }

        *series = by_day.into_values().collect();
        tracing::debug!(symbol, candles = series.len(), "Market data store updated");
        series.len()
    }

    /// Number of stored candles for `symbol`; 0 when unknown.
    pub fn candle_count(&self, symbol: &str) -> usize {
        self.data.get(symbol).map_or(0, Vec::len)
    }

    pub fn get_candles(&self, symbol: &str, from_timestamp: Option<DateTime<Utc>>, to_timestamp: Option<DateTime<Utc>>) -> Option<Vec<Candle>> {
        self.data.get(symbol).map(|candles| {
            candles
                .iter()
                .filter(|c| from_timestamp.map_or(true, |start| c.timestamp >= start))
                .filter(|c| to_timestamp.map_or(true, |end| c.timestamp <= end))
                .cloned()
                .collect()
        })
    }
}

impl PriceHistoryProvider for MarketDataStore {
    fn price_history(&self, symbol: &str, lookback_days: usize) -> Result<PriceSeries, EngineError> {
        let Some(candles) = self.data.get(symbol) else {
            tracing::warn!(symbol, "No price history stored for symbol");
            return Ok(Vec::new());
        };
        let start = match lookback_days {
            0 => 0,
            n => candles.len().saturating_sub(n),
        };
        Ok(candles[start..].to_vec())
    }
}
