//! Deterministic synthetic daily candles.
//!
//! Every generator owns its own seeded `StdRng`; the same seed and parameters
//! always produce the same series, independent of any other generator.

use chrono::{DateTime, Duration, TimeZone, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use shared::models::Candle;

/// Upper bound on generated days, roughly a century of daily candles.
pub const MAX_SAMPLE_DAYS: usize = 36_500;

#[derive(Debug, Clone)]
pub struct SampleDataGenerator {
    seed: u64,
    start: DateTime<Utc>,
    drift: f64,
    volatility: f64,
}

impl SampleDataGenerator {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            start: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).single().unwrap_or_default(),
            drift: 0.0005,     // ~12% annual
            volatility: 0.015, // ~24% annual
        }
    }

    pub fn with_start(mut self, start: DateTime<Utc>) -> Self {
        self.start = start;
        self
    }

    pub fn with_drift(mut self, drift: f64) -> Self {
        self.drift = drift;
        self
    }

    pub fn with_volatility(mut self, volatility: f64) -> Self {
        self.volatility = volatility.abs();
        self
    }

    /// Up to `days` consecutive daily candles starting at `start_price`,
    /// capped at [`MAX_SAMPLE_DAYS`]. Generation stops early if a date would
    /// fall outside chrono's range.
    pub fn generate(&self, days: usize, start_price: f64) -> Vec<Candle> {
        let days = days.min(MAX_SAMPLE_DAYS);
        let mut rng = StdRng::seed_from_u64(self.seed);
        let mut candles = Vec::with_capacity(days);
        let mut close = start_price.max(0.01);
        // Uniform noise scaled to unit variance.
        let unit = 3f64.sqrt();

        for day in 0..days {
            let Some(timestamp) = self.start.checked_add_signed(Duration::days(day as i64)) else {
                tracing::warn!(day, start = %self.start, "Sample dates ran past the calendar range, stopping");
                break;
            };
            let open = close;
            let shock = rng.gen_range(-unit..unit) * self.volatility;
            close = (open * (1.0 + self.drift + shock)).max(0.01);

            let wick_up = rng.gen_range(0.0..1.0) * self.volatility / 2.0;
            let wick_down = rng.gen_range(0.0..1.0) * self.volatility / 2.0;
            let high = open.max(close) * (1.0 + wick_up);
            let low = open.min(close) * (1.0 - wick_down);

            candles.push(Candle {
                timestamp,
                open,
                high,
                low,
                close,
                volume: Some(rng.gen_range(100_000.0..1_000_000.0_f64).round()),
            });
        }
        candles
    }
}
