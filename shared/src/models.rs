use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// One daily OHLC bar. Timestamps travel as epoch seconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    #[serde(with = "chrono::serde::ts_seconds")]
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    #[serde(default)]
    pub volume: Option<f64>,
}

impl Candle {
    /// Epoch seconds of the bar.
    pub fn time(&self) -> i64 {
        self.timestamp.timestamp()
    }
}

/// Chronological candles for one asset. May be empty.
pub type PriceSeries = Vec<Candle>;

/// Pulls the close prices out of a series, oldest first.
pub fn closes(series: &[Candle]) -> Vec<f64> {
    series.iter().map(|c| c.close).collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Long,
    Short,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Long => "long",
            Direction::Short => "short",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown trade direction '{0}', expected 'long' or 'short'")]
pub struct ParseDirectionError(pub String);

impl FromStr for Direction {
    type Err = ParseDirectionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "long" | "buy" => Ok(Direction::Long),
            "short" | "sell" => Ok(Direction::Short),
            _ => Err(ParseDirectionError(s.to_string())),
        }
    }
}

/// A proposed trade. Targets are not validated against the direction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TradeParameters {
    pub entry_price: f64,
    pub take_profit: f64,
    pub stop_loss: f64,
    pub direction: Direction,
}

/// One Bollinger window.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BandSet {
    pub upper: f64,
    pub middle: f64,
    pub lower: f64,
    /// (upper - lower) / middle * 100
    pub band_width: f64,
}

/// Last values of every indicator the scorer reads. `None` means the series
/// was too short for that indicator.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IndicatorSnapshot {
    pub ema: Option<f64>,
    pub rsi: Option<f64>,
    pub bands: Option<BandSet>,
    pub average_band_width: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Explanations {
    pub trend: String,
    pub momentum: String,
    pub volatility: String,
    pub probability: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreResult {
    pub trend_score: f64,
    pub momentum_score: f64,
    pub volatility_score: f64,
    pub market_score: f64,
    pub overall_score: f64,
    pub take_profit_probability: u8,
    pub stop_loss_probability: u8,
    pub recommendation: String,
    pub explanations: Explanations,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TradeResult {
    TakeProfit,
    StopLoss,
}

impl TradeResult {
    pub fn as_str(&self) -> &'static str {
        match self {
            TradeResult::TakeProfit => "take_profit",
            TradeResult::StopLoss => "stop_loss",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TradeMetrics {
    /// Best unrealized move in percent, as a non-negative magnitude.
    pub max_favorable_excursion: f64,
    /// Worst unrealized move in percent, as a non-negative magnitude.
    pub max_adverse_excursion: f64,
    pub time_to_exit_days: u32,
    pub risk_reward_ratio: f64,
}

/// One simulated entry day of a backtest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestTrade {
    #[serde(with = "chrono::serde::ts_seconds")]
    pub entry_time: DateTime<Utc>,
    #[serde(with = "chrono::serde::ts_seconds")]
    pub exit_time: DateTime<Utc>,
    pub entry_price: f64,
    pub exit_price: f64,
    pub high_price: f64,
    pub low_price: f64,
    pub result: TradeResult,
    pub profit_loss_percent: f64,
    pub stop_loss: f64,
    pub take_profit: f64,
    pub metrics: TradeMetrics,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestSummary {
    pub total_trades: usize,
    pub winning_trades: usize,
    pub losing_trades: usize,
    pub win_rate: f64,
    pub average_profit: f64,
    pub max_profit: f64,
    pub max_loss: f64,
    /// +inf when there are winners and no losers. Serialized as the string
    /// `"inf"` because JSON has no infinity.
    #[serde(with = "non_finite_f64")]
    pub profit_factor: f64,
    pub average_win: f64,
    pub average_loss: f64,
    pub average_favorable_excursion: f64,
    pub average_adverse_excursion: f64,
}

// JSON numbers cannot carry infinities or NaN; those travel as strings.
mod non_finite_f64 {
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
        if value.is_finite() {
            serializer.serialize_f64(*value)
        } else if value.is_nan() {
            serializer.serialize_str("nan")
        } else if *value > 0.0 {
            serializer.serialize_str("inf")
        } else {
            serializer.serialize_str("-inf")
        }
    }

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Repr {
        Number(f64),
        Text(String),
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
        match Repr::deserialize(deserializer)? {
            Repr::Number(value) => Ok(value),
            Repr::Text(text) => match text.as_str() {
                "inf" => Ok(f64::INFINITY),
                "-inf" => Ok(f64::NEG_INFINITY),
                "nan" => Ok(f64::NAN),
                other => Err(D::Error::custom(format!("expected a number, \"inf\", \"-inf\" or \"nan\", got \"{}\"", other))),
            },
        }
    }
}

/// Ledger plus statistics. `statistics` may be absent and consumers must
/// tolerate that.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestReport {
    pub success: bool,
    pub message: String,
    pub trades: Vec<BacktestTrade>,
    pub statistics: Option<BacktestSummary>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub score: ScoreResult,
    pub indicators: IndicatorSnapshot,
    pub backtest: BacktestReport,
}

/// A named output line of an indicator calculator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Indicator {
    pub name: String,
    pub parameters: serde_json::Value,
    pub values: Vec<f64>,
}
