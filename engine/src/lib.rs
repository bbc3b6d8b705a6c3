// Engine library root: indicators, trade scoring, backtesting and the gRPC
// surface that exposes them.

pub mod analysis;
pub mod backtest;
pub mod config;
pub mod data;
pub mod error;
pub mod indicators;
pub mod scoring;
pub mod services;

pub use analysis::TradeAnalyzer;
pub use error::EngineError;
