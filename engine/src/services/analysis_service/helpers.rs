// Conversions between domain models and generated gRPC messages
use crate::backtest::Targets;
use crate::error::EngineError;
use crate::services::generated as proto;
use chrono::{DateTime, Utc};
use shared::models::{
    AnalysisResult, BacktestReport, BacktestSummary, BacktestTrade, Candle as DomainCandle, Direction, IndicatorSnapshot,
    ScoreResult, TradeParameters,
};

pub fn to_grpc_candle(domain_candle: &DomainCandle) -> proto::Candle {
    proto::Candle {
        timestamp: domain_candle.time(),
        open: domain_candle.open,
        high: domain_candle.high,
        low: domain_candle.low,
        close: domain_candle.close,
        volume: domain_candle.volume,
    }
}

/// Epoch seconds to a UTC timestamp; 0 means "no bound".
pub fn from_grpc_timestamp(ts_secs: i64) -> Result<Option<DateTime<Utc>>, EngineError> {
    if ts_secs == 0 {
        return Ok(None);
    }
    DateTime::from_timestamp(ts_secs, 0)
        .map(Some)
        .ok_or_else(|| EngineError::InvalidRequest(format!("Invalid gRPC timestamp: {}", ts_secs)))
}

pub fn require_symbol(symbol: &str) -> Result<&str, EngineError> {
    let symbol = symbol.trim();
    if symbol.is_empty() {
        return Err(EngineError::InvalidRequest("Symbol must not be empty".to_string()));
    }
    Ok(symbol)
}

fn require_price(name: &str, value: f64) -> Result<f64, EngineError> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(EngineError::InvalidRequest(format!("{} must be a positive price, got {}", name, value)))
    }
}

pub fn parse_trade_parameters(entry_price: f64, take_profit: f64, stop_loss: f64, direction: &str) -> Result<TradeParameters, EngineError> {
    Ok(TradeParameters {
        entry_price: require_price("entry_price", entry_price)?,
        take_profit: require_price("take_profit", take_profit)?,
        stop_loss: require_price("stop_loss", stop_loss)?,
        direction: direction.parse::<Direction>()?,
    })
}

pub fn parse_targets(take_profit: f64, stop_loss: f64, direction: &str) -> Result<Targets, EngineError> {
    Ok(Targets {
        take_profit: require_price("take_profit", take_profit)?,
        stop_loss: require_price("stop_loss", stop_loss)?,
        direction: direction.parse::<Direction>()?,
    })
}

pub fn to_grpc_score(score: &ScoreResult) -> proto::Score {
    proto::Score {
        trend_score: score.trend_score,
        momentum_score: score.momentum_score,
        volatility_score: score.volatility_score,
        market_score: score.market_score,
        overall_score: score.overall_score,
        take_profit_probability: u32::from(score.take_profit_probability),
        stop_loss_probability: u32::from(score.stop_loss_probability),
        recommendation: score.recommendation.clone(),
        explanations: Some(proto::Explanations {
            trend: score.explanations.trend.clone(),
            momentum: score.explanations.momentum.clone(),
            volatility: score.explanations.volatility.clone(),
            probability: score.explanations.probability.clone(),
        }),
    }
}

pub fn to_grpc_snapshot(snapshot: &IndicatorSnapshot) -> proto::IndicatorSnapshot {
    proto::IndicatorSnapshot {
        ema: snapshot.ema,
        rsi: snapshot.rsi,
        upper_band: snapshot.bands.map(|b| b.upper),
        middle_band: snapshot.bands.map(|b| b.middle),
        lower_band: snapshot.bands.map(|b| b.lower),
        band_width: snapshot.bands.map(|b| b.band_width),
        average_band_width: snapshot.average_band_width,
    }
}

fn to_grpc_trade(trade: &BacktestTrade) -> proto::BacktestTrade {
    proto::BacktestTrade {
        entry_time: trade.entry_time.timestamp(),
        exit_time: trade.exit_time.timestamp(),
        entry_price: trade.entry_price,
        exit_price: trade.exit_price,
        high_price: trade.high_price,
        low_price: trade.low_price,
        result: trade.result.as_str().to_string(),
        profit_loss_percent: trade.profit_loss_percent,
        stop_loss: trade.stop_loss,
        take_profit: trade.take_profit,
        metrics: Some(proto::TradeMetrics {
            max_favorable_excursion: trade.metrics.max_favorable_excursion,
            max_adverse_excursion: trade.metrics.max_adverse_excursion,
            time_to_exit_days: trade.metrics.time_to_exit_days,
            risk_reward_ratio: trade.metrics.risk_reward_ratio,
        }),
    }
}

fn to_grpc_summary(summary: &BacktestSummary) -> proto::BacktestSummary {
    proto::BacktestSummary {
        total_trades: summary.total_trades as u32,
        winning_trades: summary.winning_trades as u32,
        losing_trades: summary.losing_trades as u32,
        win_rate: summary.win_rate,
        average_profit: summary.average_profit,
        max_profit: summary.max_profit,
        max_loss: summary.max_loss,
        profit_factor: summary.profit_factor,
        average_win: summary.average_win,
        average_loss: summary.average_loss,
        average_favorable_excursion: summary.average_favorable_excursion,
        average_adverse_excursion: summary.average_adverse_excursion,
    }
}

pub fn to_grpc_report(report: &BacktestReport) -> proto::BacktestReport {
    proto::BacktestReport {
        success: report.success,
        message: report.message.clone(),
        trades: report.trades.iter().map(to_grpc_trade).collect(),
        statistics: report.statistics.as_ref().map(to_grpc_summary),
    }
}

pub fn to_grpc_analysis(request_id: String, result: &AnalysisResult) -> proto::AnalyzeTradeResponse {
    proto::AnalyzeTradeResponse {
        request_id,
        score: Some(to_grpc_score(&result.score)),
        indicators: Some(to_grpc_snapshot(&result.indicators)),
        backtest: Some(to_grpc_report(&result.backtest)),
    }
}
