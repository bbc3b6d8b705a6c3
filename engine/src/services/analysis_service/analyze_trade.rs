// Handlers for the AnalyzeTrade and RunBacktest RPCs
use std::sync::Arc;
use tokio::sync::RwLock;
use tonic::{Response, Status};
use uuid::Uuid;

use super::helpers::{parse_targets, parse_trade_parameters, require_symbol, to_grpc_analysis, to_grpc_report};
use crate::analysis::TradeAnalyzer;
use crate::data::market_data::{MarketDataStore, PriceHistoryProvider};
use crate::services::{AnalyzeTradeRequest, AnalyzeTradeResponse, BacktestRequest, BacktestResponse};

pub async fn handle_analyze_trade(
    req_payload: AnalyzeTradeRequest,
    market_data_store: Arc<RwLock<MarketDataStore>>,
    analyzer: &TradeAnalyzer,
) -> Result<Response<AnalyzeTradeResponse>, Status> {
    let request_id = Uuid::new_v4().to_string();
    let symbol = require_symbol(&req_payload.symbol)?;
    let params = parse_trade_parameters(
        req_payload.entry_price,
        req_payload.take_profit,
        req_payload.stop_loss,
        &req_payload.direction,
    )?;

    let history = market_data_store
        .read()
        .await
        .price_history(symbol, req_payload.lookback_days as usize)?;

    let result = analyzer.analyze(&history, &params);
    if !result.backtest.success {
        tracing::warn!(request_id = %request_id, symbol, message = %result.backtest.message, "Analysis returned a degraded backtest");
    }
    tracing::info!(
        request_id = %request_id,
        symbol,
        overall_score = result.score.overall_score,
        recommendation = %result.score.recommendation,
        "AnalyzeTrade complete (handler)"
    );

    Ok(Response::new(to_grpc_analysis(request_id, &result)))
}

pub async fn handle_run_backtest(
    req_payload: BacktestRequest,
    market_data_store: Arc<RwLock<MarketDataStore>>,
    analyzer: &TradeAnalyzer,
) -> Result<Response<BacktestResponse>, Status> {
    let request_id = Uuid::new_v4().to_string();
    let symbol = require_symbol(&req_payload.symbol)?;
    let targets = parse_targets(req_payload.take_profit, req_payload.stop_loss, &req_payload.direction)?;

    let history = market_data_store
        .read()
        .await
        .price_history(symbol, req_payload.lookback_days as usize)?;

    let report = analyzer.replay(&history, &targets);
    tracing::info!(
        request_id = %request_id,
        symbol,
        success = report.success,
        trades = report.trades.len(),
        "RunBacktest complete (handler)"
    );

    Ok(Response::new(BacktestResponse {
        request_id,
        backtest: Some(to_grpc_report(&report)),
    }))
}
