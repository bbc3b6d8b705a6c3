// Handler for the GetMarketData RPC
use std::sync::Arc;
use tokio::sync::{mpsc, RwLock};
use tokio_stream::wrappers::ReceiverStream;
use tonic::{Response, Status};

use super::helpers::{from_grpc_timestamp, to_grpc_candle};
use crate::data::market_data::MarketDataStore;
use crate::error::EngineError;
use crate::services::{MarketDataRequest, MarketDataResponse};

/// Candles per streamed message.
pub const CANDLES_PER_MESSAGE: usize = 250;

pub async fn handle_get_market_data(
    req_payload: MarketDataRequest,
    market_data_store: Arc<RwLock<MarketDataStore>>,
) -> Result<Response<ReceiverStream<Result<MarketDataResponse, Status>>>, Status> {
    let from_ts = from_grpc_timestamp(req_payload.from_timestamp)?;
    let to_ts = from_grpc_timestamp(req_payload.to_timestamp)?;
    if let (Some(from), Some(to)) = (from_ts, to_ts) {
        if from > to {
            return Err(EngineError::InvalidRequest(format!("from_timestamp {} is after to_timestamp {}", from, to)).into());
        }
    }

    let candles = market_data_store
        .read()
        .await
        .get_candles(&req_payload.symbol, from_ts, to_ts)
        .ok_or_else(|| EngineError::MarketDataError(format!("Market data not found for symbol '{}'", req_payload.symbol)))?;

    let (tx, rx) = mpsc::channel(4);
    let symbol = req_payload.symbol;

    tokio::spawn(async move {
        if candles.is_empty() {
            tracing::warn!(symbol = %symbol, from_ts = ?from_ts, to_ts = ?to_ts, "No candles in the requested range");
            let _ = tx.send(Ok(MarketDataResponse { candles: Vec::new() })).await;
            return;
        }

        for chunk in candles.chunks(CANDLES_PER_MESSAGE) {
            let message = MarketDataResponse { candles: chunk.iter().map(to_grpc_candle).collect() };
            if tx.send(Ok(message)).await.is_err() {
                tracing::debug!(symbol = %symbol, "Market data receiver dropped, stopping stream");
                return;
            }
        }
        tracing::debug!(symbol = %symbol, count = candles.len(), "Market data streamed");
    });

    Ok(Response::new(ReceiverStream::new(rx)))
}
