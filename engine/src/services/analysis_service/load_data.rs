// Handlers for the LoadCsvData and LoadSampleData RPCs
use std::sync::Arc;
use tokio::sync::RwLock;
use tonic::{Response, Status};

use super::helpers::{from_grpc_timestamp, require_symbol};
use crate::data::csv_parser::CsvPriceParser;
use crate::data::market_data::MarketDataStore;
use crate::data::sample_data::{SampleDataGenerator, MAX_SAMPLE_DAYS};
use crate::error::EngineError;
use crate::services::{LoadCsvRequest, LoadDataResponse, SampleDataRequest};
use shared::models::Candle;

pub async fn handle_load_csv_data(
    req_payload: LoadCsvRequest,
    market_data_store: Arc<RwLock<MarketDataStore>>,
) -> Result<Response<LoadDataResponse>, Status> {
    let symbol = require_symbol(&req_payload.symbol)?;
    let candles = CsvPriceParser::load_candles_from_csv(&req_payload.file_path)?;
    Ok(Response::new(store_candles(symbol, candles, &market_data_store).await))
}

pub async fn handle_load_sample_data(
    req_payload: SampleDataRequest,
    market_data_store: Arc<RwLock<MarketDataStore>>,
) -> Result<Response<LoadDataResponse>, Status> {
    let symbol = require_symbol(&req_payload.symbol)?;
    let generator = sample_generator(&req_payload)?;
    let candles = generator.generate(req_payload.days as usize, req_payload.start_price);
    tracing::debug!(symbol, seed = req_payload.seed, days = req_payload.days, "Generated sample price history");
    Ok(Response::new(store_candles(symbol, candles, &market_data_store).await))
}

fn sample_generator(req_payload: &SampleDataRequest) -> Result<SampleDataGenerator, EngineError> {
    let days = req_payload.days as usize;
    if days == 0 || days > MAX_SAMPLE_DAYS {
        return Err(EngineError::InvalidRequest(format!(
            "days must be between 1 and {}, got {}",
            MAX_SAMPLE_DAYS, days
        )));
    }
    if !(req_payload.start_price.is_finite() && req_payload.start_price > 0.0) {
        return Err(EngineError::InvalidRequest(format!(
            "start_price must be a positive price, got {}",
            req_payload.start_price
        )));
    }

    let mut generator = SampleDataGenerator::new(req_payload.seed);
    if let Some(drift) = req_payload.drift {
        if !(drift.is_finite() && drift.abs() < 1.0) {
            return Err(EngineError::InvalidRequest(format!("drift must lie in (-1, 1), got {}", drift)));
        }
        generator = generator.with_drift(drift);
    }
    if let Some(volatility) = req_payload.volatility {
        if !(volatility.is_finite() && (0.0..1.0).contains(&volatility)) {
            return Err(EngineError::InvalidRequest(format!("volatility must lie in [0, 1), got {}", volatility)));
        }
        generator = generator.with_volatility(volatility);
    }
    if let Some(start) = from_grpc_timestamp(req_payload.start_timestamp)? {
        generator = generator.with_start(start);
    }
    Ok(generator)
}

async fn store_candles(symbol: &str, candles: Vec<Candle>, market_data_store: &RwLock<MarketDataStore>) -> LoadDataResponse {
    let received = candles.len();
    let (before, after) = {
        let mut store = market_data_store.write().await;
        let before = store.candle_count(symbol);
        (before, store.add_candles(symbol, candles))
    };
    // Same-day candles replace stored ones, so only new days add to the count.
    let candles_loaded = after.saturating_sub(before);
    tracing::info!(symbol, received, candles_loaded, total = after, "Stored price history");
    LoadDataResponse {
        success: true,
        message: format!("Loaded {} candles for symbol {} ({} stored)", candles_loaded, symbol, after),
        candles_loaded: i32::try_from(candles_loaded).unwrap_or(i32::MAX),
    }
}
