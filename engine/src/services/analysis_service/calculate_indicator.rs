// Handler for the CalculateIndicator RPC
use std::sync::Arc;
use tokio::sync::RwLock;
use tonic::{Response, Status};

use crate::config::settings::AnalysisSettings;
use crate::data::market_data::MarketDataStore;
use crate::error::EngineError;
use crate::indicators::{Bollinger, Ema, IndicatorCalculator, Rsi};
use crate::services::{IndicatorLine, IndicatorRequest, IndicatorResponse};

fn period_param(params: &serde_json::Value, default: usize) -> Result<usize, EngineError> {
    let period = params.get("period").and_then(|v| v.as_u64()).map_or(default, |p| p as usize);
    if period == 0 {
        return Err(EngineError::IndicatorError("Indicator period cannot be 0".to_string()));
    }
    Ok(period)
}

pub fn build_calculator(
    indicator_type: &str,
    params: &serde_json::Value,
    defaults: &AnalysisSettings,
) -> Result<Box<dyn IndicatorCalculator>, EngineError> {
    match indicator_type.to_lowercase().as_str() {
        "ema" => Ok(Box::new(Ema::new(period_param(params, defaults.ema_period)?))),
        "rsi" => Ok(Box::new(Rsi::new(period_param(params, defaults.rsi_period)?))),
        "bollinger" | "bb" => {
            let std_dev = params
                .get("std_dev")
                .and_then(|v| v.as_f64())
                .unwrap_or(defaults.bollinger_std_dev);
            if !(std_dev.is_finite() && std_dev > 0.0) {
                return Err(EngineError::IndicatorError(format!("Invalid std_dev multiplier: {}", std_dev)));
            }
            Ok(Box::new(Bollinger::new(period_param(params, defaults.bollinger_period)?, std_dev)))
        }
        other => Err(EngineError::IndicatorError(format!("Unknown indicator type: {}", other))),
    }
}

pub async fn handle_calculate_indicator(
    req_payload: IndicatorRequest,
    market_data_store: Arc<RwLock<MarketDataStore>>,
    defaults: &AnalysisSettings,
) -> Result<Response<IndicatorResponse>, Status> {
    tracing::debug!(symbol = %req_payload.symbol, indicator_type = %req_payload.indicator_type, "Handling CalculateIndicatorRequest in dedicated handler");

    let candles = market_data_store
        .read()
        .await
        .get_candles(&req_payload.symbol, None, None)
        .ok_or_else(|| EngineError::MarketDataError(format!("Symbol '{}' not found", req_payload.symbol)))?;

    let params: serde_json::Value = if req_payload.parameters.trim().is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_str(&req_payload.parameters).map_err(|e| {
            tracing::error!(
                indicator_type = %req_payload.indicator_type,
                parameters = %req_payload.parameters,
                error_detail = ?e,
                "Invalid JSON parameters for indicator (handler)"
            );
            EngineError::IndicatorError(format!("Invalid JSON parameters for indicator '{}': {}", req_payload.indicator_type, e))
        })?
    };

    let calculator = build_calculator(&req_payload.indicator_type, &params, defaults)?;
    let lines = calculator
        .calculate(&candles)
        .into_iter()
        .map(|indicator| IndicatorLine { name: indicator.name, values: indicator.values })
        .collect();

    Ok(Response::new(IndicatorResponse {
        indicator_name: calculator.name().to_string(),
        lines,
    }))
}
