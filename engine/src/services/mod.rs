// gRPC surface of the engine. Code generated from proto/analysis.proto.
pub mod generated {
    tonic::include_proto!("analysis");
}

pub mod analysis_service;

pub use generated::trade_analysis_server::{TradeAnalysis, TradeAnalysisServer};
pub use generated::{
    AnalyzeTradeRequest, AnalyzeTradeResponse, BacktestRequest, BacktestResponse, Candle as ProtoCandle,
    IndicatorLine, IndicatorRequest, IndicatorResponse, LoadCsvRequest, LoadDataResponse, MarketDataRequest,
    MarketDataResponse, SampleDataRequest,
};
