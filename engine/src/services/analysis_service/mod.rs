// gRPC service for trade analysis. Each RPC logs its receipt and hands the
// payload to a handler in a sibling module.
use super::{
    AnalyzeTradeRequest, AnalyzeTradeResponse, BacktestRequest, BacktestResponse, IndicatorRequest, IndicatorResponse,
    LoadCsvRequest, LoadDataResponse, MarketDataRequest, MarketDataResponse, SampleDataRequest, TradeAnalysis,
};
use crate::analysis::TradeAnalyzer;
use crate::data::market_data::MarketDataStore;
use std::sync::Arc;
use tokio::sync::RwLock;
use tokio_stream::wrappers::ReceiverStream;
use tonic::{Request, Response, Status};

pub mod analyze_trade;
pub mod calculate_indicator;
pub mod get_market_data;
pub mod helpers;
pub mod load_data;

pub struct AnalysisService {
    market_data_store: Arc<RwLock<MarketDataStore>>,
    analyzer: TradeAnalyzer,
}

impl AnalysisService {
    pub fn new(market_data_store: Arc<RwLock<MarketDataStore>>, analyzer: TradeAnalyzer) -> Self {
        AnalysisService { market_data_store, analyzer }
    }
}

#[tonic::async_trait]
impl TradeAnalysis for AnalysisService {
    async fn load_csv_data(&self, request: Request<LoadCsvRequest>) -> Result<Response<LoadDataResponse>, Status> {
        let req_payload = request.into_inner();
        tracing::info!(
            symbol = %req_payload.symbol,
            path = %req_payload.file_path,
            "Received LoadCsvRequest, dispatching to handler."
        );
        load_data::handle_load_csv_data(req_payload, self.market_data_store.clone()).await
    }

    async fn load_sample_data(&self, request: Request<SampleDataRequest>) -> Result<Response<LoadDataResponse>, Status> {
        let req_payload = request.into_inner();
        tracing::info!(
            symbol = %req_payload.symbol,
            days = req_payload.days,
            seed = req_payload.seed,
            "Received SampleDataRequest, dispatching to handler."
        );
        load_data::handle_load_sample_data(req_payload, self.market_data_store.clone()).await
    }

    type GetMarketDataStream = ReceiverStream<Result<MarketDataResponse, Status>>;
    async fn get_market_data(&self, request: Request<MarketDataRequest>) -> Result<Response<Self::GetMarketDataStream>, Status> {
        let req_payload = request.into_inner();
        tracing::info!(
            symbol = %req_payload.symbol,
            from_timestamp = req_payload.from_timestamp,
            to_timestamp = req_payload.to_timestamp,
            "Received GetMarketDataRequest, dispatching to handler."
        );
        get_market_data::handle_get_market_data(req_payload, self.market_data_store.clone()).await
    }

    async fn calculate_indicator(&self, request: Request<IndicatorRequest>) -> Result<Response<IndicatorResponse>, Status> {
        let req_payload = request.into_inner();
        tracing::info!(
            symbol = %req_payload.symbol,
            indicator_type = %req_payload.indicator_type,
            parameters = %req_payload.parameters,
            "Received CalculateIndicatorRequest, dispatching to handler."
        );
        calculate_indicator::handle_calculate_indicator(req_payload, self.market_data_store.clone(), self.analyzer.settings()).await
    }

    async fn analyze_trade(&self, request: Request<AnalyzeTradeRequest>) -> Result<Response<AnalyzeTradeResponse>, Status> {
        let req_payload = request.into_inner();
        tracing::info!(
            symbol = %req_payload.symbol,
            direction = %req_payload.direction,
            entry_price = req_payload.entry_price,
            take_profit = req_payload.take_profit,
            stop_loss = req_payload.stop_loss,
            "Received AnalyzeTradeRequest, dispatching to handler."
        );
        analyze_trade::handle_analyze_trade(req_payload, self.market_data_store.clone(), &self.analyzer).await
    }

    async fn run_backtest(&self, request: Request<BacktestRequest>) -> Result<Response<BacktestResponse>, Status> {
        let req_payload = request.into_inner();
        tracing::info!(
            symbol = %req_payload.symbol,
            direction = %req_payload.direction,
            take_profit = req_payload.take_profit,
            stop_loss = req_payload.stop_loss,
            "Received BacktestRequest, dispatching to handler."
        );
        analyze_trade::handle_run_backtest(req_payload, self.market_data_store.clone(), &self.analyzer).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;
    use tokio_stream::StreamExt;

    fn create_test_service() -> AnalysisService {
        AnalysisService::new(Arc::new(RwLock::new(MarketDataStore::new())), TradeAnalyzer::default())
    }

    fn create_dummy_csv(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "{}", content).unwrap();
        file.flush().unwrap();
        file
    }

    async fn service_with_sample(symbol: &str, days: u32) -> AnalysisService {
        let service = create_test_service();
        let request = Request::new(SampleDataRequest { symbol: symbol.to_string(), days, seed: 11, start_price: 100.0, ..Default::default() });
        service.load_sample_data(request).await.unwrap();
        service
    }

    fn analyze_request(symbol: &str) -> AnalyzeTradeRequest {
        AnalyzeTradeRequest {
            symbol: symbol.to_string(),
            lookback_days: 0,
            entry_price: 100.0,
            take_profit: 106.0,
            stop_loss: 97.0,
            direction: "long".to_string(),
        }
    }

    #[tokio::test]
    async fn test_load_csv_data_success() {
        let service = create_test_service();
        let tmp_file = create_dummy_csv("time,open,high,low,close,volume\n2024-01-02,100,102,99,101,1500\n2024-01-03,101,103,100,102,1700");
        let file_path = tmp_file.path().to_str().unwrap().to_string();
        let request = Request::new(LoadCsvRequest { file_path, symbol: "ABC".to_string() });
        let response = service.load_csv_data(request).await.unwrap().into_inner();
        assert!(response.success);
        assert_eq!(response.candles_loaded, 2);
        assert!(response.message.contains("Loaded 2 candles"));
        let store = service.market_data_store.read().await;
        assert_eq!(store.get_candles("ABC", None, None).unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_load_csv_data_file_not_found() {
        let service = create_test_service();
        let request = Request::new(LoadCsvRequest { file_path: "non_existent_file.csv".to_string(), symbol: "ABC".to_string() });
        let status = service.load_csv_data(request).await.unwrap_err();
        assert_eq!(status.code(), tonic::Code::Internal);
        assert!(status.message().contains("I/O error"));
    }

    #[tokio::test]
    async fn test_load_csv_data_bad_content() {
        let service = create_test_service();
        let tmp_file = create_dummy_csv("time,open,high,low,close\n2024-01-02,NOT_A_NUMBER,102,99,101");
        let file_path = tmp_file.path().to_str().unwrap().to_string();
        let request = Request::new(LoadCsvRequest { file_path, symbol: "ABC".to_string() });
        let status = service.load_csv_data(request).await.unwrap_err();
        assert_eq!(status.code(), tonic::Code::InvalidArgument);
        assert!(status.message().contains("CSV parsing system error"));
    }

    #[tokio::test]
    async fn test_load_sample_data_rejects_bad_input() {
        let service = create_test_service();
        let zero_days = Request::new(SampleDataRequest { symbol: "S".to_string(), days: 0, seed: 1, start_price: 10.0, ..Default::default() });
        assert_eq!(service.load_sample_data(zero_days).await.unwrap_err().code(), tonic::Code::InvalidArgument);
        let bad_price = Request::new(SampleDataRequest { symbol: "S".to_string(), days: 10, seed: 1, start_price: 0.0, ..Default::default() });
        assert_eq!(service.load_sample_data(bad_price).await.unwrap_err().code(), tonic::Code::InvalidArgument);
        let no_symbol = Request::new(SampleDataRequest { symbol: " ".to_string(), days: 10, seed: 1, start_price: 10.0, ..Default::default() });
        assert_eq!(service.load_sample_data(no_symbol).await.unwrap_err().code(), tonic::Code::InvalidArgument);
        let too_many_days = Request::new(SampleDataRequest { symbol: "S".to_string(), days: u32::MAX, seed: 1, start_price: 10.0, ..Default::default() });
        let status = service.load_sample_data(too_many_days).await.unwrap_err();
        assert_eq!(status.code(), tonic::Code::InvalidArgument);
        assert!(status.message().contains("days must be between 1 and 36500"));
        let bad_volatility = Request::new(SampleDataRequest { symbol: "S".to_string(), days: 10, seed: 1, start_price: 10.0, volatility: Some(f64::NAN), ..Default::default() });
        assert_eq!(service.load_sample_data(bad_volatility).await.unwrap_err().code(), tonic::Code::InvalidArgument);
        let bad_drift = Request::new(SampleDataRequest { symbol: "S".to_string(), days: 10, seed: 1, start_price: 10.0, drift: Some(2.0), ..Default::default() });
        assert_eq!(service.load_sample_data(bad_drift).await.unwrap_err().code(), tonic::Code::InvalidArgument);
        assert!(service.market_data_store.read().await.get_candles("S", None, None).is_none());
    }

    #[tokio::test]
    async fn test_load_sample_data_passes_shape_through() {
        let service = create_test_service();
        let request = Request::new(SampleDataRequest {
            symbol: "DRIFT".to_string(),
            days: 3,
            seed: 4,
            start_price: 100.0,
            drift: Some(0.01),
            volatility: Some(0.0),
            start_timestamp: 1_590_969_600, // 2020-06-01
        });
        let response = service.load_sample_data(request).await.unwrap().into_inner();
        assert_eq!(response.candles_loaded, 3);

        let store = service.market_data_store.read().await;
        let candles = store.get_candles("DRIFT", None, None).unwrap();
        assert_eq!(candles[0].time(), 1_590_969_600);
        assert!((candles[0].close - 101.0).abs() < 1e-9);
        assert!((candles[2].close - 100.0 * 1.01f64.powi(3)).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_load_csv_data_counts_stored_days() {
        let service = create_test_service();
        let tmp_file = create_dummy_csv("time,open,high,low,close\n2024-01-02,100,102,99,101\n2024-01-02,101,103,100,102\n2024-01-03,102,104,101,103");
        let file_path = tmp_file.path().to_str().unwrap().to_string();
        let request = Request::new(LoadCsvRequest { file_path: file_path.clone(), symbol: "DUP".to_string() });
        let response = service.load_csv_data(request).await.unwrap().into_inner();
        assert_eq!(response.candles_loaded, 2);
        assert!(response.message.contains("Loaded 2 candles"));

        // Reloading the same days replaces them without adding any.
        let request = Request::new(LoadCsvRequest { file_path, symbol: "DUP".to_string() });
        let response = service.load_csv_data(request).await.unwrap().into_inner();
        assert_eq!(response.candles_loaded, 0);
        assert!(response.message.contains("(2 stored)"));
        assert_eq!(service.market_data_store.read().await.candle_count("DUP"), 2);
    }

    #[tokio::test]
    async fn test_get_market_data_streams_candles() {
        let service = service_with_sample("SYN", 30).await;
        let request = Request::new(MarketDataRequest { symbol: "SYN".to_string(), from_timestamp: 0, to_timestamp: 0 });
        let mut stream = service.get_market_data(request).await.unwrap().into_inner();
        let first = stream.next().await.unwrap().unwrap();
        assert_eq!(first.candles.len(), 30);
        assert!(stream.next().await.is_none());
    }

    #[tokio::test]
    async fn test_get_market_data_chunks_long_history() {
        let service = service_with_sample("SYN", 600).await;
        let request = Request::new(MarketDataRequest { symbol: "SYN".to_string(), from_timestamp: 0, to_timestamp: 0 });
        let stream = service.get_market_data(request).await.unwrap().into_inner();
        let sizes: Vec<usize> = stream.map(|msg| msg.unwrap().candles.len()).collect().await;
        assert_eq!(sizes, vec![250, 250, 100]);
    }

    #[tokio::test]
    async fn test_get_market_data_range_filter() {
        let service = service_with_sample("SYN", 30).await;
        // Sample history starts 2024-01-01; ask for Jan 5 to Jan 9 inclusive.
        let request = Request::new(MarketDataRequest { symbol: "SYN".to_string(), from_timestamp: 1_704_412_800, to_timestamp: 1_704_758_400 });
        let mut stream = service.get_market_data(request).await.unwrap().into_inner();
        let message = stream.next().await.unwrap().unwrap();
        assert_eq!(message.candles.len(), 5);
        assert_eq!(message.candles[0].timestamp, 1_704_412_800);

        let inverted = Request::new(MarketDataRequest { symbol: "SYN".to_string(), from_timestamp: 1_704_758_400, to_timestamp: 1_704_412_800 });
        assert_eq!(service.get_market_data(inverted).await.unwrap_err().code(), tonic::Code::InvalidArgument);
    }

    #[tokio::test]
    async fn test_get_market_data_unknown_symbol() {
        let service = create_test_service();
        let request = Request::new(MarketDataRequest { symbol: "NOPE".to_string(), from_timestamp: 0, to_timestamp: 0 });
        let status = service.get_market_data(request).await.unwrap_err();
        assert_eq!(status.code(), tonic::Code::NotFound);
    }

    #[tokio::test]
    async fn test_calculate_indicator_variants() {
        let service = service_with_sample("SYN", 60).await;

        let ema = Request::new(IndicatorRequest { symbol: "SYN".to_string(), indicator_type: "EMA".to_string(), parameters: r#"{"period": 10}"#.to_string() });
        let response = service.calculate_indicator(ema).await.unwrap().into_inner();
        assert_eq!(response.indicator_name, "EMA(10)");
        assert_eq!(response.lines[0].values.len(), 60);

        let rsi = Request::new(IndicatorRequest { symbol: "SYN".to_string(), indicator_type: "rsi".to_string(), parameters: String::new() });
        let response = service.calculate_indicator(rsi).await.unwrap().into_inner();
        assert_eq!(response.indicator_name, "RSI(14)");
        assert_eq!(response.lines[0].values.len(), 46);
        assert!(response.lines[0].values.iter().all(|v| (0.0..=100.0).contains(v)));

        let bands = Request::new(IndicatorRequest { symbol: "SYN".to_string(), indicator_type: "bollinger".to_string(), parameters: r#"{"period": 20, "std_dev": 2.0}"#.to_string() });
        let response = service.calculate_indicator(bands).await.unwrap().into_inner();
        assert_eq!(response.lines.len(), 4);
    }

    #[tokio::test]
    async fn test_calculate_indicator_errors() {
        let service = service_with_sample("SYN", 60).await;

        let zero_period = Request::new(IndicatorRequest { symbol: "SYN".to_string(), indicator_type: "ema".to_string(), parameters: r#"{"period": 0}"#.to_string() });
        assert_eq!(service.calculate_indicator(zero_period).await.unwrap_err().code(), tonic::Code::InvalidArgument);

        let bad_json = Request::new(IndicatorRequest { symbol: "SYN".to_string(), indicator_type: "ema".to_string(), parameters: "{period".to_string() });
        let status = service.calculate_indicator(bad_json).await.unwrap_err();
        assert!(status.message().contains("Invalid JSON parameters"));

        let unknown = Request::new(IndicatorRequest { symbol: "SYN".to_string(), indicator_type: "macd".to_string(), parameters: String::new() });
        assert_eq!(service.calculate_indicator(unknown).await.unwrap_err().code(), tonic::Code::InvalidArgument);

        let missing = Request::new(IndicatorRequest { symbol: "NOPE".to_string(), indicator_type: "ema".to_string(), parameters: String::new() });
        assert_eq!(service.calculate_indicator(missing).await.unwrap_err().code(), tonic::Code::NotFound);
    }

    #[tokio::test]
    async fn test_analyze_trade_full_result() {
        let service = service_with_sample("SYN", 150).await;
        let response = service.analyze_trade(Request::new(analyze_request("SYN"))).await.unwrap().into_inner();

        assert!(!response.request_id.is_empty());
        let score = response.score.unwrap();
        assert_eq!(score.take_profit_probability + score.stop_loss_probability, 100);
        assert!((0.0..=100.0).contains(&score.overall_score));
        let backtest = response.backtest.unwrap();
        assert!(backtest.success);
        assert_eq!(backtest.trades.len(), 89);
        assert!(response.indicators.unwrap().rsi.is_some());
    }

    #[tokio::test]
    async fn test_analyze_trade_unknown_symbol_degrades() {
        let service = create_test_service();
        let response = service.analyze_trade(Request::new(analyze_request("NOPE"))).await.unwrap().into_inner();
        let backtest = response.backtest.unwrap();
        assert!(!backtest.success);
        assert!(backtest.trades.is_empty());
        assert!(backtest.statistics.is_none());
    }

    #[tokio::test]
    async fn test_analyze_trade_rejects_bad_direction() {
        let service = service_with_sample("SYN", 30).await;
        let mut request = analyze_request("SYN");
        request.direction = "sideways".to_string();
        let status = service.analyze_trade(Request::new(request)).await.unwrap_err();
        assert_eq!(status.code(), tonic::Code::InvalidArgument);
    }

    #[tokio::test]
    async fn test_run_backtest_respects_lookback() {
        let service = service_with_sample("SYN", 200).await;
        let request = Request::new(BacktestRequest {
            symbol: "SYN".to_string(),
            lookback_days: 40,
            take_profit: 95.0,
            stop_loss: 104.0,
            direction: "short".to_string(),
        });
        let response = service.run_backtest(request).await.unwrap().into_inner();
        let backtest = response.backtest.unwrap();
        assert!(backtest.success);
        assert_eq!(backtest.trades.len(), 39);
        let stats = backtest.statistics.unwrap();
        assert_eq!(stats.total_trades, 39);
        assert!(stats.winning_trades + stats.losing_trades <= stats.total_trades);
    }
}
