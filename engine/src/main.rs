// Engine main entry point
use engine::analysis::TradeAnalyzer;
use engine::config::settings::EngineSettings;
use engine::data::market_data::MarketDataStore;
use engine::services::analysis_service::AnalysisService;
use engine::services::TradeAnalysisServer;
use std::sync::Arc;
use tokio::sync::RwLock;
use tonic::transport::Server;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    info!("Starting TradeScope Engine...");

    let settings = EngineSettings::from_env()?;
    let addr = format!("{}:{}", settings.host, settings.port).parse()?;
    info!(
        ema_period = settings.analysis.ema_period,
        rsi_period = settings.analysis.rsi_period,
        backtest_window = settings.analysis.backtest_window,
        "Engine will listen on {}",
        addr
    );

    let market_data_store = Arc::new(RwLock::new(MarketDataStore::new()));
    let analysis_service = AnalysisService::new(market_data_store, TradeAnalyzer::new(settings.analysis));

    Server::builder()
        .add_service(TradeAnalysisServer::new(analysis_service))
        .serve(addr)
        .await?;

    Ok(())
}
