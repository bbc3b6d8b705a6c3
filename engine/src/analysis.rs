// Single-request facade over the scorer and the backtest simulator
use crate::backtest::{self, Targets};
use crate::config::settings::AnalysisSettings;
use crate::indicators;
use crate::scoring;
use shared::models::{closes, AnalysisResult, BacktestReport, Candle, ScoreResult, TradeParameters};

/// Runs the scorer and the simulator for one request. Holds no state
/// besides its settings, so one instance can serve any number of requests.
#[derive(Debug, Clone, Default)]
pub struct TradeAnalyzer {
    settings: AnalysisSettings,
}

impl TradeAnalyzer {
    pub fn new(settings: AnalysisSettings) -> Self {
        TradeAnalyzer { settings }
    }

    pub fn settings(&self) -> &AnalysisSettings {
        &self.settings
    }

    /// Scores the trade and replays its targets. The two halves are independent.
    pub fn analyze(&self, history: &[Candle], params: &TradeParameters) -> AnalysisResult {
        let prices = closes(history);
        let snapshot = indicators::snapshot(&prices, &self.settings);
        let score = scoring::score_with_snapshot(&prices, &snapshot, params, &self.settings);
        let backtest = self.backtest(history, params);

        tracing::info!(
            candles = history.len(),
            direction = %params.direction,
            overall_score = score.overall_score,
            recommendation = %score.recommendation,
            backtest_success = backtest.success,
            "Trade analysis complete"
        );

        AnalysisResult {
            score,
            indicators: snapshot,
            backtest,
        }
    }

    pub fn score(&self, history: &[Candle], params: &TradeParameters) -> ScoreResult {
        scoring::score_trade(&closes(history), params, &self.settings)
    }

    /// Replays take-profit and stop-loss; the entry price is taken from each
    /// simulated day's open rather than from `params`.
    pub fn backtest(&self, history: &[Candle], params: &TradeParameters) -> BacktestReport {
        let targets = Targets {
            take_profit: params.take_profit,
            stop_loss: params.stop_loss,
            direction: params.direction,
        };
        self.replay(history, &targets)
    }

    pub fn replay(&self, history: &[Candle], targets: &Targets) -> BacktestReport {
        backtest::run_backtest(history, targets, self.settings.backtest_window)
    }
}
