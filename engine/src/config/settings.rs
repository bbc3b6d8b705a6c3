// Engine settings, loaded from a JSON config file and environment overrides
use crate::error::EngineError;
use serde::Deserialize;
use std::path::Path;

pub const CONFIG_PATH_ENV: &str = "TRADESCOPE_CONFIG";
pub const HOST_ENV: &str = "TRADESCOPE_HOST";
pub const PORT_ENV: &str = "TRADESCOPE_PORT";

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct EngineSettings {
    pub host: String,
    pub port: u16,
    pub analysis: AnalysisSettings,
}

impl Default for EngineSettings {
    fn default() -> Self {
        EngineSettings {
            host: "127.0.0.1".to_string(),
            port: 50051,
            analysis: AnalysisSettings::default(),
        }
    }
}

/// Indicator periods and windows used by the scorer and the simulator.
/// Defaults are the values the scoring weights were tuned against.
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct AnalysisSettings {
    pub ema_period: usize,
    pub trend_lookback: usize,
    pub rsi_period: usize,
    pub bollinger_period: usize,
    pub bollinger_std_dev: f64,
    pub band_width_lookback: usize,
    pub backtest_window: usize,
}

impl Default for AnalysisSettings {
    fn default() -> Self {
        AnalysisSettings {
            ema_period: 20,
            trend_lookback: 20,
            rsi_period: 14,
            bollinger_period: 20,
            bollinger_std_dev: 2.0,
            band_width_lookback: 100,
            backtest_window: 90,
        }
    }
}

impl EngineSettings {
    /// Reads settings from a JSON file. Missing keys fall back to defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, EngineError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)?;
        let settings: EngineSettings = serde_json::from_str(&raw).map_err(|e| {
            EngineError::ConfigError(format!("Invalid settings file '{}': {}", path.display(), e))
        })?;
        settings.validate()?;
        Ok(settings)
    }

    /// File named by `TRADESCOPE_CONFIG` (or defaults), then host/port overrides.
    pub fn from_env() -> Result<Self, EngineError> {
        let mut settings = match std::env::var(CONFIG_PATH_ENV) {
            Ok(path) => Self::load(path)?,
            Err(_) => Self::default(),
        };
        if let Ok(host) = std::env::var(HOST_ENV) {
            settings.host = host;
        }
        if let Ok(port) = std::env::var(PORT_ENV) {
            settings.port = port
                .parse()
                .map_err(|e| EngineError::ConfigError(format!("Invalid {} '{}': {}", PORT_ENV, port, e)))?;
        }
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), EngineError> {
        let a = &self.analysis;
        let periods = [
            ("ema_period", a.ema_period),
            ("trend_lookback", a.trend_lookback),
            ("rsi_period", a.rsi_period),
            ("bollinger_period", a.bollinger_period),
            ("band_width_lookback", a.band_width_lookback),
        ];
        if let Some((name, _)) = periods.iter().find(|(_, value)| *value == 0) {
            return Err(EngineError::ConfigError(format!("{} must be greater than 0", name)));
        }
        if a.backtest_window < 2 {
            return Err(EngineError::ConfigError("backtest_window must be at least 2".to_string()));
        }
        if !(a.bollinger_std_dev.is_finite() && a.bollinger_std_dev > 0.0) {
            return Err(EngineError::ConfigError("bollinger_std_dev must be a positive number".to_string()));
        }
        Ok(())
    }
}
