use crate::error::EngineError;
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use csv::ReaderBuilder;
use serde::Deserialize;
use shared::models::Candle;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

// Header: time,open,high,low,close[,volume]
// `time` is either epoch seconds or an ISO date (YYYY-MM-DD).
#[derive(Debug, Deserialize)]
struct CsvRecord {
    time: String,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    #[serde(default)]
    volume: Option<f64>,
}

pub fn parse_time(raw: &str) -> Result<DateTime<Utc>, String> {
    let raw = raw.trim();
    if let Ok(secs) = raw.parse::<i64>() {
        return DateTime::from_timestamp(secs, 0).ok_or_else(|| format!("Timestamp '{}' is out of range", raw));
    }
    let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|e| format!("Failed to parse date '{}': {}", raw, e))?;
    let midnight = date
        .and_hms_opt(0, 0, 0)
        .ok_or_else(|| format!("Invalid date '{}'", raw))?;
    Ok(Utc.from_utc_datetime(&midnight))
}

pub struct CsvPriceParser;

impl CsvPriceParser {
    pub fn load_candles_from_csv(file_path: impl AsRef<Path>) -> Result<Vec<Candle>, EngineError> {
        let file = File::open(file_path.as_ref())?;
        Self::read_candles(BufReader::new(file))
    }

    pub fn read_candles<R: Read>(reader: R) -> Result<Vec<Candle>, EngineError> {
        let mut rdr = ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let mut candles = Vec::new();
        for (idx, result) in rdr.deserialize::<CsvRecord>().enumerate() {
            let line = idx + 2;
            let record = result?;

            let timestamp = parse_time(&record.time)
                .map_err(|e| EngineError::CsvDataFormatError(format!("Error parsing 'time' at line {}: {}", line, e)))?;

            for (name, value) in [("open", record.open), ("high", record.high), ("low", record.low), ("close", record.close)] {
                if !(value.is_finite() && value > 0.0) {
                    return Err(EngineError::CsvDataFormatError(format!(
                        "Field '{}' at line {} must be a positive price, got {}",
                        name, line, value
                    )));
                }
            }
            if record.high < record.low {
                return Err(EngineError::CsvDataFormatError(format!(
                    "High {} is below low {} at line {}",
                    record.high, record.low, line
                )));
            }

            candles.push(Candle {
                timestamp,
                open: record.open,
                high: record.high,
                low: record.low,
                close: record.close,
                volume: record.volume,
            });
        }
        Ok(candles)
    }
}
