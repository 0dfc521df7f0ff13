//! CSV candle file adapter.
//!
//! Expects a header row followed by `date,open,high,low,close,volume`
//! records with `%Y-%m-%d` dates.

use crate::domain::error::KuriError;
use crate::domain::ohlcv::OhlcvBar;
use crate::ports::candle_port::CandlePort;
use chrono::NaiveDate;
use std::fs;
use std::path::PathBuf;

pub struct CsvCandleAdapter {
    path: PathBuf,
}

fn data_error(reason: String) -> KuriError {
    KuriError::Data { reason }
}

fn number(record: &csv::StringRecord, index: usize, name: &str, line: u64) -> Result<f64, KuriError> {
    let raw = record
        .get(index)
        .ok_or_else(|| data_error(format!("line {}: missing {} column", line, name)))?;
    let value: f64 = raw
        .trim()
        .parse()
        .map_err(|e| data_error(format!("line {}: invalid {} value '{}': {}", line, name, raw, e)))?;
    if !value.is_finite() {
        return Err(data_error(format!("line {}: {} must be finite", line, name)));
    }
    Ok(value)
}

impl CsvCandleAdapter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Parse CSV text already in memory.
    pub fn parse(content: &str) -> Result<Vec<OhlcvBar>, KuriError> {
        let mut rdr = csv::Reader::from_reader(content.as_bytes());
        let mut bars = Vec::new();

        for result in rdr.records() {
            let record = result.map_err(|e| data_error(format!("CSV parse error: {}", e)))?;
            let line = record.position().map(|p| p.line()).unwrap_or(0);

            let date_str = record
                .get(0)
                .ok_or_else(|| data_error(format!("line {}: missing date column", line)))?;
            let date = NaiveDate::parse_from_str(date_str.trim(), "%Y-%m-%d")
                .map_err(|e| data_error(format!("line {}: invalid date '{}': {}", line, date_str, e)))?;

            bars.push(OhlcvBar {
                date,
                open: number(&record, 1, "open", line)?,
                high: number(&record, 2, "high", line)?,
                low: number(&record, 3, "low", line)?,
                close: number(&record, 4, "close", line)?,
                volume: number(&record, 5, "volume", line)?,
            });
        }

        bars.sort_by_key(|b| b.date);
        Ok(bars)
    }
}

impl CandlePort for CsvCandleAdapter {
    fn load_candles(&self) -> Result<Vec<OhlcvBar>, KuriError> {
        let content = fs::read_to_string(&self.path)
            .map_err(|e| data_error(format!("failed to read {}: {}", self.path.display(), e)))?;
        let bars = Self::parse(&content)?;
        tracing::debug!(file = %self.path.display(), bars = bars.len(), "loaded candles");
        Ok(bars)
    }
}
