#![allow(dead_code)]

use chrono::NaiveDate;
use kuri::domain::context::Context;
pub use kuri::domain::ohlcv::OhlcvBar;
use std::io::Write;

/// Bars with closes `10, 11, ...` on consecutive days. High and low sit one
/// point either side of the close.
pub fn rising_bars(count: usize) -> Vec<OhlcvBar> {
    bars_from_closes(&(0..count).map(|i| 10.0 + i as f64).collect::<Vec<_>>())
}

pub fn bars_from_closes(closes: &[f64]) -> Vec<OhlcvBar> {
    let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| OhlcvBar {
            date: start + chrono::Duration::days(i as i64),
            open: close,
            high: close + 1.0,
            low: close - 1.0,
            close,
            volume: 1_000.0,
        })
        .collect()
}

/// Falls for ten bars, then rises for ten: fast averages cross slow ones upward.
pub fn v_shaped_closes() -> Vec<f64> {
    let mut closes: Vec<f64> = (0..10).map(|i| 30.0 - 2.0 * i as f64).collect();
    closes.extend((0..10).map(|i| 14.0 + 3.0 * i as f64));
    closes
}

pub fn rising_context(count: usize) -> Context {
    Context::from_bars(&rising_bars(count))
}

pub fn bars_to_csv(bars: &[OhlcvBar]) -> String {
    let mut out = String::from("date,open,high,low,close,volume\n");
    for bar in bars {
        out.push_str(&format!(
            "{},{},{},{},{},{}\n",
            bar.date.format("%Y-%m-%d"),
            bar.open,
            bar.high,
            bar.low,
            bar.close,
            bar.volume
        ));
    }
    out
}

pub fn write_temp(content: &str, suffix: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}
