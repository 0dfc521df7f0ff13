//! MACD.
//!
//! line = EMA(fast) - EMA(slow)
//! signal = EMA(signal) of the line, seeded once enough line values exist
//! histogram = line - signal

use crate::domain::indicator::{ema, zip_with};
use crate::domain::value::Series;

#[derive(Debug, Clone, PartialEq)]
pub struct Macd {
    pub line: Series,
    pub signal: Series,
    pub histogram: Series,
}

pub fn macd(source: &[Option<f64>], fast: usize, slow: usize, signal: usize) -> Macd {
    let line = zip_with(&ema(source, fast), &ema(source, slow), |f, s| f - s);
    let signal_line = ema(&line, signal);
    let histogram = zip_with(&line, &signal_line, |l, s| l - s);
    Macd {
        line,
        signal: signal_line,
        histogram,
    }
}
