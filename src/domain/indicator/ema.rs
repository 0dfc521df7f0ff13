//! Exponential Moving Average.
//!
//! k = 2/(n+1), seed with the SMA of the first n present values, then
//! EMA[i] = S[i]*k + EMA[i-1]*(1-k).
//!
//! Absent values are tolerated: leading gaps delay the seed, and a gap after
//! the seed yields an absent output without touching the running average.
//! This single definition backs `ema()` and the MACD signal line.

use crate::domain::value::Series;

pub fn ema(source: &[Option<f64>], period: usize) -> Series {
    if period == 0 {
        return vec![None; source.len()];
    }

    let k = 2.0 / (period as f64 + 1.0);
    let mut values = Vec::with_capacity(source.len());
    let mut prev: Option<f64> = None;
    let mut seed_sum = 0.0;
    let mut seen = 0;

    for value in source {
        let out = match (*value, prev) {
            (None, _) => None,
            (Some(x), Some(p)) => Some(x * k + p * (1.0 - k)),
            (Some(x), None) => {
                seed_sum += x;
                seen += 1;
                (seen == period).then(|| seed_sum / period as f64)
            }
        };
        if out.is_some() {
            prev = out;
        }
        values.push(out);
    }
    values
}
