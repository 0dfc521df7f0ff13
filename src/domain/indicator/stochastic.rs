//! Stochastic Oscillator.
//!
//! raw %K = 100 * (C - LL(k)) / (HH(k) - LL(k)); a flat range gives 50.
//! %K = SMA(raw %K, slowing)
//! %D = SMA(%K, d)

use crate::domain::indicator::{sma, window};
use crate::domain::value::Series;

#[derive(Debug, Clone, PartialEq)]
pub struct Stochastic {
    pub k: Series,
    pub d: Series,
}

fn raw_k(high: &[Option<f64>], low: &[Option<f64>], close: &[Option<f64>], period: usize) -> Series {
    (0..close.len())
        .map(|i| {
            let highs = window(high, i, period)?;
            let lows = window(low, i, period)?;
            let c = close[i]?;
            let hh = highs.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            let ll = lows.iter().copied().fold(f64::INFINITY, f64::min);
            let range = hh - ll;
            if range == 0.0 {
                Some(50.0)
            } else {
                Some(100.0 * (c - ll) / range)
            }
        })
        .collect()
}

pub fn stochastic(
    high: &[Option<f64>],
    low: &[Option<f64>],
    close: &[Option<f64>],
    k_period: usize,
    d_period: usize,
    slowing: usize,
) -> Stochastic {
    let k = sma(&raw_k(high, low, close, k_period), slowing);
    let d = sma(&k, d_period);
    Stochastic { k, d }
}
