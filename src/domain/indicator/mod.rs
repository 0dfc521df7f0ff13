//! Built-in indicator library.
//!
//! Every function takes plain series (`None` = absent) and returns a series of
//! the same length. Both execution engines call into this module through the
//! shared evaluator, so there is exactly one implementation of each
//! indicator.

pub mod bollinger;
pub mod cci;
pub mod cross;
pub mod ema;
pub mod macd;
pub mod mfi;
pub mod obv;
pub mod rsi;
pub mod sma;
pub mod stddev;
pub mod stochastic;
pub mod supertrend;
pub mod vwap;

pub use bollinger::{bollinger, BollingerBands};
pub use cci::cci;
pub use cross::{crossover, crossunder};
pub use ema::ema;
pub use macd::{macd, Macd};
pub use mfi::mfi;
pub use obv::obv;
pub use rsi::rsi;
pub use sma::sma;
pub use stddev::stddev;
pub use stochastic::{stochastic, Stochastic};
pub use supertrend::supertrend;
pub use vwap::vwap;

use crate::domain::value::Series;

/// Trailing `period` values ending at `end`, or `None` if the window starts
/// before the series or contains an absent value.
pub(crate) fn window(source: &[Option<f64>], end: usize, period: usize) -> Option<Vec<f64>> {
    if period == 0 || end + 1 < period || end >= source.len() {
        return None;
    }
    source[end + 1 - period..=end].iter().copied().collect()
}

/// Position-wise combination; absent where either side is absent.
pub(crate) fn zip_with(a: &[Option<f64>], b: &[Option<f64>], f: impl Fn(f64, f64) -> f64) -> Series {
    a.iter()
        .zip(b)
        .map(|(x, y)| x.zip(*y).map(|(x, y)| f(x, y)))
        .collect()
}

/// Typical price series (high + low + close) / 3.
pub(crate) fn typical_prices(high: &[Option<f64>], low: &[Option<f64>], close: &[Option<f64>]) -> Series {
    (0..close.len())
        .map(|i| {
            let h = high.get(i).copied().flatten()?;
            let l = low.get(i).copied().flatten()?;
            let c = close[i]?;
            Some(crate::domain::ohlcv::typical_price(h, l, c))
        })
        .collect()
}

#[cfg(test)]
pub(crate) fn full(values: &[f64]) -> Series {
    values.iter().copied().map(Some).collect()
}
