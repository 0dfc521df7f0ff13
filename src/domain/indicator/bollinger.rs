//! Bollinger Bands.
//!
//! - Middle: SMA over n periods
//! - Upper: Middle + (multiplier × StdDev)
//! - Lower: Middle - (multiplier × StdDev)
//!
//! StdDev is the population standard deviation (divides by N, not N-1).
//! Warmup: first (period-1) positions are absent.

use crate::domain::indicator::stddev::mean_stddev;
use crate::domain::indicator::window;
use crate::domain::value::Series;

#[derive(Debug, Clone, PartialEq)]
pub struct BollingerBands {
    pub upper: Series,
    pub middle: Series,
    pub lower: Series,
}

pub fn bollinger(source: &[Option<f64>], period: usize, mult: f64) -> BollingerBands {
    let len = source.len();
    let mut bands = BollingerBands {
        upper: Vec::with_capacity(len),
        middle: Vec::with_capacity(len),
        lower: Vec::with_capacity(len),
    };

    for i in 0..len {
        let stats = window(source, i, period).map(|w| mean_stddev(&w));
        bands.middle.push(stats.map(|(m, _)| m));
        bands.upper.push(stats.map(|(m, sd)| m + mult * sd));
        bands.lower.push(stats.map(|(m, sd)| m - mult * sd));
    }
    bands
}
