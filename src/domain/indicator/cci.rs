//! Commodity Channel Index.
//!
//! CCI = (TP - SMA(TP, n)) / (0.015 * mean absolute deviation of TP over n)
//! Zero deviation gives 0.

use crate::domain::indicator::{typical_prices, window};
use crate::domain::value::Series;

const CCI_CONSTANT: f64 = 0.015;

pub fn cci(high: &[Option<f64>], low: &[Option<f64>], close: &[Option<f64>], period: usize) -> Series {
    let typical = typical_prices(high, low, close);
    (0..typical.len())
        .map(|i| {
            let w = window(&typical, i, period)?;
            let n = w.len() as f64;
            let mean = w.iter().sum::<f64>() / n;
            let deviation = w.iter().map(|x| (x - mean).abs()).sum::<f64>() / n;
            let current = typical[i]?;
            if deviation == 0.0 {
                Some(0.0)
            } else {
                Some((current - mean) / (CCI_CONSTANT * deviation))
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::indicator::full;
    use approx::assert_relative_eq;

    #[test]
    fn flat_prices_are_zero() {
        let x = full(&[5.0; 4]);
        let c = cci(&x, &x, &x, 3);
        assert_eq!(c, vec![None, None, Some(0.0), Some(0.0)]);
    }

    #[test]
    fn known_value() {
        let x = full(&[1.0, 2.0, 3.0]);
        let c = cci(&x, &x, &x, 3);
        // mean 2, MAD 2/3, (3 - 2) / (0.015 * 2/3) = 100
        assert_relative_eq!(c[2].unwrap(), 100.0, max_relative = 1e-12);
    }
}
