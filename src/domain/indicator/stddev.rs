//! Rolling population standard deviation.
//!
//! STDDEV(n)[i] = sqrt(sum((S[i-j] - SMA(n)[i])^2 for j in 0..n) / n)
//! Warmup: first (n-1) positions are absent.

use crate::domain::indicator::window;
use crate::domain::value::Series;

/// Mean and population standard deviation of a window.
pub(crate) fn mean_stddev(values: &[f64]) -> (f64, f64) {
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>() / n;
    (mean, variance.sqrt())
}

pub fn stddev(source: &[Option<f64>], period: usize) -> Series {
    (0..source.len())
        .map(|i| window(source, i, period).map(|w| mean_stddev(&w).1))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::indicator::full;
    use approx::assert_relative_eq;

    #[test]
    fn known_population_stddev() {
        // mean 5, squared deviations sum 32, /8 = 4
        let s = stddev(&full(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]), 8);
        assert_relative_eq!(s[7].unwrap(), 2.0);
    }

    #[test]
    fn constant_window_is_zero() {
        let s = stddev(&full(&[3.0, 3.0, 3.0]), 2);
        assert_eq!(s, vec![None, Some(0.0), Some(0.0)]);
    }
}
