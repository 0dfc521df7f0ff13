//! Simple Moving Average.
//!
//! SMA(n)[i] = sum(S[i-n+1..=i]) / n
//! Warmup: first (n-1) positions are absent, as is any window holding an
//! absent value.

use crate::domain::indicator::window;
use crate::domain::value::Series;

pub fn sma(source: &[Option<f64>], period: usize) -> Series {
    (0..source.len())
        .map(|i| window(source, i, period).map(|w| w.iter().sum::<f64>() / period as f64))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::indicator::full;

    #[test]
    fn sma_warmup_and_values() {
        let s = sma(&full(&[1.0, 2.0, 3.0, 4.0, 5.0]), 3);
        assert_eq!(s, vec![None, None, Some(2.0), Some(3.0), Some(4.0)]);
    }

    #[test]
    fn sma_of_rising_closes() {
        let closes: Vec<f64> = (10..30).map(f64::from).collect();
        let s = sma(&full(&closes), 5);
        assert_eq!(s[19], Some(27.0));
        assert!(s[..4].iter().all(Option::is_none));
    }

    #[test]
    fn period_longer_than_series_is_all_absent() {
        let s = sma(&full(&[1.0, 2.0]), 5);
        assert_eq!(s, vec![None, None]);
    }

    #[test]
    fn period_1_is_identity() {
        let src = full(&[4.0, 5.0, 6.0]);
        assert_eq!(sma(&src, 1), src);
    }
}
