//! Candle data and the per-bar price formulas shared by indicators.

use chrono::NaiveDate;

/// One candle. Volume is fractional so forex tick volume fits as well.
#[derive(Debug, Clone, PartialEq)]
pub struct OhlcvBar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

/// (high + low + close) / 3
pub fn typical_price(high: f64, low: f64, close: f64) -> f64 {
    (high + low + close) / 3.0
}

/// Widest of the bar's own range and the gaps from the previous close.
pub fn true_range(high: f64, low: f64, prev_close: f64) -> f64 {
    (high - low)
        .max((high - prev_close).abs())
        .max((low - prev_close).abs())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn typical_price_is_mean_of_hlc() {
        assert_relative_eq!(typical_price(12.0, 6.0, 9.0), 9.0);
    }

    #[test]
    fn true_range_without_gap_is_bar_range() {
        assert_relative_eq!(true_range(12.0, 6.0, 9.0), 6.0);
    }

    #[test]
    fn true_range_covers_gaps_both_ways() {
        // gap up: previous close far below the low
        assert_relative_eq!(true_range(12.0, 10.0, 4.0), 8.0);
        // gap down: previous close far above the high
        assert_relative_eq!(true_range(12.0, 10.0, 20.0), 10.0);
    }
}
