//! Supertrend.
//!
//! ATR is Wilder's RMA of true range, seeded with the average of the first n
//! true ranges (TR of the first bar is high - low).
//!
//! basic upper = (H + L)/2 + mult * ATR, basic lower = (H + L)/2 - mult * ATR
//! final upper = basic upper if basic upper < prev final upper or
//!               prev close > prev final upper, else prev final upper
//! final lower mirrors final upper.
//!
//! The trend starts up and flips when close crosses the opposite final band.
//! Output is the final lower band while up, the final upper band while down.
//! Warmup: first (n-1) positions are absent.

use crate::domain::ohlcv::true_range;
use crate::domain::value::Series;

pub fn supertrend(
    high: &[Option<f64>],
    low: &[Option<f64>],
    close: &[Option<f64>],
    period: usize,
    multiplier: f64,
) -> Series {
    let mut values = Vec::with_capacity(close.len());
    if period == 0 {
        values.resize(close.len(), None);
        return values;
    }

    let p = period as f64;
    let mut prev_close: Option<f64> = None;
    let mut tr_sum = 0.0;
    let mut tr_count = 0;
    let mut atr: Option<f64> = None;
    let mut bands: Option<(f64, f64)> = None;
    let mut uptrend = true;

    for i in 0..close.len() {
        let bar = (
            high.get(i).copied().flatten(),
            low.get(i).copied().flatten(),
            close[i],
        );
        let (Some(h), Some(l), Some(c)) = bar else {
            values.push(None);
            continue;
        };

        let tr = match prev_close {
            Some(pc) => true_range(h, l, pc),
            None => h - l,
        };
        atr = match atr {
            Some(a) => Some((a * (p - 1.0) + tr) / p),
            None => {
                tr_sum += tr;
                tr_count += 1;
                (tr_count == period).then(|| tr_sum / p)
            }
        };
        let Some(a) = atr else {
            prev_close = Some(c);
            values.push(None);
            continue;
        };

        let mid = (h + l) / 2.0;
        let basic_upper = mid + multiplier * a;
        let basic_lower = mid - multiplier * a;
        let (upper, lower) = match (bands, prev_close) {
            (Some((pu, pl)), Some(pc)) => (
                if basic_upper < pu || pc > pu { basic_upper } else { pu },
                if basic_lower > pl || pc < pl { basic_lower } else { pl },
            ),
            _ => (basic_upper, basic_lower),
        };

        if uptrend && c < lower {
            uptrend = false;
        } else if !uptrend && c > upper {
            uptrend = true;
        }

        bands = Some((upper, lower));
        prev_close = Some(c);
        values.push(Some(if uptrend { lower } else { upper }));
    }
    values
}
