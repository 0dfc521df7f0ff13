//! VWAP (Volume Weighted Average Price).
//!
//! VWAP[i] = cumsum(TP * V) / cumsum(V) over the whole series, no session
//! reset. Zero cumulative volume gives an absent value.

use crate::domain::indicator::typical_prices;
use crate::domain::value::Series;

pub fn vwap(
    high: &[Option<f64>],
    low: &[Option<f64>],
    close: &[Option<f64>],
    volume: &[Option<f64>],
) -> Series {
    let typical = typical_prices(high, low, close);
    let mut cum_tpv = 0.0;
    let mut cum_vol = 0.0;

    typical
        .iter()
        .enumerate()
        .map(|(i, tp)| {
            let (tp, vol) = ((*tp)?, volume.get(i).copied().flatten()?);
            cum_tpv += tp * vol;
            cum_vol += vol;
            (cum_vol != 0.0).then(|| cum_tpv / cum_vol)
        })
        .collect()
}
