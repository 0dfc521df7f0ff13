//! Money Flow Index.
//!
//! raw flow = TP * V, positive when TP rises against the previous bar and
//! negative when it falls. MFI = 100 - 100/(1 + positive/negative) over the
//! trailing n flows; zero negative flow gives 100.
//! Warmup: first n positions are absent.

use crate::domain::indicator::typical_prices;
use crate::domain::value::Series;

/// Signed money flow at each position; absent at 0 and where inputs are absent.
fn money_flows(typical: &[Option<f64>], volume: &[Option<f64>]) -> Vec<Option<(f64, f64)>> {
    (0..typical.len())
        .map(|i| {
            let previous = typical.get(i.checked_sub(1)?).copied().flatten()?;
            let tp = typical[i]?;
            let flow = tp * volume.get(i).copied().flatten()?;
            Some(if tp > previous {
                (flow, 0.0)
            } else if tp < previous {
                (0.0, flow)
            } else {
                (0.0, 0.0)
            })
        })
        .collect()
}

pub fn mfi(
    high: &[Option<f64>],
    low: &[Option<f64>],
    close: &[Option<f64>],
    volume: &[Option<f64>],
    period: usize,
) -> Series {
    let flows = money_flows(&typical_prices(high, low, close), volume);
    (0..flows.len())
        .map(|i| {
            if period == 0 || i < period {
                return None;
            }
            let mut positive = 0.0;
            let mut negative = 0.0;
            for flow in &flows[i + 1 - period..=i] {
                let (p, n) = (*flow)?;
                positive += p;
                negative += n;
            }
            if negative == 0.0 {
                Some(100.0)
            } else {
                Some(100.0 - 100.0 / (1.0 + positive / negative))
            }
        })
        .collect()
}
