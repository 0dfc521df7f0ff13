//! OBV (On-Balance Volume).

use crate::domain::value::Series;

/// OBV[0] = 0
/// If close[i] > close[i-1]: OBV[i] = OBV[i-1] + volume[i]
/// If close[i] < close[i-1]: OBV[i] = OBV[i-1] - volume[i]
/// If close[i] == close[i-1]: OBV[i] = OBV[i-1]
///
/// No warmup period. A bar with an absent input is absent and does not move
/// the running total.
pub fn obv(close: &[Option<f64>], volume: &[Option<f64>]) -> Series {
    let mut total = 0.0;
    let mut prev_close: Option<f64> = None;

    (0..close.len())
        .map(|i| {
            let (c, v) = (close[i]?, volume.get(i).copied().flatten()?);
            if let Some(p) = prev_close {
                if c > p {
                    total += v;
                } else if c < p {
                    total -= v;
                }
            }
            prev_close = Some(c);
            Some(total)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::indicator::full;

    #[test]
    fn running_sum() {
        let close = full(&[10.0, 11.0, 10.5, 10.5, 12.0]);
        let volume = full(&[100.0, 200.0, 150.0, 300.0, 50.0]);
        assert_eq!(
            obv(&close, &volume),
            full(&[0.0, 200.0, 50.0, 50.0, 100.0])
        );
    }

    #[test]
    fn absent_bar_is_skipped() {
        let close = vec![Some(10.0), None, Some(12.0)];
        let volume = full(&[100.0, 200.0, 300.0]);
        assert_eq!(obv(&close, &volume), vec![Some(0.0), None, Some(300.0)]);
    }
}
