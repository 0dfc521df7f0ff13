//! Crossover detection.
//!
//! crossover[i]  = a[i-1] <= b[i-1] && a[i] > b[i]
//! crossunder[i] = a[i-1] >= b[i-1] && a[i] < b[i]
//! Index 0 and any position touching an absent value is false.

fn cross(a: &[Option<f64>], b: &[Option<f64>], flipped: impl Fn(f64, f64, f64, f64) -> bool) -> Vec<bool> {
    let at = |s: &[Option<f64>], i: usize| s.get(i).copied().flatten();
    let len = a.len().max(b.len());
    (0..len)
        .map(|i| {
            i >= 1
                && match (at(a, i - 1), at(b, i - 1), at(a, i), at(b, i)) {
                    (Some(pa), Some(pb), Some(ca), Some(cb)) => flipped(pa, pb, ca, cb),
                    _ => false,
                }
        })
        .collect()
}

pub fn crossover(a: &[Option<f64>], b: &[Option<f64>]) -> Vec<bool> {
    cross(a, b, |pa, pb, ca, cb| pa <= pb && ca > cb)
}

pub fn crossunder(a: &[Option<f64>], b: &[Option<f64>]) -> Vec<bool> {
    cross(a, b, |pa, pb, ca, cb| pa >= pb && ca < cb)
}
