//! Relative Strength Index (Wilder).
//!
//! Seed: average gain and loss over the first n deltas.
//! Then avg = (avg*(n-1) + current) / n.
//! RSI = 100 - 100/(1 + avg_gain/avg_loss); avg_loss == 0 gives 100.
//! Warmup: first n positions are absent.

use crate::domain::value::Series;

fn rsi_value(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss == 0.0 {
        100.0
    } else {
        100.0 - 100.0 / (1.0 + avg_gain / avg_loss)
    }
}

pub fn rsi(source: &[Option<f64>], period: usize) -> Series {
    let mut values = vec![None; source.len()];
    if period == 0 {
        return values;
    }

    let p = period as f64;
    let mut gains = 0.0;
    let mut losses = 0.0;
    let mut seen = 0;
    let mut averages: Option<(f64, f64)> = None;

    for i in 1..source.len() {
        let (Some(current), Some(previous)) = (source[i], source[i - 1]) else {
            continue;
        };
        let change = current - previous;
        let gain = change.max(0.0);
        let loss = (-change).max(0.0);

        let (avg_gain, avg_loss) = match averages {
            Some((g, l)) => ((g * (p - 1.0) + gain) / p, (l * (p - 1.0) + loss) / p),
            None => {
                gains += gain;
                losses += loss;
                seen += 1;
                if seen < period {
                    continue;
                }
                (gains / p, losses / p)
            }
        };
        averages = Some((avg_gain, avg_loss));
        values[i] = Some(rsi_value(avg_gain, avg_loss));
    }
    values
}
