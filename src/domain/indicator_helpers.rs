//! Shared helper functions for indicator calculations.
//!
//! Every helper keeps output aligned index-for-index with its input. Positions
//! without enough history are `None`, never zero.

use crate::domain::ohlcv::OhlcvBar;

/// Trailing arithmetic mean over `window` values. A window containing any
/// undefined value is itself undefined.
pub fn rolling_mean(values: &[Option<f64>], window: usize) -> Vec<Option<f64>> {
    rolling(values, window, |w| Some(w.iter().sum::<f64>() / w.len() as f64))
}

/// Trailing sample standard deviation (n - 1 denominator).
pub fn rolling_std(values: &[Option<f64>], window: usize) -> Vec<Option<f64>> {
    rolling(values, window, |w| sample_std(w))
}

fn rolling<F>(values: &[Option<f64>], window: usize, reduce: F) -> Vec<Option<f64>>
where
    F: Fn(&[f64]) -> Option<f64>,
{
    let mut out = Vec::with_capacity(values.len());
    let mut buf: Vec<f64> = Vec::with_capacity(window);

    for i in 0..values.len() {
        if window == 0 || i + 1 < window {
            out.push(None);
            continue;
        }

        buf.clear();
        let complete = values[i + 1 - window..=i].iter().all(|v| match v {
            Some(x) => {
                buf.push(*x);
                true
            }
            None => false,
        });

        out.push(if complete { reduce(&buf) } else { None });
    }

    out
}

/// Sample standard deviation; undefined below two observations.
pub fn sample_std(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0);
    Some(var.sqrt())
}

/// Bias-adjusted exponentially weighted mean with alpha = 2/(span+1).
///
/// y[t] = sum((1-a)^k * x[t-k]) / sum((1-a)^k), so y[0] = x[0].
pub fn ewm_mean(values: &[f64], span: usize) -> Vec<f64> {
    let alpha = 2.0 / (span as f64 + 1.0);
    let decay = 1.0 - alpha;
    let mut num = 0.0;
    let mut den = 0.0;

    values
        .iter()
        .map(|&x| {
            num = x + decay * num;
            den = 1.0 + decay * den;
            num / den
        })
        .collect()
}

/// First difference; index 0 is undefined.
pub fn diff(values: &[f64]) -> Vec<Option<f64>> {
    (0..values.len())
        .map(|i| if i == 0 { None } else { Some(values[i] - values[i - 1]) })
        .collect()
}

/// True range per bar; the first bar has no previous close and uses high - low.
pub fn true_range_series(bars: &[OhlcvBar]) -> Vec<Option<f64>> {
    bars.iter()
        .enumerate()
        .map(|(i, bar)| {
            Some(if i == 0 {
                bar.high - bar.low
            } else {
                bar.true_range(bars[i - 1].close)
            })
        })
        .collect()
}

/// Element-wise `a / b`, undefined when either side is or when `b` is zero.
pub fn checked_ratio(a: Option<f64>, b: Option<f64>) -> Option<f64> {
    match (a, b) {
        (Some(x), Some(y)) if y != 0.0 => Some(x / y),
        _ => None,
    }
}
