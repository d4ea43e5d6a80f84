//! RSI (Relative Strength Index) indicator.
//!
//! Simple rolling means of gains and losses over n close-to-close changes:
//! RS = mean(gain) / mean(loss), RSI = 100 - 100 / (1 + RS).
//!
//! RS is undefined when the mean loss is exactly zero, so RSI is undefined there
//! too. Warmup: the first n bars are undefined (n changes are needed).

use crate::domain::indicator::{IndicatorSeries, IndicatorSpec};
use crate::domain::indicator_helpers::{checked_ratio, diff, rolling_mean};
use crate::domain::ohlcv::{closes, OhlcvBar};

pub fn calculate_rsi(bars: &[OhlcvBar], window: usize) -> IndicatorSeries {
    let deltas = diff(&closes(bars));
    let gains: Vec<Option<f64>> = deltas.iter().map(|d| d.map(|v| v.max(0.0))).collect();
    let losses: Vec<Option<f64>> = deltas.iter().map(|d| d.map(|v| (-v).max(0.0))).collect();

    let avg_gain = rolling_mean(&gains, window);
    let avg_loss = rolling_mean(&losses, window);

    let values = avg_gain
        .iter()
        .zip(&avg_loss)
        .map(|(&g, &l)| checked_ratio(g, l).map(|rs| 100.0 - 100.0 / (1.0 + rs)))
        .collect();

    IndicatorSeries::single(IndicatorSpec::Rsi { window }, "rsi", values)
}
