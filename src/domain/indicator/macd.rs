//! MACD (Moving Average Convergence Divergence) indicator.
//!
//! - line = EMA(fast) - EMA(slow)
//! - signal = EMA(signal) of the line
//! - histogram = line - signal
//!
//! All three EMAs are seeded from their first input, so every bar is defined.

use crate::domain::indicator::{IndicatorSeries, IndicatorSpec};
use crate::domain::indicator_helpers::ewm_mean;
use crate::domain::ohlcv::{closes, OhlcvBar};

pub fn calculate_macd(
    bars: &[OhlcvBar],
    fast: usize,
    slow: usize,
    signal: usize,
) -> IndicatorSeries {
    let closes = closes(bars);
    let fast_ema = ewm_mean(&closes, fast);
    let slow_ema = ewm_mean(&closes, slow);

    let line: Vec<f64> = fast_ema.iter().zip(&slow_ema).map(|(f, s)| f - s).collect();
    let signal_line = ewm_mean(&line, signal);
    let histogram: Vec<f64> = line.iter().zip(&signal_line).map(|(l, s)| l - s).collect();

    IndicatorSeries {
        spec: IndicatorSpec::Macd { fast, slow, signal },
        outputs: vec![
            ("macd", line.into_iter().map(Some).collect()),
            ("signal", signal_line.into_iter().map(Some).collect()),
            ("histogram", histogram.into_iter().map(Some).collect()),
        ],
    }
}
