//! Exponential Moving Average indicator.
//!
//! alpha = 2/(span+1), bias-adjusted weighting so the first value equals the
//! first close. Defined from the first bar onward.

use crate::domain::indicator::{IndicatorSeries, IndicatorSpec};
use crate::domain::indicator_helpers::ewm_mean;
use crate::domain::ohlcv::{closes, OhlcvBar};

pub fn calculate_ema(bars: &[OhlcvBar], span: usize) -> IndicatorSeries {
    let values = ewm_mean(&closes(bars), span)
        .into_iter()
        .map(Some)
        .collect();
    IndicatorSeries::single(IndicatorSpec::Ema { span }, "ema", values)
}
