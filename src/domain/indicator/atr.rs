//! Average True Range indicator.
//!
//! ATR(n)[i] = simple mean of the last n true ranges. The first bar's true range
//! is high - low. Warmup: first (n-1) bars are undefined.

use crate::domain::indicator::{IndicatorSeries, IndicatorSpec};
use crate::domain::indicator_helpers::{rolling_mean, true_range_series};
use crate::domain::ohlcv::OhlcvBar;

pub fn calculate_atr(bars: &[OhlcvBar], window: usize) -> IndicatorSeries {
    let tr = true_range_series(bars);
    IndicatorSeries::single(IndicatorSpec::Atr { window }, "atr", rolling_mean(&tr, window))
}
