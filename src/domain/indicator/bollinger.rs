//! Bollinger Bands indicator.
//!
//! Bollinger Bands consist of:
//! - Middle: SMA over n closes
//! - Upper: Middle + (multiplier × StdDev)
//! - Lower: Middle - (multiplier × StdDev)
//!
//! StdDev is the sample standard deviation (divides by n-1), so a window of 1
//! leaves the bands undefined.
//!
//! Default parameters: window=20, multiplier=2.0
//! Warmup: first (window-1) bars are undefined.

use crate::domain::indicator::{IndicatorSeries, IndicatorSpec};
use crate::domain::indicator_helpers::{rolling_mean, rolling_std};
use crate::domain::ohlcv::OhlcvBar;

pub fn calculate_bollinger(bars: &[OhlcvBar], window: usize, stddev_mult: f64) -> IndicatorSeries {
    let closes: Vec<Option<f64>> = bars.iter().map(|b| Some(b.close)).collect();
    let middle = rolling_mean(&closes, window);
    let stddev = rolling_std(&closes, window);

    let band = |sign: f64| -> Vec<Option<f64>> {
        middle
            .iter()
            .zip(&stddev)
            .map(|(m, s)| match (m, s) {
                (Some(m), Some(s)) => Some(m + sign * stddev_mult * s),
                _ => None,
            })
            .collect()
    };
    let upper = band(1.0);
    let lower = band(-1.0);

    IndicatorSeries {
        spec: IndicatorSpec::BollingerBands {
            window,
            stddev_mult,
        },
        outputs: vec![("middle", middle), ("upper", upper), ("lower", lower)],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::NaiveDate;

    fn make_bars(prices: &[f64]) -> Vec<OhlcvBar> {
        prices
            .iter()
            .enumerate()
            .map(|(i, &close)| OhlcvBar {
                date: NaiveDate::from_ymd_opt(2024, 1, (i + 1) as u32).unwrap(),
                open: close,
                high: close,
                low: close,
                close,
                volume: 1000,
            })
            .collect()
    }

    fn bands_at(series: &IndicatorSeries, i: usize) -> (f64, f64, f64) {
        (
            series.output("upper").unwrap()[i].unwrap(),
            series.output("middle").unwrap()[i].unwrap(),
            series.output("lower").unwrap()[i].unwrap(),
        )
    }

    #[test]
    fn bollinger_warmup() {
        let bars = make_bars(&[10.0, 20.0, 30.0, 40.0, 50.0]);
        let series = calculate_bollinger(&bars, 3, 2.0);
        let upper = series.output("upper").unwrap();

        assert!(upper[0].is_none());
        assert!(upper[1].is_none());
        assert!(upper[2].is_some());
        assert!(upper[4].is_some());
    }

    #[test]
    fn bollinger_constant_values() {
        let bars = make_bars(&[100.0; 5]);
        let series = calculate_bollinger(&bars, 3, 2.0);
        let (upper, middle, lower) = bands_at(&series, 2);

        assert_relative_eq!(middle, 100.0);
        assert_relative_eq!(upper, 100.0);
        assert_relative_eq!(lower, 100.0);
    }

    #[test]
    fn bollinger_basic_calculation() {
        let bars = make_bars(&[10.0, 20.0, 30.0]);
        let series = calculate_bollinger(&bars, 3, 2.0);
        let (upper, middle, lower) = bands_at(&series, 2);

        // sample variance of 10,20,30 is 100
        assert_relative_eq!(middle, 20.0, epsilon = 1e-10);
        assert_relative_eq!(upper, 40.0, epsilon = 1e-10);
        assert_relative_eq!(lower, 0.0, epsilon = 1e-10);
    }

    #[test]
    fn bollinger_multiplier_variations() {
        let bars = make_bars(&[10.0, 20.0, 30.0]);
        let series = calculate_bollinger(&bars, 3, 1.0);
        let (upper, _, lower) = bands_at(&series, 2);

        assert_relative_eq!(upper, 30.0, epsilon = 1e-10);
        assert_relative_eq!(lower, 10.0, epsilon = 1e-10);
    }

    #[test]
    fn bollinger_symmetry() {
        let bars = make_bars(&[10.0, 25.0, 30.0, 12.0]);
        let series = calculate_bollinger(&bars, 3, 2.0);
        let (upper, middle, lower) = bands_at(&series, 3);
        assert_relative_eq!(upper - middle, middle - lower, epsilon = 1e-10);
    }

    #[test]
    fn bollinger_window_1_bands_undefined() {
        let bars = make_bars(&[10.0, 20.0]);
        let series = calculate_bollinger(&bars, 1, 2.0);
        assert_eq!(series.output("middle").unwrap(), &[Some(10.0), Some(20.0)]);
        assert!(series.output("upper").unwrap().iter().all(Option::is_none));
    }
}
