//! Average Directional Index indicator.
//!
//! Built from simple rolling means rather than Wilder's running average:
//! - +DM = max(high - prev_high, 0), -DM = |min(low - prev_low, 0)|
//! - +DI = 100 × mean_n(+DM) / mean_n(TR), -DI likewise
//! - DX = 100 × |+DI - -DI| / (+DI + -DI)
//! - ADX = mean_n(DX)
//!
//! The double rolling mean is kept as-is so results match previously
//! published backtests. Warmup: first (2n-1) bars are undefined.

use crate::domain::indicator::{IndicatorSeries, IndicatorSpec};
use crate::domain::indicator_helpers::{checked_ratio, rolling_mean, true_range_series};
use crate::domain::ohlcv::OhlcvBar;

pub fn calculate_adx(bars: &[OhlcvBar], window: usize) -> IndicatorSeries {
    let tr_mean = rolling_mean(&true_range_series(bars), window);

    let mut plus_dm = Vec::with_capacity(bars.len());
    let mut minus_dm = Vec::with_capacity(bars.len());
    for i in 0..bars.len() {
        if i == 0 {
            plus_dm.push(None);
            minus_dm.push(None);
        } else {
            let up = bars[i].high - bars[i - 1].high;
            let down = bars[i].low - bars[i - 1].low;
            plus_dm.push(Some(up.max(0.0)));
            minus_dm.push(Some(down.min(0.0).abs()));
        }
    }

    let directional = |dm: &[Option<f64>]| -> Vec<Option<f64>> {
        rolling_mean(dm, window)
            .iter()
            .zip(&tr_mean)
            .map(|(&m, &tr)| checked_ratio(m, tr).map(|r| 100.0 * r))
            .collect()
    };
    let plus_di = directional(&plus_dm);
    let minus_di = directional(&minus_dm);

    let dx: Vec<Option<f64>> = plus_di
        .iter()
        .zip(&minus_di)
        .map(|(&p, &m)| match (p, m) {
            (Some(p), Some(m)) => checked_ratio(Some((p - m).abs()), Some(p + m)).map(|r| 100.0 * r),
            _ => None,
        })
        .collect();

    IndicatorSeries {
        spec: IndicatorSpec::Adx { window },
        outputs: vec![
            ("adx", rolling_mean(&dx, window)),
            ("plus_di", plus_di),
            ("minus_di", minus_di),
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::NaiveDate;

    fn trending_bars(n: usize) -> Vec<OhlcvBar> {
        (0..n)
            .map(|i| {
                let mid = 100.0 + i as f64;
                OhlcvBar {
                    date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
                        + chrono::Duration::days(i as i64),
                    open: mid,
                    high: mid + 1.0,
                    low: mid - 1.0,
                    close: mid,
                    volume: 1000,
                }
            })
            .collect()
    }

    #[test]
    fn adx_warmup_is_two_windows() {
        let series = calculate_adx(&trending_bars(12), 3);
        let adx = series.primary();
        for (i, v) in adx.iter().enumerate().take(5) {
            assert!(v.is_none(), "bar {} should be undefined", i);
        }
        assert!(adx[5].is_some());
    }

    #[test]
    fn adx_strong_uptrend() {
        // +DM = 1, -DM = 0, TR = 2 → +DI = 50, -DI = 0, DX = 100
        let series = calculate_adx(&trending_bars(12), 3);
        assert_relative_eq!(series.output("plus_di").unwrap()[3].unwrap(), 50.0);
        assert_relative_eq!(series.output("minus_di").unwrap()[3].unwrap(), 0.0);
        assert_relative_eq!(series.primary()[11].unwrap(), 100.0);
    }

    #[test]
    fn adx_flat_market_undefined() {
        // no directional movement at all → DX is 0/0
        let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let bars: Vec<OhlcvBar> = (0..10)
            .map(|i| OhlcvBar {
                date: date + chrono::Duration::days(i),
                open: 100.0,
                high: 101.0,
                low: 99.0,
                close: 100.0,
                volume: 1,
            })
            .collect();
        let series = calculate_adx(&bars, 3);
        assert!(series.primary().iter().all(Option::is_none));
    }

    #[test]
    fn adx_aligned_with_bars() {
        let series = calculate_adx(&trending_bars(4), 14);
        assert_eq!(series.len(), 4);
        assert!(series.primary().iter().all(Option::is_none));
    }
}
