//! Seeded synthetic price series used when a symbol has no stored history.

use chrono::{Days, NaiveDate};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::ohlcv::OhlcvBar;

pub const DEMO_SEED: u64 = 42;
/// Two trading years.
pub const DEMO_POINTS: usize = 504;

const START_PRICE: f64 = 100.0;
/// Uniform half-width giving roughly 1% daily stddev.
const MAX_DAILY_MOVE: f64 = 0.0173;

/// Multiplicative random walk from 100 with one bar per calendar day,
/// the last one dated `end`. Same seed, same series.
pub fn demo_series(seed: u64, points: usize, end: NaiveDate) -> Vec<OhlcvBar> {
    let mut rng = StdRng::seed_from_u64(seed);
    let first = end
        .checked_sub_days(Days::new(points.saturating_sub(1) as u64))
        .unwrap_or(NaiveDate::MIN);

    let mut bars = Vec::with_capacity(points);
    let mut price = START_PRICE;
    let mut date = first;

    for _ in 0..points {
        let daily_return: f64 = rng.gen_range(-MAX_DAILY_MOVE..MAX_DAILY_MOVE);
        let open = price;
        let close = price * (1.0 + daily_return);
        let high = open.max(close) * (1.0 + rng.gen_range(0.0..0.005));
        let low = open.min(close) * (1.0 - rng.gen_range(0.0..0.005));
        let volume = rng.gen_range(100_000..1_000_000i64);

        bars.push(OhlcvBar {
            date,
            open,
            high,
            low,
            close,
            volume,
        });

        price = close;
        date = date.succ_opt().unwrap_or(date);
    }

    bars
}
