#![allow(dead_code)]

use chrono::NaiveDate;
pub use quantease::domain::ohlcv::OhlcvBar;
use quantease::domain::error::QuantEaseError;
use quantease::ports::data_port::DataPort;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::cell::Cell;
use std::collections::HashMap;

enum MockFailure {
    NotFound,
    EmptyRange,
    Data(String),
}

pub struct MockDataPort {
    pub data: HashMap<String, Vec<OhlcvBar>>,
    failures: HashMap<String, MockFailure>,
    fetches: Cell<usize>,
}

impl MockDataPort {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            failures: HashMap::new(),
            fetches: Cell::new(0),
        }
    }

    pub fn with_bars(mut self, symbol: &str, bars: Vec<OhlcvBar>) -> Self {
        self.data.insert(symbol.to_string(), bars);
        self
    }

    pub fn with_not_found(mut self, symbol: &str) -> Self {
        self.failures.insert(symbol.to_string(), MockFailure::NotFound);
        self
    }

    pub fn with_empty_range(mut self, symbol: &str) -> Self {
        self.failures.insert(symbol.to_string(), MockFailure::EmptyRange);
        self
    }

    pub fn with_error(mut self, symbol: &str, reason: &str) -> Self {
        self.failures
            .insert(symbol.to_string(), MockFailure::Data(reason.to_string()));
        self
    }

    pub fn fetches(&self) -> usize {
        self.fetches.get()
    }
}

impl DataPort for MockDataPort {
    fn fetch_prices(
        &self,
        symbol: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<OhlcvBar>, QuantEaseError> {
        self.fetches.set(self.fetches.get() + 1);
        match self.failures.get(symbol) {
            Some(MockFailure::NotFound) => Err(QuantEaseError::NotFound {
                symbol: symbol.to_string(),
            }),
            Some(MockFailure::EmptyRange) => Err(QuantEaseError::EmptyRange {
                symbol: symbol.to_string(),
                start: start_date,
                end: end_date,
            }),
            Some(MockFailure::Data(reason)) => Err(QuantEaseError::Data {
                reason: reason.clone(),
            }),
            None => match self.data.get(symbol) {
                Some(bars) => Ok(bars.clone()),
                None => Err(QuantEaseError::NotFound {
                    symbol: symbol.to_string(),
                }),
            },
        }
    }

    fn list_symbols(&self) -> Result<Vec<String>, QuantEaseError> {
        let mut symbols: Vec<String> = self.data.keys().cloned().collect();
        symbols.sort();
        Ok(symbols)
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn make_bar(date: NaiveDate, close: f64) -> OhlcvBar {
    OhlcvBar {
        date,
        open: close,
        high: close + 1.0,
        low: close - 1.0,
        close,
        volume: 1000,
    }
}

/// One bar per day from 2024-01-01 with the given closes.
pub fn bars_from_closes(closes: &[f64]) -> Vec<OhlcvBar> {
    let start = date(2024, 1, 1);
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| make_bar(start + chrono::Days::new(i as u64), close))
        .collect()
}

/// Closes of a seeded multiplicative walk starting at 100.
pub fn random_walk(seed: u64, points: usize) -> Vec<f64> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut price = 100.0;
    (0..points)
        .map(|_| {
            price *= 1.0 + rng.gen_range(-0.02..0.02);
            price
        })
        .collect()
}
