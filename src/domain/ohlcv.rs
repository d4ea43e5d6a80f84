//! OHLCV bar representation (price observations).

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::error::QuantEaseError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OhlcvBar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: i64,
}

impl OhlcvBar {
    /// max(high - low, |high - prev_close|, |low - prev_close|)
    pub fn true_range(&self, prev_close: f64) -> f64 {
        let hl = self.high - self.low;
        let hc = (self.high - prev_close).abs();
        let lc = (self.low - prev_close).abs();
        hl.max(hc).max(lc)
    }
}

/// Checks the invariants the simulator relies on: at least one bar, a finite
/// close on every bar, and strictly increasing dates.
pub fn validate_series(bars: &[OhlcvBar]) -> Result<(), QuantEaseError> {
    if bars.is_empty() {
        return Err(QuantEaseError::validation("price series is empty"));
    }

    for (i, bar) in bars.iter().enumerate() {
        if !bar.close.is_finite() {
            return Err(QuantEaseError::validation(format!(
                "missing close price at {}",
                bar.date
            )));
        }
        if i > 0 && bar.date <= bars[i - 1].date {
            return Err(QuantEaseError::validation(format!(
                "timestamps not strictly increasing at {}",
                bar.date
            )));
        }
    }

    Ok(())
}

pub fn closes(bars: &[OhlcvBar]) -> Vec<f64> {
    bars.iter().map(|b| b.close).collect()
}
