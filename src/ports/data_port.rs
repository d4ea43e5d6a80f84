//! Price history port.

use crate::domain::error::QuantEaseError;
use crate::domain::ohlcv::OhlcvBar;
use chrono::NaiveDate;

/// Source of daily price history.
///
/// Implementations must keep the two "no data" outcomes apart:
/// `NotFound` when the symbol has no history at all, and `EmptyRange` when
/// it has history but none between `start_date` and `end_date` (inclusive).
pub trait DataPort {
    fn fetch_prices(
        &self,
        symbol: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<OhlcvBar>, QuantEaseError>;

    fn list_symbols(&self) -> Result<Vec<String>, QuantEaseError>;
}
