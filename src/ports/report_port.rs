//! Report output port.

use crate::domain::backtest::BacktestResult;
use crate::domain::error::QuantEaseError;

/// Port for writing backtest reports.
pub trait ReportPort {
    fn write(
        &self,
        symbol: &str,
        result: &BacktestResult,
        output_path: &str,
    ) -> Result<(), QuantEaseError>;
}
