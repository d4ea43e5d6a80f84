//! JSON report adapter implementing ReportPort.
//!
//! Writes one pretty-printed document per run:
//! `{symbol, strategy, metrics, equity_curve, trades, indicators, risk}`.
//! Indicator values still in warmup are written as `null`.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::Serialize;

use crate::domain::backtest::BacktestResult;
use crate::domain::error::QuantEaseError;
use crate::domain::indicator::IndicatorSeries;
use crate::domain::metrics::Metrics;
use crate::domain::position::Trade;
use crate::domain::risk::RiskReport;
use crate::ports::report_port::ReportPort;

#[derive(Serialize)]
struct JsonReport<'a> {
    symbol: &'a str,
    strategy: String,
    metrics: &'a Metrics,
    equity_curve: &'a [f64],
    trades: &'a [Trade],
    indicators: Vec<JsonIndicator<'a>>,
    risk: RiskReport,
}

#[derive(Serialize)]
struct JsonIndicator<'a> {
    name: String,
    outputs: BTreeMap<&'static str, &'a [Option<f64>]>,
}

impl<'a> From<&'a IndicatorSeries> for JsonIndicator<'a> {
    fn from(series: &'a IndicatorSeries) -> Self {
        JsonIndicator {
            name: series.spec.to_string(),
            outputs: series
                .outputs
                .iter()
                .map(|(name, values)| (*name, values.as_slice()))
                .collect(),
        }
    }
}

pub struct JsonReportAdapter;

impl JsonReportAdapter {
    pub fn new() -> Self {
        Self
    }

    pub fn render(symbol: &str, result: &BacktestResult) -> Result<String, QuantEaseError> {
        let report = JsonReport {
            symbol,
            strategy: result.family.to_string(),
            metrics: &result.metrics,
            equity_curve: &result.equity_curve,
            trades: &result.trades,
            indicators: result.indicators.iter().map(JsonIndicator::from).collect(),
            risk: result.risk_report(),
        };
        Ok(serde_json::to_string_pretty(&report)?)
    }
}

impl Default for JsonReportAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportPort for JsonReportAdapter {
    fn write(
        &self,
        symbol: &str,
        result: &BacktestResult,
        output_path: &str,
    ) -> Result<(), QuantEaseError> {
        let json = Self::render(symbol, result)?;

        let path = Path::new(output_path);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, json)?;

        tracing::info!(path = %path.display(), "report written");
        Ok(())
    }
}
