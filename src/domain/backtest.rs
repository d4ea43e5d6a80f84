//! Backtest pipeline: compile → signals → simulate → metrics.
//!
//! Each run is a pure function of (bars, strategy, config). `run_batch` fans
//! independent runs out over a rayon pool; nothing is shared between them.

use rayon::prelude::*;
use serde::Serialize;

use super::error::QuantEaseError;
use super::execution::{simulate, ExecutionParams};
use super::indicator::IndicatorSeries;
use super::metrics::Metrics;
use super::ohlcv::{validate_series, OhlcvBar};
use super::position::Trade;
use super::risk::RiskReport;
use super::signal::SignalSeries;
use super::strategy::{compile, CompiledStrategy, StrategyConfig, StrategyFamily};

#[derive(Debug, Clone, PartialEq)]
pub struct BacktestConfig {
    pub initial_capital: f64,
    pub position_fraction: f64,
}

impl Default for BacktestConfig {
    fn default() -> Self {
        BacktestConfig {
            initial_capital: 100_000.0,
            position_fraction: ExecutionParams::default().position_fraction,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BacktestResult {
    #[serde(skip)]
    pub family: StrategyFamily,
    pub metrics: Metrics,
    pub equity_curve: Vec<f64>,
    pub trades: Vec<Trade>,
    #[serde(skip)]
    pub signals: SignalSeries,
    /// Every configured indicator, in configuration order.
    #[serde(skip)]
    pub indicators: Vec<IndicatorSeries>,
}

impl BacktestResult {
    pub fn risk_report(&self) -> RiskReport {
        RiskReport::from(&self.metrics)
    }
}

/// Compiles `strategy` and runs it over `bars`.
///
/// Configuration errors are reported before the bars are inspected.
pub fn run_backtest(
    bars: &[OhlcvBar],
    strategy: &StrategyConfig,
    config: &BacktestConfig,
) -> Result<BacktestResult, QuantEaseError> {
    let compiled = compile(strategy)?;
    run_compiled(bars, &compiled, config)
}

pub fn run_compiled(
    bars: &[OhlcvBar],
    compiled: &CompiledStrategy,
    config: &BacktestConfig,
) -> Result<BacktestResult, QuantEaseError> {
    validate_series(bars)?;

    let output = compiled.apply(bars);
    let signals = output.signals;
    let params = ExecutionParams {
        position_fraction: config.position_fraction,
    };
    let sim = simulate(bars, &signals, config.initial_capital, &params)?;
    let metrics = Metrics::compute(&sim.equity_curve, &sim.trades, config.initial_capital);

    tracing::debug!(
        bars = bars.len(),
        family = %compiled.family,
        trades = metrics.trades,
        final_value = metrics.final_value,
        "backtest complete"
    );

    Ok(BacktestResult {
        family: compiled.family.clone(),
        metrics,
        equity_curve: sim.equity_curve,
        trades: sim.trades,
        signals,
        indicators: output.indicators,
    })
}

pub type BatchResults = Vec<(String, Result<BacktestResult, QuantEaseError>)>;

/// Runs one strategy over several named series in parallel.
///
/// The strategy is compiled once; a bad strategy fails the whole batch.
/// Per-series failures (e.g. an empty series) are returned in place.
pub fn run_batch(
    series: &[(String, Vec<OhlcvBar>)],
    strategy: &StrategyConfig,
    config: &BacktestConfig,
) -> Result<BatchResults, QuantEaseError> {
    let compiled = compile(strategy)?;
    Ok(run_batch_compiled(series, &compiled, config))
}

/// `run_batch` for a strategy the caller has already compiled.
pub fn run_batch_compiled(
    series: &[(String, Vec<OhlcvBar>)],
    compiled: &CompiledStrategy,
    config: &BacktestConfig,
) -> BatchResults {
    series
        .par_iter()
        .map(|(symbol, bars)| (symbol.clone(), run_compiled(bars, compiled, config)))
        .collect()
}
