//! Trade simulation over a signal series.
//!
//! Two states, FLAT and LONG. An enter signal while FLAT buys a fixed
//! fraction of the *initial* capital at the bar's close; an exit signal while
//! LONG sells every share at the close and records a trade. Every other
//! combination is a no-op, so at most one position is ever open. Equity is
//! marked to market on every bar.

use super::error::QuantEaseError;
use super::ohlcv::{validate_series, OhlcvBar};
use super::position::{Position, Trade};
use super::signal::Signal;

/// Sizing parameters for the simulator.
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutionParams {
    /// Share of initial capital committed per entry, in (0, 1].
    pub position_fraction: f64,
}

impl Default for ExecutionParams {
    fn default() -> Self {
        ExecutionParams {
            position_fraction: 0.02,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SimulationResult {
    pub equity_curve: Vec<f64>,
    pub trades: Vec<Trade>,
    /// Position still open after the last bar, if any.
    pub open_position: Option<Position>,
}

/// Outcome of applying one signal to the current state.
#[derive(Debug, Clone, PartialEq)]
pub enum Transition {
    Entered,
    Exited(Trade),
    NoOp,
}

struct Simulator {
    cash: f64,
    entry_cash: f64,
    position: Option<Position>,
}

impl Simulator {
    fn step(&mut self, signal: Signal, bar: &OhlcvBar) -> Transition {
        match (signal, self.position.take()) {
            (Signal::Enter, None) => {
                let position = Position::open(self.entry_cash, bar.close, bar.date);
                self.cash -= position.market_value(bar.close);
                self.position = Some(position);
                Transition::Entered
            }
            (Signal::Exit, Some(position)) => {
                self.cash += position.market_value(bar.close);
                Transition::Exited(position.close(bar.close, bar.date))
            }
            (_, held) => {
                self.position = held;
                Transition::NoOp
            }
        }
    }

    fn equity(&self, price: f64) -> f64 {
        self.cash
            + self
                .position
                .as_ref()
                .map_or(0.0, |p| p.market_value(price))
    }
}

/// Runs the FLAT/LONG state machine.
///
/// Steps:
/// 1. Validate the price series and parameters (fails before any bar runs)
/// 2. For each bar, apply the signal: enter, exit, or no-op
/// 3. Append `cash + shares * close` to the equity curve
pub fn simulate(
    bars: &[OhlcvBar],
    signals: &[Signal],
    initial_capital: f64,
    params: &ExecutionParams,
) -> Result<SimulationResult, QuantEaseError> {
    validate_series(bars)?;
    if signals.len() != bars.len() {
        return Err(QuantEaseError::validation(format!(
            "signal series has {} entries for {} bars",
            signals.len(),
            bars.len()
        )));
    }
    if !(initial_capital.is_finite() && initial_capital > 0.0) {
        return Err(QuantEaseError::validation(format!(
            "initial capital must be positive, got {initial_capital}"
        )));
    }
    let fraction = params.position_fraction;
    if !(fraction > 0.0 && fraction <= 1.0) {
        return Err(QuantEaseError::validation(format!(
            "position fraction must be in (0, 1], got {fraction}"
        )));
    }

    let mut sim = Simulator {
        cash: initial_capital,
        entry_cash: initial_capital * fraction,
        position: None,
    };
    let mut equity_curve = Vec::with_capacity(bars.len());
    let mut trades = Vec::new();

    for (bar, &signal) in bars.iter().zip(signals) {
        if let Transition::Exited(trade) = sim.step(signal, bar) {
            trades.push(trade);
        }
        equity_curve.push(sim.equity(bar.close));
    }

    tracing::debug!(
        bars = bars.len(),
        trades = trades.len(),
        open = sim.position.is_some(),
        "simulation finished"
    );

    Ok(SimulationResult {
        equity_curve,
        trades,
        open_position: sim.position,
    })
}
