//! Performance metrics over an equity curve and its closed trades.
//!
//! One bar is one trading day; annualization uses 252 periods per year.
//! Degenerate inputs (flat equity, no trades, no losing trades) produce the
//! documented defaults instead of errors.

use serde::{Serialize, Serializer};

use super::indicator_helpers::sample_std;
use super::position::Trade;

pub const TRADING_DAYS_PER_YEAR: f64 = 252.0;

/// Added to the return stddev before dividing, so a flat curve gives Sharpe 0.
pub const SHARPE_EPSILON: f64 = 1e-9;

const MIN_YEARS: f64 = 1e-6;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Metrics {
    #[serde(serialize_with = "serialize_float")]
    pub cagr: f64,
    #[serde(serialize_with = "serialize_float")]
    pub sharpe: f64,
    #[serde(serialize_with = "serialize_float")]
    pub max_drawdown: f64,
    #[serde(serialize_with = "serialize_float")]
    pub volatility: f64,
    pub win_rate: f64,
    #[serde(serialize_with = "serialize_float")]
    pub profit_factor: f64,
    pub trades: usize,
    #[serde(serialize_with = "serialize_float")]
    pub total_return: f64,
    #[serde(serialize_with = "serialize_float")]
    pub final_value: f64,
    pub avg_trade_return: f64,
    pub max_trade_return: f64,
    pub min_trade_return: f64,
}

impl Metrics {
    pub fn compute(equity_curve: &[f64], trades: &[Trade], initial_capital: f64) -> Self {
        let final_value = equity_curve.last().copied().unwrap_or(initial_capital);

        let total_return = if initial_capital > 0.0 {
            (final_value - initial_capital) / initial_capital
        } else {
            0.0
        };

        let years = (equity_curve.len() as f64 / TRADING_DAYS_PER_YEAR).max(MIN_YEARS);
        let cagr = if initial_capital > 0.0 {
            (final_value / initial_capital).powf(1.0 / years) - 1.0
        } else {
            0.0
        };

        let returns = period_returns(equity_curve);
        let mean = if returns.is_empty() {
            0.0
        } else {
            returns.iter().sum::<f64>() / returns.len() as f64
        };
        let stddev = sample_std(&returns).unwrap_or(0.0);
        let sharpe = mean / (stddev + SHARPE_EPSILON) * TRADING_DAYS_PER_YEAR.sqrt();
        let volatility = stddev * TRADING_DAYS_PER_YEAR.sqrt();

        let max_drawdown = max_drawdown(equity_curve);

        let mut wins = 0usize;
        let mut total_wins = 0.0_f64;
        let mut total_losses = 0.0_f64;
        let mut has_loss = false;
        for trade in trades {
            if trade.is_win() {
                wins += 1;
                total_wins += trade.pnl;
            } else if trade.is_loss() {
                has_loss = true;
                total_losses += trade.pnl.abs();
            }
        }

        let win_rate = if trades.is_empty() {
            0.0
        } else {
            wins as f64 / trades.len() as f64
        };

        let profit_factor = if has_loss {
            total_wins / total_losses
        } else if total_wins > 0.0 {
            f64::INFINITY
        } else {
            0.0
        };

        let (avg_trade_return, max_trade_return, min_trade_return) = trade_extremes(trades);

        Metrics {
            cagr,
            sharpe,
            max_drawdown,
            volatility,
            win_rate,
            profit_factor,
            trades: trades.len(),
            total_return,
            final_value,
            avg_trade_return,
            max_trade_return,
            min_trade_return,
        }
    }
}

/// Simple per-bar returns with the first one fixed at 0.
pub fn period_returns(equity_curve: &[f64]) -> Vec<f64> {
    if equity_curve.is_empty() {
        return Vec::new();
    }

    std::iter::once(0.0)
        .chain(equity_curve.windows(2).map(|w| {
            if w[0] != 0.0 {
                w[1] / w[0] - 1.0
            } else {
                0.0
            }
        }))
        .collect()
}

/// Most negative `equity / running_peak - 1`; 0 if never below the peak.
pub fn max_drawdown(equity_curve: &[f64]) -> f64 {
    let mut peak = f64::NEG_INFINITY;
    let mut worst = 0.0_f64;

    for &equity in equity_curve {
        peak = peak.max(equity);
        if peak > 0.0 {
            worst = worst.min(equity / peak - 1.0);
        }
    }

    worst
}

fn trade_extremes(trades: &[Trade]) -> (f64, f64, f64) {
    if trades.is_empty() {
        return (0.0, 0.0, 0.0);
    }

    let returns = trades.iter().map(|t| t.return_pct);
    let avg = returns.clone().sum::<f64>() / trades.len() as f64;
    let max = returns.clone().fold(f64::NEG_INFINITY, f64::max);
    let min = returns.fold(f64::INFINITY, f64::min);
    (avg, max, min)
}

/// JSON has no infinity or NaN; those are written as the strings
/// `"Infinity"`, `"-Infinity"` and `"NaN"`.
pub fn serialize_float<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    if value.is_nan() {
        serializer.serialize_str("NaN")
    } else if value.is_infinite() {
        serializer.serialize_str(if *value > 0.0 { "Infinity" } else { "-Infinity" })
    } else {
        serializer.serialize_f64(*value)
    }
}
