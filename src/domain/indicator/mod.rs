//! Technical indicator implementations.
//!
//! This module provides types for representing indicator configuration and output:
//! - `IndicatorConfig`: the declarative `{type, params...}` entry of a strategy
//! - `IndicatorKind`: the closed set of supported indicator families
//! - `IndicatorSpec`: a validated kind + parameters, ready to evaluate
//! - `IndicatorSeries`: one or more named output series aligned to the bars
//!
//! Evaluation is a pure dispatch from `IndicatorSpec` to one evaluator per kind.

pub mod adx;
pub mod atr;
pub mod bollinger;
pub mod ema;
pub mod macd;
pub mod rsi;
pub mod sma;

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::error::QuantEaseError;
use crate::domain::ohlcv::OhlcvBar;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndicatorKind {
    Sma,
    Ema,
    Rsi,
    Macd,
    BollingerBands,
    Atr,
    Adx,
}

impl FromStr for IndicatorKind {
    type Err = QuantEaseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "SMA" => Ok(IndicatorKind::Sma),
            "EMA" => Ok(IndicatorKind::Ema),
            "RSI" => Ok(IndicatorKind::Rsi),
            "MACD" => Ok(IndicatorKind::Macd),
            "BB" | "BOLLINGER" | "BOLLINGERBANDS" => Ok(IndicatorKind::BollingerBands),
            "ATR" => Ok(IndicatorKind::Atr),
            "ADX" => Ok(IndicatorKind::Adx),
            other => Err(QuantEaseError::configuration(format!(
                "unknown indicator kind '{other}'"
            ))),
        }
    }
}

/// One raw indicator entry as written in a strategy configuration.
///
/// Parameters may sit next to `type` or inside a nested `params` object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorConfig {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(flatten)]
    pub params: BTreeMap<String, serde_json::Value>,
}

impl IndicatorConfig {
    pub fn new(kind: &str) -> Self {
        IndicatorConfig {
            kind: kind.to_string(),
            params: BTreeMap::new(),
        }
    }

    pub fn with_param(mut self, name: &str, value: f64) -> Self {
        self.params.insert(name.to_string(), serde_json::Value::from(value));
        self
    }

    fn param(&self, name: &str) -> Option<&serde_json::Value> {
        self.params
            .get("params")
            .and_then(|nested| nested.get(name))
            .or_else(|| self.params.get(name))
    }

    fn window(&self, name: &str, default: usize) -> Result<usize, QuantEaseError> {
        let Some(raw) = self.param(name) else {
            return Ok(default);
        };
        match raw.as_f64() {
            Some(v) if v.is_finite() && v >= 1.0 && v.fract() == 0.0 => Ok(v as usize),
            _ => Err(QuantEaseError::configuration(format!(
                "{}: '{}' must be a positive integer, got {}",
                self.kind, name, raw
            ))),
        }
    }

    fn multiplier(&self, name: &str, default: f64) -> Result<f64, QuantEaseError> {
        let Some(raw) = self.param(name) else {
            return Ok(default);
        };
        match raw.as_f64() {
            Some(v) if v.is_finite() && v >= 0.0 => Ok(v),
            _ => Err(QuantEaseError::configuration(format!(
                "{}: '{}' must be a non-negative number, got {}",
                self.kind, name, raw
            ))),
        }
    }
}

/// A validated indicator with concrete parameters.
#[derive(Debug, Clone, PartialEq)]
pub enum IndicatorSpec {
    Sma { window: usize },
    Ema { span: usize },
    Rsi { window: usize },
    Macd { fast: usize, slow: usize, signal: usize },
    BollingerBands { window: usize, stddev_mult: f64 },
    Atr { window: usize },
    Adx { window: usize },
}

impl IndicatorSpec {
    /// Resolves a raw entry, applying defaults for absent parameters.
    pub fn from_config(config: &IndicatorConfig) -> Result<Self, QuantEaseError> {
        let spec = match config.kind.parse::<IndicatorKind>()? {
            IndicatorKind::Sma => IndicatorSpec::Sma {
                window: config.window("window", 50)?,
            },
            IndicatorKind::Ema => IndicatorSpec::Ema {
                span: config.window("span", 12)?,
            },
            IndicatorKind::Rsi => IndicatorSpec::Rsi {
                window: config.window("window", 14)?,
            },
            IndicatorKind::Macd => IndicatorSpec::Macd {
                fast: config.window("fast", 12)?,
                slow: config.window("slow", 26)?,
                signal: config.window("signal", 9)?,
            },
            IndicatorKind::BollingerBands => IndicatorSpec::BollingerBands {
                window: config.window("window", 20)?,
                stddev_mult: config.multiplier("std", 2.0)?,
            },
            IndicatorKind::Atr => IndicatorSpec::Atr {
                window: config.window("window", 14)?,
            },
            IndicatorKind::Adx => IndicatorSpec::Adx {
                window: config.window("window", 14)?,
            },
        };
        Ok(spec)
    }

    pub fn kind(&self) -> IndicatorKind {
        match self {
            IndicatorSpec::Sma { .. } => IndicatorKind::Sma,
            IndicatorSpec::Ema { .. } => IndicatorKind::Ema,
            IndicatorSpec::Rsi { .. } => IndicatorKind::Rsi,
            IndicatorSpec::Macd { .. } => IndicatorKind::Macd,
            IndicatorSpec::BollingerBands { .. } => IndicatorKind::BollingerBands,
            IndicatorSpec::Atr { .. } => IndicatorKind::Atr,
            IndicatorSpec::Adx { .. } => IndicatorKind::Adx,
        }
    }
}

impl fmt::Display for IndicatorSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndicatorSpec::Sma { window } => write!(f, "SMA({})", window),
            IndicatorSpec::Ema { span } => write!(f, "EMA({})", span),
            IndicatorSpec::Rsi { window } => write!(f, "RSI({})", window),
            IndicatorSpec::Macd { fast, slow, signal } => {
                write!(f, "MACD({},{},{})", fast, slow, signal)
            }
            IndicatorSpec::BollingerBands {
                window,
                stddev_mult,
            } => write!(f, "BOLLINGER({},{})", window, stddev_mult),
            IndicatorSpec::Atr { window } => write!(f, "ATR({})", window),
            IndicatorSpec::Adx { window } => write!(f, "ADX({})", window),
        }
    }
}

/// Named output series of one indicator, each aligned to the input bars.
#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorSeries {
    pub spec: IndicatorSpec,
    pub outputs: Vec<(&'static str, Vec<Option<f64>>)>,
}

impl IndicatorSeries {
    pub fn single(spec: IndicatorSpec, name: &'static str, values: Vec<Option<f64>>) -> Self {
        IndicatorSeries {
            spec,
            outputs: vec![(name, values)],
        }
    }

    pub fn output(&self, name: &str) -> Option<&[Option<f64>]> {
        self.outputs
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, v)| v.as_slice())
    }

    /// The first declared output (the indicator's main line).
    pub fn primary(&self) -> &[Option<f64>] {
        self.outputs
            .first()
            .map(|(_, v)| v.as_slice())
            .unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.primary().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Evaluates one indicator over the bars.
pub fn evaluate(bars: &[OhlcvBar], spec: &IndicatorSpec) -> IndicatorSeries {
    match *spec {
        IndicatorSpec::Sma { window } => sma::calculate_sma(bars, window),
        IndicatorSpec::Ema { span } => ema::calculate_ema(bars, span),
        IndicatorSpec::Rsi { window } => rsi::calculate_rsi(bars, window),
        IndicatorSpec::Macd { fast, slow, signal } => {
            macd::calculate_macd(bars, fast, slow, signal)
        }
        IndicatorSpec::BollingerBands {
            window,
            stddev_mult,
        } => bollinger::calculate_bollinger(bars, window, stddev_mult),
        IndicatorSpec::Atr { window } => atr::calculate_atr(bars, window),
        IndicatorSpec::Adx { window } => adx::calculate_adx(bars, window),
    }
}
