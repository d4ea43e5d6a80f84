//! Strategy configuration and compilation.
//!
//! A strategy is an ordered list of indicator entries. Compilation validates
//! every entry and then picks exactly one signal family, first match wins:
//!
//! 1. two or more SMAs: crossover of the two shortest windows
//! 2. any RSI: the first one, oversold (< 30) enters, overbought (> 70) exits
//! 3. any MACD: the first one, MACD line above its signal line
//! 4. otherwise: close-to-close momentum above 1%
//!
//! Every indicator is evaluated on each run and reported alongside the
//! result; only those in the chosen family drive the signals.

use std::borrow::Cow;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::error::QuantEaseError;
use super::indicator::{self, IndicatorConfig, IndicatorSeries, IndicatorSpec};
use super::ohlcv::{closes, OhlcvBar};
use super::signal::{self, SignalSeries};

pub const RSI_OVERSOLD: f64 = 30.0;
pub const RSI_OVERBOUGHT: f64 = 70.0;
pub const MOMENTUM_THRESHOLD: f64 = 0.01;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StrategyConfig {
    #[serde(default)]
    pub indicators: Vec<IndicatorConfig>,
}

impl StrategyConfig {
    pub fn new(indicators: Vec<IndicatorConfig>) -> Self {
        StrategyConfig { indicators }
    }

    pub fn from_json(text: &str) -> Result<Self, QuantEaseError> {
        serde_json::from_str(text).map_err(|e| {
            QuantEaseError::configuration(format!("malformed strategy config: {e}"))
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum StrategyFamily {
    SmaCrossover { fast: usize, slow: usize },
    Rsi { window: usize },
    Macd { fast: usize, slow: usize, signal: usize },
    Momentum,
}

impl fmt::Display for StrategyFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StrategyFamily::SmaCrossover { fast, slow } => {
                write!(f, "SMA crossover ({} vs {})", fast, slow)
            }
            StrategyFamily::Rsi { window } => write!(f, "RSI reversal (period {})", window),
            StrategyFamily::Macd { fast, slow, signal } => {
                write!(f, "MACD crossover ({},{},{})", fast, slow, signal)
            }
            StrategyFamily::Momentum => write!(f, "default momentum"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CompiledStrategy {
    pub specs: Vec<IndicatorSpec>,
    pub family: StrategyFamily,
}

/// Validates every indicator entry and selects the signal family.
///
/// Fails with a configuration error on the first bad entry, before any price
/// data is looked at.
pub fn compile(config: &StrategyConfig) -> Result<CompiledStrategy, QuantEaseError> {
    let specs = config
        .indicators
        .iter()
        .map(IndicatorSpec::from_config)
        .collect::<Result<Vec<_>, _>>()?;

    let family = select_family(&specs);
    tracing::debug!(indicators = specs.len(), family = %family, "compiled strategy");

    Ok(CompiledStrategy { specs, family })
}

fn select_family(specs: &[IndicatorSpec]) -> StrategyFamily {
    let mut sma_windows: Vec<usize> = specs
        .iter()
        .filter_map(|s| match s {
            IndicatorSpec::Sma { window } => Some(*window),
            _ => None,
        })
        .collect();

    if sma_windows.len() >= 2 {
        sma_windows.sort_unstable();
        return StrategyFamily::SmaCrossover {
            fast: sma_windows[0],
            slow: sma_windows[1],
        };
    }

    let first_rsi = specs.iter().find_map(|s| match s {
        IndicatorSpec::Rsi { window } => Some(*window),
        _ => None,
    });
    if let Some(window) = first_rsi {
        return StrategyFamily::Rsi { window };
    }

    let first_macd = specs.iter().find_map(|s| match s {
        IndicatorSpec::Macd { fast, slow, signal } => Some((*fast, *slow, *signal)),
        _ => None,
    });
    if let Some((fast, slow, signal)) = first_macd {
        return StrategyFamily::Macd { fast, slow, signal };
    }

    StrategyFamily::Momentum
}

/// Indicator outputs and the signal series derived from them.
#[derive(Debug, Clone, PartialEq)]
pub struct StrategyOutput {
    pub indicators: Vec<IndicatorSeries>,
    pub signals: SignalSeries,
}

impl CompiledStrategy {
    /// Evaluates every configured indicator, in configuration order.
    pub fn indicators(&self, bars: &[OhlcvBar]) -> Vec<IndicatorSeries> {
        self.specs
            .iter()
            .map(|spec| indicator::evaluate(bars, spec))
            .collect()
    }

    /// Evaluates all indicators once and derives the signals from them.
    pub fn apply(&self, bars: &[OhlcvBar]) -> StrategyOutput {
        let indicators = self.indicators(bars);
        let signals = signal::edges(&signal::normalize(&self.levels_from(bars, &indicators)));
        StrategyOutput {
            indicators,
            signals,
        }
    }

    /// Per-bar regime levels before differencing; `None` during warmup.
    pub fn levels(&self, bars: &[OhlcvBar]) -> Vec<Option<i8>> {
        self.levels_from(bars, &[])
    }

    fn levels_from(&self, bars: &[OhlcvBar], evaluated: &[IndicatorSeries]) -> Vec<Option<i8>> {
        match self.family {
            StrategyFamily::SmaCrossover { fast, slow } => {
                let fast = lookup(bars, evaluated, IndicatorSpec::Sma { window: fast });
                let slow = lookup(bars, evaluated, IndicatorSpec::Sma { window: slow });
                signal::level_above(fast.primary(), slow.primary())
            }
            StrategyFamily::Rsi { window } => {
                let rsi = lookup(bars, evaluated, IndicatorSpec::Rsi { window });
                rsi.primary()
                    .iter()
                    .map(|v| {
                        v.map(|r| {
                            if r > RSI_OVERBOUGHT {
                                -1
                            } else if r < RSI_OVERSOLD {
                                1
                            } else {
                                0
                            }
                        })
                    })
                    .collect()
            }
            StrategyFamily::Macd { fast, slow, signal } => {
                let macd = lookup(bars, evaluated, IndicatorSpec::Macd { fast, slow, signal });
                let line = macd.output("macd").unwrap_or(&[]);
                let trigger = macd.output("signal").unwrap_or(&[]);
                signal::level_above(line, trigger)
            }
            StrategyFamily::Momentum => momentum_levels(&closes(bars)),
        }
    }

    /// The enter/exit series for `bars`, same length, never undefined.
    pub fn signals(&self, bars: &[OhlcvBar]) -> SignalSeries {
        self.apply(bars).signals
    }
}

/// An already evaluated series for `spec`, or a fresh evaluation.
fn lookup<'a>(
    bars: &[OhlcvBar],
    evaluated: &'a [IndicatorSeries],
    spec: IndicatorSpec,
) -> Cow<'a, IndicatorSeries> {
    match evaluated.iter().find(|s| s.spec == spec) {
        Some(found) => Cow::Borrowed(found),
        None => Cow::Owned(indicator::evaluate(bars, &spec)),
    }
}

fn momentum_levels(closes: &[f64]) -> Vec<Option<i8>> {
    (0..closes.len())
        .map(|i| {
            if i == 0 || closes[i - 1] == 0.0 {
                return None;
            }
            let change = closes[i] / closes[i - 1] - 1.0;
            Some(i8::from(change > MOMENTUM_THRESHOLD))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::indicator::IndicatorKind;
    use crate::domain::signal::Signal;
    use chrono::NaiveDate;

    fn make_bars(prices: &[f64]) -> Vec<OhlcvBar> {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        prices
            .iter()
            .enumerate()
            .map(|(i, &close)| OhlcvBar {
                date: start + chrono::Days::new(i as u64),
                open: close,
                high: close,
                low: close,
                close,
                volume: 1000,
            })
            .collect()
    }

    fn config(json: &str) -> StrategyConfig {
        StrategyConfig::from_json(json).unwrap()
    }

    #[test]
    fn sma_pair_wins_over_everything() {
        let cfg = config(
            r#"{"indicators": [
                {"type": "RSI", "window": 14},
                {"type": "MACD"},
                {"type": "SMA", "window": 50},
                {"type": "SMA", "window": 10}
            ]}"#,
        );
        let compiled = compile(&cfg).unwrap();
        assert_eq!(
            compiled.family,
            StrategyFamily::SmaCrossover { fast: 10, slow: 50 }
        );
        assert_eq!(compiled.specs.len(), 4);
    }

    #[test]
    fn sma_crossover_uses_two_shortest_windows() {
        let cfg = config(
            r#"{"indicators": [
                {"type": "SMA", "window": 200},
                {"type": "SMA", "window": 20},
                {"type": "SMA", "window": 5}
            ]}"#,
        );
        assert_eq!(
            compile(&cfg).unwrap().family,
            StrategyFamily::SmaCrossover { fast: 5, slow: 20 }
        );
    }

    #[test]
    fn single_sma_falls_through_to_rsi() {
        let cfg = config(
            r#"{"indicators": [
                {"type": "SMA", "window": 20},
                {"type": "RSI", "window": 7},
                {"type": "RSI", "window": 21}
            ]}"#,
        );
        assert_eq!(compile(&cfg).unwrap().family, StrategyFamily::Rsi { window: 7 });
    }

    #[test]
    fn macd_when_no_sma_pair_or_rsi() {
        let cfg = config(
            r#"{"indicators": [
                {"type": "EMA", "span": 20},
                {"type": "MACD", "fast": 5, "slow": 35, "signal": 5},
                {"type": "MACD"}
            ]}"#,
        );
        assert_eq!(
            compile(&cfg).unwrap().family,
            StrategyFamily::Macd {
                fast: 5,
                slow: 35,
                signal: 5
            }
        );
    }

    #[test]
    fn momentum_is_the_default() {
        let cfg = config(r#"{"indicators": [{"type": "ATR"}, {"type": "BB"}]}"#);
        assert_eq!(compile(&cfg).unwrap().family, StrategyFamily::Momentum);
        assert_eq!(
            compile(&StrategyConfig::default()).unwrap().family,
            StrategyFamily::Momentum
        );
    }

    #[test]
    fn unknown_kind_fails_compile() {
        let cfg = config(r#"{"indicators": [{"type": "SMA"}, {"type": "ICHIMOKU"}]}"#);
        let err = compile(&cfg).unwrap_err();
        assert!(matches!(err, QuantEaseError::Configuration { .. }));
        assert!(err.to_string().contains("ICHIMOKU"));
    }

    #[test]
    fn malformed_json_is_configuration_error() {
        let err = StrategyConfig::from_json("{\"indicators\": [").unwrap_err();
        assert!(matches!(err, QuantEaseError::Configuration { .. }));
    }

    #[test]
    fn sma_crossover_signals() {
        // fast SMA(1) is the close itself, slow SMA(2) lags it
        let bars = make_bars(&[10.0, 10.0, 12.0, 13.0, 11.0, 9.0, 9.0]);
        let compiled = CompiledStrategy {
            specs: vec![],
            family: StrategyFamily::SmaCrossover { fast: 1, slow: 2 },
        };
        let signals = compiled.signals(&bars);
        assert_eq!(
            signals,
            vec![
                Signal::Hold,  // slow undefined
                Signal::Hold,  // 10 vs 10
                Signal::Enter, // 12 > 11
                Signal::Hold,  // 13 > 12.5
                Signal::Exit,  // 11 < 12
                Signal::Hold,  // 9 < 10
                Signal::Hold,  // 9 == 9
            ]
        );
    }

    #[test]
    fn rsi_regions_fire_once() {
        // falling prices drive RSI to 0 (oversold), a rally drives it to 100
        let bars = make_bars(&[10.0, 9.0, 8.0, 7.0, 8.0, 9.0, 10.0, 11.0]);
        let compiled = CompiledStrategy {
            specs: vec![],
            family: StrategyFamily::Rsi { window: 2 },
        };
        let levels = compiled.levels(&bars);
        // window of two losses: gain 0 → RSI 0; two gains: loss 0 → undefined
        assert_eq!(levels[0], None);
        assert_eq!(levels[1], None);
        assert_eq!(levels[2], Some(1));
        assert_eq!(levels[3], Some(1));
        assert_eq!(levels[4], Some(0));
        assert_eq!(levels[5], None);

        let signals = compiled.signals(&bars);
        assert_eq!(signals[2], Signal::Enter);
        assert_eq!(signals[3], Signal::Hold);
        assert_eq!(signals[4], Signal::Exit);
        assert!(signals[5..].iter().all(|s| *s == Signal::Hold));
    }

    #[test]
    fn momentum_needs_more_than_one_percent() {
        let bars = make_bars(&[100.0, 100.5, 101.0, 104.0, 104.0]);
        let compiled = CompiledStrategy {
            specs: vec![],
            family: StrategyFamily::Momentum,
        };
        assert_eq!(
            compiled.levels(&bars),
            vec![None, Some(0), Some(0), Some(1), Some(0)]
        );
        assert_eq!(
            compiled.signals(&bars),
            vec![Signal::Hold, Signal::Hold, Signal::Hold, Signal::Enter, Signal::Exit]
        );
    }

    #[test]
    fn macd_signals_are_aligned() {
        let prices: Vec<f64> = (0..60).map(|i| 100.0 + (i as f64 * 0.3).sin() * 5.0).collect();
        let bars = make_bars(&prices);
        let compiled = compile(&config(r#"{"indicators": [{"type": "MACD", "fast": 3, "slow": 8, "signal": 3}]}"#)).unwrap();
        let signals = compiled.signals(&bars);
        assert_eq!(signals.len(), bars.len());
        assert!(signals.iter().any(|s| *s == Signal::Enter));
        assert!(signals.iter().any(|s| *s == Signal::Exit));
    }

    #[test]
    fn windows_longer_than_series_emit_nothing() {
        let bars = make_bars(&[1.0, 2.0, 3.0]);
        let compiled = compile(&config(
            r#"{"indicators": [{"type": "SMA", "window": 10}, {"type": "SMA", "window": 20}]}"#,
        ))
        .unwrap();
        assert_eq!(compiled.signals(&bars), vec![Signal::Hold; 3]);
    }

    #[test]
    fn every_indicator_is_evaluated_in_order() {
        let prices: Vec<f64> = (0..40).map(|i| 100.0 + (i as f64 * 0.5).cos() * 3.0).collect();
        let bars = make_bars(&prices);
        let compiled = compile(&config(
            r#"{"indicators": [
                {"type": "ATR", "window": 5},
                {"type": "BB", "window": 10},
                {"type": "ADX", "window": 5},
                {"type": "EMA", "span": 8}
            ]}"#,
        ))
        .unwrap();

        let output = compiled.apply(&bars);
        let kinds: Vec<IndicatorKind> = output.indicators.iter().map(|s| s.spec.kind()).collect();
        assert_eq!(
            kinds,
            vec![
                IndicatorKind::Atr,
                IndicatorKind::BollingerBands,
                IndicatorKind::Adx,
                IndicatorKind::Ema
            ]
        );
        for series in &output.indicators {
            for (name, values) in &series.outputs {
                assert_eq!(values.len(), bars.len(), "{} {name}", series.spec);
            }
        }
        assert_eq!(output.indicators[1].outputs.len(), 3);
        assert_eq!(output.signals.len(), bars.len());
    }

    #[test]
    fn family_reuses_evaluated_indicators() {
        let prices: Vec<f64> = (0..30).map(|i| 50.0 + (i as f64 * 0.7).sin() * 4.0).collect();
        let bars = make_bars(&prices);
        let compiled = compile(&config(
            r#"{"indicators": [{"type": "SMA", "window": 8}, {"type": "SMA", "window": 3}]}"#,
        ))
        .unwrap();

        let output = compiled.apply(&bars);
        assert_eq!(output.indicators.len(), 2);
        assert_eq!(output.signals, compiled.signals(&bars));
        assert_eq!(
            output.signals,
            signal::edges(&signal::normalize(&compiled.levels(&bars)))
        );
    }

    #[test]
    fn family_display() {
        assert_eq!(
            StrategyFamily::SmaCrossover { fast: 10, slow: 50 }.to_string(),
            "SMA crossover (10 vs 50)"
        );
        assert_eq!(StrategyFamily::Momentum.to_string(), "default momentum");
    }
}
