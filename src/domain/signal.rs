//! Per-bar trading signals and the level-to-edge transform.
//!
//! Strategies first produce a *level* per bar (in regime / out of regime, or
//! undefined during warmup). Levels are normalized (undefined → 0) and then
//! differenced so only regime changes emit an enter or exit event.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(into = "i8", try_from = "i8")]
pub enum Signal {
    Exit,
    #[default]
    Hold,
    Enter,
}

impl Signal {
    pub fn as_i8(self) -> i8 {
        match self {
            Signal::Exit => -1,
            Signal::Hold => 0,
            Signal::Enter => 1,
        }
    }

    /// Maps a level difference onto a signal by its sign.
    pub fn from_delta(delta: i8) -> Self {
        match delta.signum() {
            1 => Signal::Enter,
            -1 => Signal::Exit,
            _ => Signal::Hold,
        }
    }
}

impl From<Signal> for i8 {
    fn from(signal: Signal) -> Self {
        signal.as_i8()
    }
}

impl TryFrom<i8> for Signal {
    type Error = String;

    fn try_from(value: i8) -> Result<Self, Self::Error> {
        match value {
            -1 => Ok(Signal::Exit),
            0 => Ok(Signal::Hold),
            1 => Ok(Signal::Enter),
            other => Err(format!("signal must be -1, 0 or 1, got {other}")),
        }
    }
}

pub type SignalSeries = Vec<Signal>;

/// Replaces undefined levels with 0.
pub fn normalize(levels: &[Option<i8>]) -> Vec<i8> {
    levels.iter().map(|l| l.unwrap_or(0)).collect()
}

/// Discrete derivative of a level series: `level[i] - level[i-1]`. The first
/// bar has no predecessor and is always `Hold`, so a constant level series
/// yields no events at all. Runs of identical levels collapse to `Hold`.
pub fn edges(levels: &[i8]) -> SignalSeries {
    let mut prev: Option<i8> = None;
    levels
        .iter()
        .map(|&level| {
            let signal = match prev {
                Some(p) => Signal::from_delta(level - p),
                None => Signal::Hold,
            };
            prev = Some(level);
            signal
        })
        .collect()
}

/// 1 where `a > b`, 0 where both are defined and `a <= b`, undefined otherwise.
pub fn level_above(a: &[Option<f64>], b: &[Option<f64>]) -> Vec<Option<i8>> {
    a.iter()
        .zip(b)
        .map(|(x, y)| match (x, y) {
            (Some(x), Some(y)) => Some(i8::from(x > y)),
            _ => None,
        })
        .collect()
}

/// Converts an externally supplied signal column. Undefined entries and any
/// value outside {-1, 0, 1} become `Hold`.
pub fn from_raw(raw: &[Option<i64>]) -> SignalSeries {
    raw.iter()
        .map(|v| match v {
            Some(1) => Signal::Enter,
            Some(-1) => Signal::Exit,
            _ => Signal::Hold,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn edges_fire_on_transitions_only() {
        let levels = [0, 1, 1, 1, 0, 0, 1];
        let signals = edges(&levels);
        assert_eq!(
            signals,
            vec![
                Signal::Hold,
                Signal::Enter,
                Signal::Hold,
                Signal::Hold,
                Signal::Exit,
                Signal::Hold,
                Signal::Enter,
            ]
        );
    }

    #[test]
    fn edges_first_bar_never_fires() {
        assert_eq!(edges(&[1, 1]), vec![Signal::Hold, Signal::Hold]);
        assert_eq!(edges(&[-1]), vec![Signal::Hold]);
        assert!(edges(&[]).is_empty());
    }

    #[test]
    fn edges_clamp_double_jumps() {
        // -1 → 1 is a delta of 2; it still reads as an entry
        assert_eq!(edges(&[0, -1, 1]), vec![Signal::Hold, Signal::Exit, Signal::Enter]);
        assert_eq!(edges(&[0, 1, -1]), vec![Signal::Hold, Signal::Enter, Signal::Exit]);
    }

    #[test]
    fn normalize_undefined_to_zero() {
        assert_eq!(normalize(&[None, Some(1), None, Some(-1)]), vec![0, 1, 0, -1]);
    }

    #[test]
    fn level_above_undefined_propagates() {
        let a = [None, Some(2.0), Some(1.0), Some(3.0)];
        let b = [Some(1.0), Some(1.0), Some(1.0), None];
        assert_eq!(level_above(&a, &b), vec![None, Some(1), Some(0), None]);
    }

    #[test]
    fn from_raw_normalizes_out_of_domain() {
        let raw = [Some(1), None, Some(-1), Some(2), Some(0)];
        assert_eq!(
            from_raw(&raw),
            vec![
                Signal::Enter,
                Signal::Hold,
                Signal::Exit,
                Signal::Hold,
                Signal::Hold
            ]
        );
    }

    #[test]
    fn serializes_as_integer() {
        let json = serde_json::to_string(&vec![Signal::Exit, Signal::Hold, Signal::Enter]).unwrap();
        assert_eq!(json, "[-1,0,1]");
        let back: Vec<Signal> = serde_json::from_str("[1,-1]").unwrap();
        assert_eq!(back, vec![Signal::Enter, Signal::Exit]);
        assert!(serde_json::from_str::<Signal>("3").is_err());
    }

    proptest! {
        #[test]
        fn constant_level_yields_no_signals(level in -1i8..=1, len in 0usize..200) {
            let signals = edges(&vec![level; len]);
            prop_assert!(signals.iter().all(|s| *s == Signal::Hold));
        }

        #[test]
        fn edges_preserve_length(levels in proptest::collection::vec(0i8..=1, 0..300)) {
            prop_assert_eq!(edges(&levels).len(), levels.len());
        }

        #[test]
        fn binary_levels_alternate_enter_exit(levels in proptest::collection::vec(0i8..=1, 0..300)) {
            let fired: Vec<Signal> = edges(&levels)
                .into_iter()
                .filter(|s| *s != Signal::Hold)
                .collect();
            for pair in fired.windows(2) {
                prop_assert_ne!(pair[0], pair[1]);
            }
        }
    }
}
