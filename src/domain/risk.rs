//! Risk tier classification from a metrics triple.

use std::fmt;

use serde::Serialize;

use super::metrics::{serialize_float, Metrics};

pub const DRAWDOWN_WARNING: &str =
    "High maximum drawdown detected. Consider reducing position size.";
pub const SHARPE_SUGGESTION: &str = "Low Sharpe ratio. Strategy may need optimization.";
pub const VOLATILITY_WARNING: &str =
    "High volatility detected. Consider risk management measures.";
pub const ALL_CLEAR: &str = "Strategy shows good risk-adjusted returns.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Moderate,
    High,
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RiskLevel::Low => "low",
            RiskLevel::Moderate => "moderate",
            RiskLevel::High => "high",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RiskReport {
    pub risk_level: RiskLevel,
    pub recommendations: Vec<String>,
    #[serde(serialize_with = "serialize_float")]
    pub sharpe: f64,
    #[serde(serialize_with = "serialize_float")]
    pub max_drawdown: f64,
    #[serde(serialize_with = "serialize_float")]
    pub volatility: f64,
}

/// Low needs both a strong Sharpe and a shallow drawdown; moderate needs
/// either a middling Sharpe or a deep drawdown; everything else is high.
pub fn classify_level(sharpe: f64, max_drawdown: f64) -> RiskLevel {
    if sharpe >= 1.5 && max_drawdown > -0.2 {
        RiskLevel::Low
    } else if (1.0..1.5).contains(&sharpe) || max_drawdown <= -0.2 {
        RiskLevel::Moderate
    } else {
        RiskLevel::High
    }
}

pub fn classify(sharpe: f64, max_drawdown: f64, volatility: f64) -> RiskReport {
    let mut recommendations = Vec::new();
    if max_drawdown < -0.3 {
        recommendations.push(DRAWDOWN_WARNING.to_string());
    }
    if sharpe < 1.0 {
        recommendations.push(SHARPE_SUGGESTION.to_string());
    }
    if volatility > 0.3 {
        recommendations.push(VOLATILITY_WARNING.to_string());
    }
    if recommendations.is_empty() {
        recommendations.push(ALL_CLEAR.to_string());
    }

    RiskReport {
        risk_level: classify_level(sharpe, max_drawdown),
        recommendations,
        sharpe,
        max_drawdown,
        volatility,
    }
}

impl From<&Metrics> for RiskReport {
    fn from(metrics: &Metrics) -> Self {
        classify(metrics.sharpe, metrics.max_drawdown, metrics.volatility)
    }
}
