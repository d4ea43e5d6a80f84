//! Application configuration validation.
//!
//! Checks every INI field the backtest command reads before any data is
//! loaded. The symbol list is checked separately, after a command-line
//! override has been applied.

use crate::domain::error::QuantEaseError;
use crate::ports::config_port::ConfigPort;
use chrono::NaiveDate;

pub const DEFAULT_INITIAL_CAPITAL: f64 = 100_000.0;
pub const DEFAULT_POSITION_FRACTION: f64 = 0.02;
pub const DEFAULT_CACHE_TTL_SECS: i64 = 60;

pub fn validate_app_config(config: &dyn ConfigPort) -> Result<(), QuantEaseError> {
    validate_initial_capital(config)?;
    validate_position_fraction(config)?;
    validate_dates(config)?;
    validate_cache_ttl(config)?;
    Ok(())
}

fn invalid(section: &str, key: &str, reason: impl Into<String>) -> QuantEaseError {
    QuantEaseError::ConfigInvalid {
        section: section.to_string(),
        key: key.to_string(),
        reason: reason.into(),
    }
}

/// Reads a float, distinguishing "absent" (default) from "present but not a
/// number" (error).
pub fn read_double(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
    default: f64,
) -> Result<f64, QuantEaseError> {
    match config.get_string(section, key) {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse::<f64>()
            .map_err(|_| invalid(section, key, format!("'{raw}' is not a number"))),
    }
}

fn validate_initial_capital(config: &dyn ConfigPort) -> Result<(), QuantEaseError> {
    let value = read_double(config, "backtest", "initial_capital", DEFAULT_INITIAL_CAPITAL)?;
    if !(value.is_finite() && value > 0.0) {
        return Err(invalid(
            "backtest",
            "initial_capital",
            "initial_capital must be positive",
        ));
    }
    Ok(())
}

fn validate_position_fraction(config: &dyn ConfigPort) -> Result<(), QuantEaseError> {
    let value = read_double(
        config,
        "backtest",
        "position_fraction",
        DEFAULT_POSITION_FRACTION,
    )?;
    if !(value > 0.0 && value <= 1.0) {
        return Err(invalid(
            "backtest",
            "position_fraction",
            "position_fraction must be in (0, 1]",
        ));
    }
    Ok(())
}

fn validate_dates(config: &dyn ConfigPort) -> Result<(), QuantEaseError> {
    let (start_date, end_date) = read_date_range(config)?;
    if start_date >= end_date {
        return Err(invalid(
            "backtest",
            "start_date",
            "start_date must be before end_date",
        ));
    }
    Ok(())
}

pub fn read_date_range(config: &dyn ConfigPort) -> Result<(NaiveDate, NaiveDate), QuantEaseError> {
    let start = parse_date(config.get_string("backtest", "start_date").as_deref(), "start_date")?;
    let end = parse_date(config.get_string("backtest", "end_date").as_deref(), "end_date")?;
    Ok((start, end))
}

fn parse_date(value: Option<&str>, field: &str) -> Result<NaiveDate, QuantEaseError> {
    match value {
        None => Err(QuantEaseError::ConfigMissing {
            section: "backtest".to_string(),
            key: field.to_string(),
        }),
        Some(s) => NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").map_err(|_| {
            invalid(
                "backtest",
                field,
                format!("invalid {} format, expected YYYY-MM-DD", field),
            )
        }),
    }
}

/// `symbols` (comma separated) wins over `symbol`; blanks are dropped.
pub fn read_symbols(config: &dyn ConfigPort) -> Vec<String> {
    let raw = config
        .get_string("backtest", "symbols")
        .filter(|s| !s.trim().is_empty())
        .or_else(|| config.get_string("backtest", "symbol"))
        .unwrap_or_default();

    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

/// The resolved symbol list must name at least one symbol.
pub fn validate_symbols(symbols: &[String]) -> Result<(), QuantEaseError> {
    if symbols.is_empty() {
        return Err(QuantEaseError::ConfigMissing {
            section: "backtest".to_string(),
            key: "symbol".to_string(),
        });
    }
    Ok(())
}

fn validate_cache_ttl(config: &dyn ConfigPort) -> Result<(), QuantEaseError> {
    let ttl = config.get_int("data", "cache_ttl_secs", DEFAULT_CACHE_TTL_SECS);
    if ttl < 0 {
        return Err(invalid(
            "data",
            "cache_ttl_secs",
            "cache_ttl_secs must be non-negative",
        ));
    }
    Ok(())
}
