//! Domain error types.

use chrono::NaiveDate;

/// Top-level error type for quantease.
#[derive(Debug, thiserror::Error)]
pub enum QuantEaseError {
    #[error("configuration error: {reason}")]
    Configuration { reason: String },

    #[error("validation error: {reason}")]
    Validation { reason: String },

    #[error("no price data found for {symbol}")]
    NotFound { symbol: String },

    #[error("no price rows for {symbol} between {start} and {end}")]
    EmptyRange {
        symbol: String,
        start: NaiveDate,
        end: NaiveDate,
    },

    #[error("data error: {reason}")]
    Data { reason: String },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl QuantEaseError {
    pub fn configuration(reason: impl Into<String>) -> Self {
        QuantEaseError::Configuration {
            reason: reason.into(),
        }
    }

    pub fn validation(reason: impl Into<String>) -> Self {
        QuantEaseError::Validation {
            reason: reason.into(),
        }
    }

    /// True for the two "price history unavailable" conditions.
    pub fn is_data_unavailable(&self) -> bool {
        matches!(
            self,
            QuantEaseError::NotFound { .. } | QuantEaseError::EmptyRange { .. }
        )
    }
}

impl From<&QuantEaseError> for std::process::ExitCode {
    fn from(err: &QuantEaseError) -> Self {
        let code: u8 = match err {
            QuantEaseError::Io(_) => 1,
            QuantEaseError::ConfigParse { .. }
            | QuantEaseError::ConfigMissing { .. }
            | QuantEaseError::ConfigInvalid { .. } => 2,
            QuantEaseError::Data { .. } | QuantEaseError::Json(_) => 3,
            QuantEaseError::Configuration { .. } => 4,
            QuantEaseError::NotFound { .. } | QuantEaseError::EmptyRange { .. } => 5,
            QuantEaseError::Validation { .. } => 6,
        };
        std::process::ExitCode::from(code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_messages() {
        let err = QuantEaseError::configuration("unknown indicator kind 'FOO'");
        assert_eq!(
            err.to_string(),
            "configuration error: unknown indicator kind 'FOO'"
        );

        let err = QuantEaseError::NotFound {
            symbol: "INFY_NS".into(),
        };
        assert_eq!(err.to_string(), "no price data found for INFY_NS");
    }

    #[test]
    fn empty_range_mentions_dates() {
        let err = QuantEaseError::EmptyRange {
            symbol: "TCS_NS".into(),
            start: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            end: NaiveDate::from_ymd_opt(2024, 2, 1).unwrap(),
        };
        assert_eq!(
            err.to_string(),
            "no price rows for TCS_NS between 2024-01-01 and 2024-02-01"
        );
    }

    #[test]
    fn data_unavailable_classification() {
        assert!(QuantEaseError::NotFound { symbol: "X".into() }.is_data_unavailable());
        assert!(
            QuantEaseError::EmptyRange {
                symbol: "X".into(),
                start: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
                end: NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
            }
            .is_data_unavailable()
        );
        assert!(!QuantEaseError::validation("empty series").is_data_unavailable());
    }
}
