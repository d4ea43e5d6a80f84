//! Core domain types and logic.

pub mod ohlcv;
pub mod indicator;
pub mod indicator_helpers;
pub mod signal;
pub mod strategy;
pub mod position;
pub mod execution;
pub mod metrics;
pub mod risk;
pub mod backtest;
pub mod demo_data;
pub mod config_validation;
pub mod error;
