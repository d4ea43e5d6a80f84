//! quantease: strategy compiler and vectorized backtester.
//!
//! Hexagonal architecture: domain logic in [`domain`], port traits in [`ports`],
//! concrete implementations in [`adapters`]. The binary entry points live in
//! [`cli`] and [`obs`].

pub mod domain;
pub mod ports;
pub mod adapters;
pub mod cli;
pub mod obs;
