//! Open long position and closed trade records.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// The single open long position held by the simulator.
#[derive(Debug, Clone, PartialEq)]
pub struct Position {
    pub shares: f64,
    pub entry_price: f64,
    pub entry_date: NaiveDate,
}

impl Position {
    /// Buys `cash_amount` worth of fractional shares at `price`.
    pub fn open(cash_amount: f64, price: f64, date: NaiveDate) -> Self {
        Position {
            shares: cash_amount / price,
            entry_price: price,
            entry_date: date,
        }
    }

    pub fn market_value(&self, price: f64) -> f64 {
        self.shares * price
    }

    pub fn unrealized_pnl(&self, price: f64) -> f64 {
        self.shares * (price - self.entry_price)
    }

    /// Liquidates every share at `price`.
    pub fn close(self, price: f64, date: NaiveDate) -> Trade {
        Trade {
            entry_date: self.entry_date,
            exit_date: date,
            shares: self.shares,
            entry_price: self.entry_price,
            exit_price: price,
            pnl: (price - self.entry_price) * self.shares,
            return_pct: (price - self.entry_price) / self.entry_price,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    pub entry_date: NaiveDate,
    pub exit_date: NaiveDate,
    pub shares: f64,
    pub entry_price: f64,
    pub exit_price: f64,
    pub pnl: f64,
    pub return_pct: f64,
}

impl Trade {
    pub fn is_win(&self) -> bool {
        self.pnl > 0.0
    }

    pub fn is_loss(&self) -> bool {
        self.pnl < 0.0
    }
}
