//! Time-bounded in-memory cache in front of any [`DataPort`].
//!
//! The cache is an ordinary owned value: whoever builds it decides the TTL
//! and when to clear it. Only successful fetches are stored.

use crate::domain::error::QuantEaseError;
use crate::domain::ohlcv::OhlcvBar;
use crate::ports::data_port::DataPort;
use chrono::NaiveDate;
use std::collections::HashMap;
use std::sync::RwLock;
use std::time::{Duration, Instant};

type CacheKey = (String, NaiveDate, NaiveDate);

#[derive(Debug, Clone)]
struct CacheEntry {
    bars: Vec<OhlcvBar>,
    stored_at: Instant,
}

pub struct CachedDataAdapter<P> {
    inner: P,
    ttl: Duration,
    entries: RwLock<HashMap<CacheKey, CacheEntry>>,
}

impl<P: DataPort> CachedDataAdapter<P> {
    pub fn new(inner: P, ttl: Duration) -> Self {
        Self {
            inner,
            ttl,
            entries: RwLock::new(HashMap::new()),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn inner(&self) -> &P {
        &self.inner
    }

    /// Number of live (unexpired) entries.
    pub fn len(&self) -> usize {
        self.entries
            .read()
            .map(|map| map.values().filter(|e| e.stored_at.elapsed() < self.ttl).count())
            .unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        if let Ok(mut map) = self.entries.write() {
            map.clear();
        }
    }

    /// Drops expired entries.
    pub fn cleanup(&self) {
        if let Ok(mut map) = self.entries.write() {
            map.retain(|_, e| e.stored_at.elapsed() < self.ttl);
        }
    }

    fn lookup(&self, key: &CacheKey) -> Option<Vec<OhlcvBar>> {
        let map = self.entries.read().ok()?;
        map.get(key)
            .filter(|e| e.stored_at.elapsed() < self.ttl)
            .map(|e| e.bars.clone())
    }
}

impl<P: DataPort> DataPort for CachedDataAdapter<P> {
    fn fetch_prices(
        &self,
        symbol: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<OhlcvBar>, QuantEaseError> {
        let key = (symbol.to_string(), start_date, end_date);
        if let Some(bars) = self.lookup(&key) {
            tracing::trace!(symbol, "price cache hit");
            return Ok(bars);
        }

        let bars = self.inner.fetch_prices(symbol, start_date, end_date)?;
        if let Ok(mut map) = self.entries.write() {
            map.insert(
                key,
                CacheEntry {
                    bars: bars.clone(),
                    stored_at: Instant::now(),
                },
            );
        }
        Ok(bars)
    }

    fn list_symbols(&self) -> Result<Vec<String>, QuantEaseError> {
        self.inner.list_symbols()
    }
}
