//! CSV file data adapter.
//!
//! One file per symbol at `<base_path>/<symbol><suffix>.csv` with a header
//! row. Columns are found by name (case-insensitive); only `Date` and
//! `Close` are required.

use crate::domain::error::QuantEaseError;
use crate::domain::ohlcv::OhlcvBar;
use crate::ports::data_port::DataPort;
use chrono::NaiveDate;
use csv::StringRecord;
use std::fs;
use std::path::PathBuf;

pub const DEFAULT_SYMBOL_SUFFIX: &str = "_NS";

pub struct CsvAdapter {
    base_path: PathBuf,
    suffix: String,
}

struct Columns {
    date: usize,
    open: Option<usize>,
    high: Option<usize>,
    low: Option<usize>,
    close: usize,
    volume: Option<usize>,
}

impl Columns {
    fn locate(headers: &StringRecord, path: &str) -> Result<Self, QuantEaseError> {
        let find = |name: &str| {
            headers
                .iter()
                .position(|h| h.trim().eq_ignore_ascii_case(name))
        };
        let required = |name: &str| {
            find(name).ok_or_else(|| {
                QuantEaseError::validation(format!("{path}: missing required column '{name}'"))
            })
        };

        Ok(Columns {
            date: required("Date")?,
            open: find("Open"),
            high: find("High"),
            low: find("Low"),
            close: required("Close")?,
            volume: find("Volume"),
        })
    }
}

impl CsvAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self::with_suffix(base_path, DEFAULT_SYMBOL_SUFFIX)
    }

    pub fn with_suffix(base_path: PathBuf, suffix: &str) -> Self {
        Self {
            base_path,
            suffix: suffix.to_string(),
        }
    }

    /// Appends the suffix unless already present. Case is kept as given.
    pub fn resolve_symbol(&self, symbol: &str) -> String {
        let symbol = symbol.trim();
        if symbol.ends_with(&self.suffix) {
            symbol.to_string()
        } else {
            format!("{}{}", symbol, self.suffix)
        }
    }

    fn csv_path(&self, resolved: &str) -> PathBuf {
        self.base_path.join(format!("{}.csv", resolved))
    }
}

fn parse_date(raw: &str) -> Result<NaiveDate, QuantEaseError> {
    // accepts "2024-01-15", "2024-01-15 00:00:00+05:30" and ISO "T" forms
    let day = raw.trim().split([' ', 'T']).next().unwrap_or_default();
    NaiveDate::parse_from_str(day, "%Y-%m-%d").map_err(|e| QuantEaseError::Data {
        reason: format!("invalid date '{}': {}", raw, e),
    })
}

/// Empty cells read as NaN so that series validation can report them.
fn parse_price(record: &StringRecord, idx: Option<usize>, name: &str) -> Result<f64, QuantEaseError> {
    let Some(raw) = idx.and_then(|i| record.get(i)).map(str::trim) else {
        return Ok(f64::NAN);
    };
    if raw.is_empty() || raw.eq_ignore_ascii_case("nan") {
        return Ok(f64::NAN);
    }
    raw.parse().map_err(|e| QuantEaseError::Data {
        reason: format!("invalid {} value '{}': {}", name, raw, e),
    })
}

fn parse_volume(record: &StringRecord, idx: Option<usize>) -> Result<i64, QuantEaseError> {
    let raw = idx.and_then(|i| record.get(i)).map(str::trim).unwrap_or("");
    if raw.is_empty() {
        return Ok(0);
    }
    // some exports write volume as a float
    raw.parse::<i64>()
        .or_else(|_| raw.parse::<f64>().map(|v| v as i64))
        .map_err(|e| QuantEaseError::Data {
            reason: format!("invalid volume value '{}': {}", raw, e),
        })
}

impl DataPort for CsvAdapter {
    fn fetch_prices(
        &self,
        symbol: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<OhlcvBar>, QuantEaseError> {
        let resolved = self.resolve_symbol(symbol);
        let path = self.csv_path(&resolved);
        if !path.is_file() {
            return Err(QuantEaseError::NotFound { symbol: resolved });
        }

        let content = fs::read_to_string(&path)?;
        let display = path.display().to_string();

        let mut rdr = csv::Reader::from_reader(content.as_bytes());
        let headers = rdr.headers().map_err(|e| QuantEaseError::Data {
            reason: format!("{}: CSV header error: {}", display, e),
        })?;
        let cols = Columns::locate(headers, &display)?;

        let mut bars = Vec::new();
        for result in rdr.records() {
            let record = result.map_err(|e| QuantEaseError::Data {
                reason: format!("{}: CSV parse error: {}", display, e),
            })?;

            let date = parse_date(record.get(cols.date).unwrap_or_default())?;
            if date < start_date || date > end_date {
                continue;
            }

            let close = parse_price(&record, Some(cols.close), "close")?;
            let open = parse_price(&record, cols.open, "open")?;
            let high = parse_price(&record, cols.high, "high")?;
            let low = parse_price(&record, cols.low, "low")?;

            bars.push(OhlcvBar {
                date,
                open: if cols.open.is_some() { open } else { close },
                high: if cols.high.is_some() { high } else { close },
                low: if cols.low.is_some() { low } else { close },
                close,
                volume: parse_volume(&record, cols.volume)?,
            });
        }

        if bars.is_empty() {
            return Err(QuantEaseError::EmptyRange {
                symbol: resolved,
                start: start_date,
                end: end_date,
            });
        }

        bars.sort_by_key(|b| b.date);
        if let Some(pair) = bars.windows(2).find(|w| w[0].date == w[1].date) {
            return Err(QuantEaseError::Data {
                reason: format!("{}: duplicate date {}", display, pair[0].date),
            });
        }

        tracing::debug!(symbol = %resolved, rows = bars.len(), "loaded price history");
        Ok(bars)
    }

    fn list_symbols(&self) -> Result<Vec<String>, QuantEaseError> {
        let entries = fs::read_dir(&self.base_path)?;

        let suffix = format!("{}.csv", self.suffix);
        let mut symbols = Vec::new();

        for entry in entries {
            let name = entry?.file_name();
            let name_str = name.to_string_lossy();

            if let Some(code) = name_str.strip_suffix(&suffix) {
                if !code.is_empty() {
                    symbols.push(code.to_string());
                }
            }
        }

        symbols.sort();
        Ok(symbols)
    }
}
