//! INI file configuration adapter.

use crate::domain::error::QuantEaseError;
use crate::ports::config_port::ConfigPort;
use configparser::ini::Ini;
use std::path::Path;

pub struct FileConfigAdapter {
    config: Ini,
}

impl FileConfigAdapter {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, QuantEaseError> {
        let path = path.as_ref();
        let mut config = Ini::new();
        config
            .load(path)
            .map_err(|reason| QuantEaseError::ConfigParse {
                file: path.display().to_string(),
                reason,
            })?;
        Ok(Self { config })
    }

    pub fn from_string(content: &str) -> Result<Self, QuantEaseError> {
        let mut config = Ini::new();
        config
            .read(content.to_string())
            .map_err(|reason| QuantEaseError::ConfigParse {
                file: "<string>".to_string(),
                reason,
            })?;
        Ok(Self { config })
    }

    /// Parses a present value, warning and returning `None` when it does not
    /// parse so the caller's default applies.
    fn typed<T>(&self, section: &str, key: &str, parse: impl Fn(&str) -> Option<T>) -> Option<T> {
        let raw = self.config.get(section, key)?;
        let parsed = parse(raw.trim());
        if parsed.is_none() {
            tracing::warn!(section, key, value = %raw, "unparsable config value, using default");
        }
        parsed
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Some(true),
        "false" | "no" | "off" | "0" => Some(false),
        _ => None,
    }
}

impl ConfigPort for FileConfigAdapter {
    fn get_string(&self, section: &str, key: &str) -> Option<String> {
        self.config.get(section, key)
    }

    fn get_int(&self, section: &str, key: &str, default: i64) -> i64 {
        self.typed(section, key, |v| v.parse().ok()).unwrap_or(default)
    }

    fn get_double(&self, section: &str, key: &str, default: f64) -> f64 {
        self.typed(section, key, |v| v.parse::<f64>().ok().filter(|x| x.is_finite()))
            .unwrap_or(default)
    }

    fn get_bool(&self, section: &str, key: &str, default: bool) -> bool {
        self.typed(section, key, parse_bool).unwrap_or(default)
    }
}
