//! Tracing subscriber setup for the binary.

pub const LOG_ENV: &str = "QUANTEASE_LOG";

/// Installs the global subscriber. `QUANTEASE_LOG` overrides `log_level`;
/// `log_format` is `text` or `json`. Logs go to stderr so stdout stays
/// machine-readable.
pub fn init_tracing(log_level: &str, log_format: &str) -> Result<(), String> {
    let filter = std::env::var(LOG_ENV).unwrap_or_else(|_| log_level.to_string());
    let env_filter = tracing_subscriber::EnvFilter::try_new(filter)
        .map_err(|err| format!("invalid log filter: {err}"))?;

    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr);

    match log_format.trim().to_lowercase().as_str() {
        "json" => builder
            .json()
            .try_init()
            .map_err(|err| format!("failed to install subscriber: {err}")),
        "text" | "" => builder
            .try_init()
            .map_err(|err| format!("failed to install subscriber: {err}")),
        other => Err(format!("unknown log format '{other}' (expected text or json)")),
    }
}
