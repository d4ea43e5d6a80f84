//! CLI definition and dispatch.

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;

use crate::adapters::cached_data_adapter::CachedDataAdapter;
use crate::adapters::csv_adapter::{CsvAdapter, DEFAULT_SYMBOL_SUFFIX};
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::json_report_adapter::JsonReportAdapter;
use crate::domain::backtest::{
    run_backtest, run_batch_compiled, BacktestConfig, BacktestResult, BatchResults,
};
use crate::domain::config_validation::{
    read_date_range, read_double, read_symbols, validate_app_config, validate_symbols,
    DEFAULT_CACHE_TTL_SECS, DEFAULT_INITIAL_CAPITAL, DEFAULT_POSITION_FRACTION,
};
use crate::domain::demo_data::{demo_series, DEMO_POINTS, DEMO_SEED};
use crate::domain::error::QuantEaseError;
use crate::domain::ohlcv::OhlcvBar;
use crate::domain::risk::classify;
use crate::domain::strategy::{compile, StrategyConfig};
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::DataPort;
use crate::ports::report_port::ReportPort;

pub const DEFAULT_STOCK_DATA_PATH: &str = "./stock_data";

#[derive(Parser, Debug)]
#[command(name = "quantease", about = "Strategy compiler and vectorized backtester")]
pub struct Cli {
    /// Log filter (overridden by QUANTEASE_LOG)
    #[arg(long, global = true, default_value = "info")]
    pub log_level: String,
    /// Log output format: text or json
    #[arg(long, global = true, default_value = "text")]
    pub log_format: String,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run a backtest over CSV price history
    Backtest {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(short, long)]
        strategy: PathBuf,
        #[arg(long)]
        symbol: Option<String>,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Compile a strategy file and print the chosen family
    Validate {
        #[arg(short, long)]
        strategy: PathBuf,
    },
    /// Classify risk from summary statistics
    Risk {
        #[arg(long, allow_negative_numbers = true)]
        sharpe: f64,
        #[arg(long, allow_negative_numbers = true)]
        max_drawdown: f64,
        #[arg(long)]
        volatility: f64,
    },
    /// Run a strategy over a seeded synthetic series
    Demo {
        #[arg(short, long)]
        strategy: PathBuf,
        #[arg(long, default_value_t = DEMO_SEED)]
        seed: u64,
        #[arg(long, default_value_t = DEMO_POINTS)]
        points: usize,
        /// Date of the last synthetic bar
        #[arg(long, default_value = "2024-12-31")]
        end: NaiveDate,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// List symbols with CSV history under the configured data path
    ListSymbols {
        #[arg(short, long)]
        config: PathBuf,
    },
}

/// Everything the backtest command reads from the application config.
#[derive(Debug, Clone)]
pub struct RunSettings {
    pub stock_data_path: PathBuf,
    pub symbol_suffix: String,
    pub cache_ttl: Duration,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub symbols: Vec<String>,
    pub demo_fallback: bool,
    pub output_path: Option<PathBuf>,
    pub backtest: BacktestConfig,
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Backtest {
            config,
            strategy,
            symbol,
            output,
        } => run_backtest_command(&config, &strategy, symbol.as_deref(), output.as_ref()),
        Command::Validate { strategy } => run_validate(&strategy),
        Command::Risk {
            sharpe,
            max_drawdown,
            volatility,
        } => run_risk(sharpe, max_drawdown, volatility),
        Command::Demo {
            strategy,
            seed,
            points,
            end,
            output,
        } => run_demo(&strategy, seed, points, end, output.as_ref()),
        Command::ListSymbols { config } => run_list_symbols(&config),
    }
}

pub fn load_config(path: &Path) -> Result<FileConfigAdapter, ExitCode> {
    FileConfigAdapter::from_file(path).map_err(|err| {
        eprintln!("error: {err}");
        ExitCode::from(&err)
    })
}

/// Reads and parses a strategy JSON file. Compilation is left to the caller.
pub fn load_strategy(path: &Path) -> Result<StrategyConfig, QuantEaseError> {
    let text = fs::read_to_string(path)?;
    StrategyConfig::from_json(&text)
}

pub fn build_backtest_config(adapter: &dyn ConfigPort) -> Result<BacktestConfig, QuantEaseError> {
    Ok(BacktestConfig {
        initial_capital: read_double(
            adapter,
            "backtest",
            "initial_capital",
            DEFAULT_INITIAL_CAPITAL,
        )?,
        position_fraction: read_double(
            adapter,
            "backtest",
            "position_fraction",
            DEFAULT_POSITION_FRACTION,
        )?,
    })
}

/// Validates the application config and collects the settings the
/// backtest command needs. `symbol_override` replaces the configured
/// symbols before the list is checked.
pub fn build_run_settings(
    adapter: &dyn ConfigPort,
    symbol_override: Option<&str>,
) -> Result<RunSettings, QuantEaseError> {
    validate_app_config(adapter)?;
    let symbols = resolve_symbols(symbol_override, adapter);
    validate_symbols(&symbols)?;
    let (start_date, end_date) = read_date_range(adapter)?;
    let ttl_secs = adapter.get_int("data", "cache_ttl_secs", DEFAULT_CACHE_TTL_SECS);

    Ok(RunSettings {
        stock_data_path: adapter
            .get_string("data", "stock_data_path")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_STOCK_DATA_PATH)),
        symbol_suffix: adapter
            .get_string("data", "symbol_suffix")
            .unwrap_or_else(|| DEFAULT_SYMBOL_SUFFIX.to_string()),
        cache_ttl: Duration::from_secs(ttl_secs.max(0) as u64),
        start_date,
        end_date,
        symbols,
        demo_fallback: adapter.get_bool("backtest", "demo_fallback", true),
        output_path: adapter.get_string("report", "output_path").map(PathBuf::from),
        backtest: build_backtest_config(adapter)?,
    })
}

/// A `--symbol` override (comma separated) replaces the configured list.
pub fn resolve_symbols(symbol_override: Option<&str>, config: &dyn ConfigPort) -> Vec<String> {
    match symbol_override {
        Some(raw) => raw
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect(),
        None => read_symbols(config),
    }
}

/// Fetches price history, substituting the seeded demo series when the
/// symbol has no history at all and `demo_fallback` is set.
pub fn fetch_or_demo(
    port: &dyn DataPort,
    symbol: &str,
    start_date: NaiveDate,
    end_date: NaiveDate,
    demo_fallback: bool,
) -> Result<Vec<OhlcvBar>, QuantEaseError> {
    match port.fetch_prices(symbol, start_date, end_date) {
        Err(QuantEaseError::NotFound { symbol: resolved }) if demo_fallback => {
            tracing::warn!(symbol = %resolved, "no price history, using demo series");
            eprintln!("warning: no price history for {resolved}, using demo data");
            Ok(demo_series(DEMO_SEED, DEMO_POINTS, end_date))
        }
        other => other,
    }
}

/// Runs the configured symbols through one compiled strategy.
///
/// A bad strategy fails before any data is fetched. Per-symbol failures are
/// returned in place, in the order of `settings.symbols`.
pub fn execute_backtest(
    settings: &RunSettings,
    strategy: &StrategyConfig,
    port: &dyn DataPort,
) -> Result<BatchResults, QuantEaseError> {
    let compiled = compile(strategy)?;
    tracing::info!(family = %compiled.family, symbols = settings.symbols.len(), "strategy compiled");

    let mut fetched = Vec::with_capacity(settings.symbols.len());
    let mut failures = Vec::new();
    for symbol in &settings.symbols {
        match fetch_or_demo(
            port,
            symbol,
            settings.start_date,
            settings.end_date,
            settings.demo_fallback,
        ) {
            Ok(bars) => fetched.push((symbol.clone(), bars)),
            Err(err) => failures.push((symbol.clone(), Err(err))),
        }
    }

    let mut results = run_batch_compiled(&fetched, &compiled, &settings.backtest);
    results.extend(failures);
    results.sort_by_key(|(symbol, _)| {
        settings
            .symbols
            .iter()
            .position(|s| s == symbol)
            .unwrap_or(usize::MAX)
    });
    Ok(results)
}

/// Per-symbol report file. A single symbol writes to `base` as given.
pub fn report_path(base: &Path, symbol: &str, multiple: bool) -> PathBuf {
    if !multiple {
        return base.to_path_buf();
    }
    let stem = base
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "report".to_string());
    let file_name = match base.extension() {
        Some(ext) => format!("{stem}_{symbol}.{}", ext.to_string_lossy()),
        None => format!("{stem}_{symbol}"),
    };
    base.with_file_name(file_name)
}

fn run_backtest_command(
    config_path: &Path,
    strategy_path: &Path,
    symbol_override: Option<&str>,
    output_override: Option<&PathBuf>,
) -> ExitCode {
    // Stage 1: Load config
    eprintln!("Loading config from {}", config_path.display());
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    // Stage 2: Validate and build settings
    let settings = match build_run_settings(&adapter, symbol_override) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    // Stage 3: Load strategy
    eprintln!("Loading strategy from {}", strategy_path.display());
    let strategy = match load_strategy(strategy_path) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    // Stage 4: Fetch and run
    let data_port = CachedDataAdapter::new(
        CsvAdapter::with_suffix(settings.stock_data_path.clone(), &settings.symbol_suffix),
        settings.cache_ttl,
    );
    eprintln!(
        "Running backtest: {} symbols, {} to {}",
        settings.symbols.len(),
        settings.start_date,
        settings.end_date,
    );
    let results = match execute_backtest(&settings, &strategy, &data_port) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    // Stage 5: Summaries and reports
    let output = output_override.cloned().or(settings.output_path.clone());
    let multiple = results.len() > 1;
    let reporter = JsonReportAdapter::new();
    let mut exit = ExitCode::SUCCESS;
    let mut failed = false;

    for (symbol, result) in &results {
        let result = match result {
            Ok(r) => r,
            Err(e) => {
                eprintln!("error: {symbol}: {e}");
                if !failed {
                    exit = e.into();
                    failed = true;
                }
                continue;
            }
        };

        print_summary(symbol, result);

        if let Some(base) = &output {
            let path = report_path(base, symbol, multiple);
            if let Err(e) = reporter.write(symbol, result, &path.to_string_lossy()) {
                eprintln!("error: failed to write report: {e}");
                if !failed {
                    exit = (&e).into();
                    failed = true;
                }
                continue;
            }
            eprintln!("Report written to: {}", path.display());
        }
    }

    exit
}

fn print_summary(symbol: &str, result: &BacktestResult) {
    let m = &result.metrics;
    let risk = result.risk_report();

    println!("\n=== {symbol} ({}) ===", result.family);
    println!("Total Return:     {:.2}%", m.total_return * 100.0);
    println!("CAGR:             {:.2}%", m.cagr * 100.0);
    println!("Sharpe Ratio:     {:.2}", m.sharpe);
    println!("Max Drawdown:     {:.1}%", m.max_drawdown * 100.0);
    println!("Volatility:       {:.1}%", m.volatility * 100.0);
    println!("Total Trades:     {}", m.trades);
    println!("Win Rate:         {:.1}%", m.win_rate * 100.0);
    println!("Profit Factor:    {:.2}", m.profit_factor);
    println!("Final Value:      {:.2}", m.final_value);
    println!("Risk Level:       {}", risk.risk_level);
    for line in &risk.recommendations {
        println!("  - {line}");
    }
}

fn run_validate(strategy_path: &Path) -> ExitCode {
    let strategy = match load_strategy(strategy_path) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    let compiled = match compile(&strategy) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    println!("Indicators:");
    if compiled.specs.is_empty() {
        println!("  (none)");
    }
    for spec in &compiled.specs {
        println!("  {spec}");
    }
    println!("Strategy family: {}", compiled.family);
    println!("\nStrategy configuration is valid.");
    ExitCode::SUCCESS
}

fn run_risk(sharpe: f64, max_drawdown: f64, volatility: f64) -> ExitCode {
    let report = classify(sharpe, max_drawdown, volatility);
    match serde_json::to_string_pretty(&report) {
        Ok(json) => {
            println!("{json}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            let err = QuantEaseError::from(e);
            eprintln!("error: {err}");
            (&err).into()
        }
    }
}

fn run_demo(
    strategy_path: &Path,
    seed: u64,
    points: usize,
    end: NaiveDate,
    output: Option<&PathBuf>,
) -> ExitCode {
    let strategy = match load_strategy(strategy_path) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    eprintln!("Generating {points} demo bars (seed {seed})");
    let bars = demo_series(seed, points, end);
    let result = match run_backtest(&bars, &strategy, &BacktestConfig::default()) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    print_summary("DEMO", &result);

    if let Some(path) = output {
        if let Err(e) = JsonReportAdapter::new().write("DEMO", &result, &path.to_string_lossy()) {
            eprintln!("error: failed to write report: {e}");
            return (&e).into();
        }
        eprintln!("Report written to: {}", path.display());
    }
    ExitCode::SUCCESS
}

fn run_list_symbols(config_path: &Path) -> ExitCode {
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };
    let settings_path = adapter
        .get_string("data", "stock_data_path")
        .unwrap_or_else(|| DEFAULT_STOCK_DATA_PATH.to_string());
    let suffix = adapter
        .get_string("data", "symbol_suffix")
        .unwrap_or_else(|| DEFAULT_SYMBOL_SUFFIX.to_string());

    let port = CsvAdapter::with_suffix(PathBuf::from(settings_path), &suffix);
    match port.list_symbols() {
        Ok(symbols) => {
            for symbol in &symbols {
                println!("{symbol}");
            }
            eprintln!("{} symbols", symbols.len());
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}
