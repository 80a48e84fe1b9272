use std::ffi::OsString;

use anyhow::Context;
use clap::Parser;
use etf_curator_core::{EtfPerformance, Ledger, PerformanceMetrics};
use serde::Serialize;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::cli::Cli;
use crate::config::Config;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub performance: PerformanceMetrics,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub holding: Option<EtfPerformance>,
}

pub fn init_tracing(log_format: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    if log_format.eq_ignore_ascii_case("json") {
        registry
            .with(
                fmt::layer()
                    .json()
                    .with_current_span(false)
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        registry
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_line_number(true)
                    .with_writer(std::io::stderr),
            )
            .init();
    }
}

/// Parses the command line, then loads config. Usage errors and `--help`
/// never depend on the environment.
pub fn load_args_and_config<I, T, F>(argv: I, load_config: F) -> anyhow::Result<(Cli, Config)>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
    F: FnOnce() -> anyhow::Result<Config>,
{
    let args = Cli::try_parse_from(argv)?;
    let config = load_config()?;
    Ok((args, config))
}

pub fn build_report(args: &Cli, config: &Config) -> anyhow::Result<Report> {
    let ledger = Ledger::from_path(&args.ledger)
        .with_context(|| format!("Failed to load ledger {}", args.ledger.display()))?;

    let base_currency = ledger.resolve_base_currency(
        args.base_currency.as_deref(),
        &config.base_currency,
    )?;
    let mut calculator = ledger.calculator(&base_currency);
    if let Some(as_of) = args.as_of.or(config.as_of) {
        calculator = calculator.with_as_of(as_of);
    }
    tracing::info!(
        "Calculating performance in {} as of {}",
        calculator.base_currency(),
        calculator.as_of()
    );

    let performance = calculator.calculate_complete_performance(
        &ledger.trades,
        &ledger.cash_flows,
        &ledger.valuations,
    );
    for warning in &performance.warnings {
        tracing::warn!("{}", warning);
    }

    let holding = match (&args.symbol, args.price) {
        (Some(symbol), Some(price)) => {
            let price_currency = args
                .price_currency
                .as_deref()
                .unwrap_or(calculator.base_currency());
            Some(calculator.calculate_etf_performance(
                symbol,
                &ledger.trades,
                &ledger.cash_flows,
                price,
                price_currency,
            ))
        }
        (Some(symbol), None) => anyhow::bail!("--price is required to summarize {}", symbol),
        _ => None,
    };

    Ok(Report {
        performance,
        holding,
    })
}

pub fn render(report: &Report, pretty: bool) -> anyhow::Result<String> {
    let json = if pretty {
        serde_json::to_string_pretty(report)?
    } else {
        serde_json::to_string(report)?
    };
    Ok(json)
}
