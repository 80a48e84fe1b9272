use std::path::PathBuf;

use chrono::NaiveDate;
use clap::Parser;
use rust_decimal::Decimal;

/// Computes TWR, XIRR and holding summaries from an ETF ledger file.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to the JSON ledger (cash flows, trades, valuations, rates).
    pub ledger: PathBuf,

    /// Currency every amount is normalized into (overrides the ledger and env).
    #[arg(long)]
    pub base_currency: Option<String>,

    /// Date treated as "now" (format: YYYY-MM-DD).
    #[arg(long)]
    pub as_of: Option<NaiveDate>,

    /// Also summarize this ETF position.
    #[arg(long, requires = "price")]
    pub symbol: Option<String>,

    /// Current price of `--symbol`.
    #[arg(long)]
    pub price: Option<Decimal>,

    /// Currency of `--price`; defaults to the base currency.
    #[arg(long)]
    pub price_currency: Option<String>,

    /// Pretty-print the JSON output.
    #[arg(long)]
    pub pretty: bool,
}
