//! JSON ledger documents: everything the calculator needs in one file.

use std::fs;
use std::path::Path;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::activities::{CashFlow, Trade};
use crate::errors::{Result, ValidationError};
use crate::fx::{normalize_currency_code, ExchangeRate, ExchangeRateTable};
use crate::portfolio::{PortfolioValuation, ReturnCalculator};

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Ledger {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_currency: Option<String>,
    #[serde(default)]
    pub cash_flows: Vec<CashFlow>,
    #[serde(default)]
    pub trades: Vec<Trade>,
    #[serde(default)]
    pub valuations: Vec<PortfolioValuation>,
    #[serde(default)]
    pub exchange_rates: Vec<ExchangeRate>,
}

impl Ledger {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let ledger: Ledger = serde_json::from_str(json)?;
        debug!(
            "Loaded ledger: {} cash flows, {} trades, {} valuations, {} rates",
            ledger.cash_flows.len(),
            ledger.trades.len(),
            ledger.valuations.len(),
            ledger.exchange_rates.len()
        );
        Ok(ledger)
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&contents)
    }

    /// Resolves the base currency: an explicit override wins, then the
    /// ledger's own, then `default`.
    pub fn resolve_base_currency(&self, override_currency: Option<&str>, default: &str) -> Result<String> {
        let candidate = override_currency
            .or(self.base_currency.as_deref())
            .unwrap_or(default);
        normalize_currency_code(candidate).map_err(|e| {
            ValidationError::InvalidInput(format!("base currency: {}", e)).into()
        })
    }

    /// Builds a calculator over this ledger's exchange rates.
    pub fn calculator(&self, base_currency: &str) -> ReturnCalculator {
        ReturnCalculator::new(
            base_currency,
            ExchangeRateTable::new(self.exchange_rates.clone()),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::activities::CashFlowKind;
    use crate::errors::Error;
    use rust_decimal_macros::dec;
    use std::io::Write;

    const SAMPLE: &str = r#"{
        "baseCurrency": "eur",
        "cashFlows": [
            { "date": "2024-01-02", "amount": 1000, "currency": "EUR", "kind": "CONTRIBUTION" }
        ],
        "valuations": [
            { "date": "2024-01-02", "value": 1000, "currency": "EUR" },
            { "date": "2024-02-01", "value": 1030, "currency": "EUR" }
        ],
        "exchangeRates": [
            { "fromCurrency": "USD", "toCurrency": "EUR", "date": "2024-01-02", "rate": 0.91 }
        ]
    }"#;

    #[test]
    fn test_parses_ledger_with_missing_sections() {
        let ledger = Ledger::from_json_str(SAMPLE).unwrap();
        assert_eq!(ledger.cash_flows.len(), 1);
        assert_eq!(ledger.cash_flows[0].kind, CashFlowKind::Contribution);
        assert!(ledger.trades.is_empty());
        assert_eq!(ledger.valuations[1].value, dec!(1030));
        assert_eq!(ledger.exchange_rates[0].rate, dec!(0.91));
    }

    #[test]
    fn test_base_currency_resolution_order() {
        let ledger = Ledger::from_json_str(SAMPLE).unwrap();
        assert_eq!(ledger.resolve_base_currency(None, "USD").unwrap(), "EUR");
        assert_eq!(ledger.resolve_base_currency(Some("gbp"), "USD").unwrap(), "GBP");
        assert_eq!(Ledger::default().resolve_base_currency(None, "USD").unwrap(), "USD");
        assert!(matches!(
            ledger.resolve_base_currency(Some("EURO"), "USD"),
            Err(Error::Validation(_))
        ));
    }

    #[test]
    fn test_loads_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();

        let ledger = Ledger::from_path(file.path()).unwrap();
        let calculator = ledger.calculator("EUR");
        assert_eq!(
            calculator.convert_to_base_currency(dec!(100), "USD", ledger.valuations[0].date),
            dec!(91)
        );
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = Ledger::from_path(dir.path().join("missing.json"));
        assert!(matches!(result, Err(Error::Io(_))));
    }

    #[test]
    fn test_malformed_json_is_serialization_error() {
        let result = Ledger::from_json_str("{ \"cashFlows\": [ { \"kind\": \"GIFT\" } ] }");
        assert!(matches!(result, Err(Error::Serialization(_))));
    }
}
