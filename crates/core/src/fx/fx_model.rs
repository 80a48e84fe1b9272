use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::fx_errors::FxError;

/// One observed rate: `1 from_currency = rate to_currency` on `date`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ExchangeRate {
    pub from_currency: String,
    pub to_currency: String,
    pub date: NaiveDate,
    pub rate: Decimal,
}

impl ExchangeRate {
    pub fn new(from: &str, to: &str, date: NaiveDate, rate: Decimal) -> Self {
        Self {
            from_currency: from.to_string(),
            to_currency: to.to_string(),
            date,
            rate,
        }
    }
}

/// Upper-cases and validates an ISO-4217 style code (three ASCII letters).
pub fn normalize_currency_code(code: &str) -> Result<String, FxError> {
    let trimmed = code.trim();
    if trimmed.len() == 3 && trimmed.chars().all(|c| c.is_ascii_alphabetic()) {
        Ok(trimmed.to_ascii_uppercase())
    } else {
        Err(FxError::InvalidCurrencyCode(code.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_currency_code() {
        assert_eq!(normalize_currency_code(" gbp ").unwrap(), "GBP");
        assert_eq!(normalize_currency_code("USD").unwrap(), "USD");
    }

    #[test]
    fn test_normalize_currency_code_rejects_garbage() {
        assert!(normalize_currency_code("G1P").is_err());
        assert!(normalize_currency_code("EURO").is_err());
        assert!(normalize_currency_code("").is_err());
    }
}
