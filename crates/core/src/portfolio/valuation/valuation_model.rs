//! Portfolio valuation domain models.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Mark-to-market snapshot of the whole portfolio on one date.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioValuation {
    pub date: NaiveDate,
    pub value: Decimal,
    pub currency: String,
}

impl PortfolioValuation {
    pub fn new(date: NaiveDate, value: Decimal, currency: &str) -> Self {
        Self {
            date,
            value,
            currency: currency.to_string(),
        }
    }
}
