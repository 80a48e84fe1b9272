//! Ledger entry models: external cash flows and ETF trades.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// What a cash flow represents for the investor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CashFlowKind {
    /// New money paid into the portfolio.
    Contribution,
    /// Money taken out of the portfolio.
    Withdrawal,
    /// Income paid out by a holding.
    Dividend,
    /// Platform or management fee paid by the investor.
    Fee,
}

impl CashFlowKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            CashFlowKind::Contribution => "CONTRIBUTION",
            CashFlowKind::Withdrawal => "WITHDRAWAL",
            CashFlowKind::Dividend => "DIVIDEND",
            CashFlowKind::Fee => "FEE",
        }
    }
}

impl fmt::Display for CashFlowKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A dated movement of money between the investor and the portfolio.
///
/// `amount` is a magnitude; the direction comes from `kind`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CashFlow {
    pub date: NaiveDate,
    pub amount: Decimal,
    pub currency: String,
    pub kind: CashFlowKind,
    /// Instrument the flow belongs to, e.g. the ETF that paid a dividend.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub symbol: Option<String>,
}

impl CashFlow {
    pub fn new(date: NaiveDate, amount: Decimal, currency: &str, kind: CashFlowKind) -> Self {
        Self {
            date,
            amount,
            currency: currency.to_string(),
            kind,
            symbol: None,
        }
    }

    pub fn with_symbol(mut self, symbol: &str) -> Self {
        self.symbol = Some(symbol.to_string());
        self
    }

    /// Absolute size of the flow. Negative recorded amounts are tolerated.
    pub fn magnitude(&self) -> Decimal {
        self.amount.abs()
    }

    pub fn is_for_symbol(&self, symbol: &str) -> bool {
        self.symbol
            .as_deref()
            .is_some_and(|s| s.eq_ignore_ascii_case(symbol))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TradeSide {
    Buy,
    Sell,
}

/// A buy or sell of ETF units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Trade {
    pub symbol: String,
    pub date: NaiveDate,
    pub side: TradeSide,
    pub quantity: Decimal,
    pub price: Decimal,
    pub currency: String,
    #[serde(default)]
    pub fee: Decimal,
}

impl Trade {
    pub fn buy(symbol: &str, date: NaiveDate, quantity: Decimal, price: Decimal, currency: &str) -> Self {
        Self {
            symbol: symbol.to_string(),
            date,
            side: TradeSide::Buy,
            quantity,
            price,
            currency: currency.to_string(),
            fee: Decimal::ZERO,
        }
    }

    pub fn sell(symbol: &str, date: NaiveDate, quantity: Decimal, price: Decimal, currency: &str) -> Self {
        Self {
            side: TradeSide::Sell,
            ..Self::buy(symbol, date, quantity, price, currency)
        }
    }

    pub fn with_fee(mut self, fee: Decimal) -> Self {
        self.fee = fee;
        self
    }

    /// Gross trade value in the trade currency, excluding fees.
    /// `None` when the product leaves the decimal range.
    pub fn gross_amount(&self) -> Option<Decimal> {
        self.quantity.abs().checked_mul(self.price)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_cash_flow_deserializes_from_ledger_json() {
        let json = r#"{
            "date": "2024-03-15",
            "amount": 12.5,
            "currency": "EUR",
            "kind": "DIVIDEND",
            "symbol": "VWCE"
        }"#;
        let flow: CashFlow = serde_json::from_str(json).unwrap();
        assert_eq!(flow.kind, CashFlowKind::Dividend);
        assert_eq!(flow.amount, dec!(12.5));
        assert!(flow.is_for_symbol("vwce"));
    }

    #[test]
    fn test_negative_amount_is_taken_as_magnitude() {
        let flow = CashFlow::new(date(2024, 1, 1), dec!(-250), "USD", CashFlowKind::Withdrawal);
        assert_eq!(flow.magnitude(), dec!(250));
    }

    #[test]
    fn test_trade_fee_defaults_to_zero() {
        let json = r#"{
            "symbol": "SPY",
            "date": "2024-01-02",
            "side": "SELL",
            "quantity": 3,
            "price": 470.1,
            "currency": "USD"
        }"#;
        let trade: Trade = serde_json::from_str(json).unwrap();
        assert_eq!(trade.side, TradeSide::Sell);
        assert_eq!(trade.fee, Decimal::ZERO);
        assert_eq!(trade.gross_amount(), Some(dec!(1410.3)));
    }

    #[test]
    fn test_untagged_flow_matches_no_symbol() {
        let flow = CashFlow::new(date(2024, 1, 1), dec!(10), "USD", CashFlowKind::Dividend);
        assert!(!flow.is_for_symbol("SPY"));
        assert_eq!(flow.kind.to_string(), "DIVIDEND");
    }
}
