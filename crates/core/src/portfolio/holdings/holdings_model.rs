use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::portfolio::performance::ComputationWarning;

/// Per-ETF summary, amounts in `base_currency`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EtfPerformance {
    pub symbol: String,
    pub total_shares: Decimal,
    /// Remaining cost basis of the open position.
    pub total_invested: Decimal,
    pub average_cost: Decimal,
    /// Current price converted to the base currency.
    pub current_price: Decimal,
    pub current_value: Decimal,
    pub unrealized_pnl: Decimal,
    pub unrealized_pnl_percent: Decimal,
    pub realized_pnl: Decimal,
    pub total_dividends: Decimal,
    pub base_currency: String,
    #[serde(default)]
    pub warnings: Vec<ComputationWarning>,
}
