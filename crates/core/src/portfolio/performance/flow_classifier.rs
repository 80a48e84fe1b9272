//! Flow classification for performance calculation.
//!
//! Only external flows (money crossing the portfolio boundary) adjust the
//! TWR denominators. Every flow takes part in XIRR, signed from the
//! investor's point of view.

use rust_decimal::Decimal;

use crate::activities::{CashFlow, CashFlowKind};

/// Flow type for performance calculation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowType {
    /// Money crossing the portfolio boundary: CONTRIBUTION, WITHDRAWAL.
    /// Adjusts the TWR sub-period starting value.
    External,

    /// Income and costs generated inside the portfolio: DIVIDEND, FEE.
    /// Already reflected in the valuations, so TWR ignores them.
    Internal,
}

pub fn classify_flow(kind: CashFlowKind) -> FlowType {
    match kind {
        CashFlowKind::Contribution | CashFlowKind::Withdrawal => FlowType::External,
        CashFlowKind::Dividend | CashFlowKind::Fee => FlowType::Internal,
    }
}

pub fn is_external_flow(flow: &CashFlow) -> bool {
    classify_flow(flow.kind) == FlowType::External
}

/// Signed contribution to the portfolio for a base-currency `amount`:
/// contributions add, withdrawals subtract, internal flows are zero.
pub fn net_contribution(kind: CashFlowKind, amount: Decimal) -> Decimal {
    match kind {
        CashFlowKind::Contribution => amount.abs(),
        CashFlowKind::Withdrawal => -amount.abs(),
        CashFlowKind::Dividend | CashFlowKind::Fee => Decimal::ZERO,
    }
}

/// Signed flow from the investor's side, as used by XIRR: money paid in
/// (contributions, fees) is negative, money received (withdrawals,
/// dividends) is positive.
pub fn investor_cash_flow(kind: CashFlowKind, amount: Decimal) -> Decimal {
    match kind {
        CashFlowKind::Contribution | CashFlowKind::Fee => -amount.abs(),
        CashFlowKind::Withdrawal | CashFlowKind::Dividend => amount.abs(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn create_test_flow(kind: CashFlowKind) -> CashFlow {
        CashFlow::new(
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            dec!(100),
            "USD",
            kind,
        )
    }

    #[test]
    fn test_contribution_is_external() {
        assert!(is_external_flow(&create_test_flow(CashFlowKind::Contribution)));
    }

    #[test]
    fn test_withdrawal_is_external() {
        assert!(is_external_flow(&create_test_flow(CashFlowKind::Withdrawal)));
    }

    #[test]
    fn test_dividend_is_internal() {
        assert_eq!(classify_flow(CashFlowKind::Dividend), FlowType::Internal);
    }

    #[test]
    fn test_fee_is_internal() {
        assert_eq!(classify_flow(CashFlowKind::Fee), FlowType::Internal);
    }

    #[test]
    fn test_net_contribution_signs() {
        assert_eq!(net_contribution(CashFlowKind::Contribution, dec!(50)), dec!(50));
        assert_eq!(net_contribution(CashFlowKind::Withdrawal, dec!(50)), dec!(-50));
        assert_eq!(net_contribution(CashFlowKind::Dividend, dec!(50)), Decimal::ZERO);
        assert_eq!(net_contribution(CashFlowKind::Fee, dec!(50)), Decimal::ZERO);
    }

    #[test]
    fn test_investor_cash_flow_signs() {
        assert_eq!(investor_cash_flow(CashFlowKind::Contribution, dec!(50)), dec!(-50));
        assert_eq!(investor_cash_flow(CashFlowKind::Fee, dec!(5)), dec!(-5));
        assert_eq!(investor_cash_flow(CashFlowKind::Withdrawal, dec!(50)), dec!(50));
        assert_eq!(investor_cash_flow(CashFlowKind::Dividend, dec!(-7)), dec!(7));
    }
}
