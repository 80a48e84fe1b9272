//! Average-cost position accounting.
//!
//! A sell removes cost basis in proportion to the share of the position
//! sold, so the average cost of the remaining units never changes on a
//! sell. FIFO/LIFO lot matching is not used.

use chrono::NaiveDate;
use log::warn;
use rust_decimal::Decimal;

use crate::constants::QUANTITY_THRESHOLD;
use crate::portfolio::performance::ComputationWarning;

#[derive(Debug, Clone, PartialEq)]
pub struct AverageCostPosition {
    pub symbol: String,
    pub shares: Decimal,
    /// Remaining cost basis, fees on buys included.
    pub invested: Decimal,
    pub realized_pnl: Decimal,
}

impl AverageCostPosition {
    pub fn new(symbol: &str) -> Self {
        Self {
            symbol: symbol.to_string(),
            shares: Decimal::ZERO,
            invested: Decimal::ZERO,
            realized_pnl: Decimal::ZERO,
        }
    }

    /// Adds `quantity` units acquired for `cost` (base currency, fees included).
    ///
    /// A buy that would push shares or cost basis out of the decimal range
    /// is left out and reported.
    pub fn buy(
        &mut self,
        date: NaiveDate,
        quantity: Decimal,
        cost: Decimal,
        warnings: &mut Vec<ComputationWarning>,
    ) {
        match (
            self.shares.checked_add(quantity.abs()),
            self.invested.checked_add(cost),
        ) {
            (Some(shares), Some(invested)) => {
                self.shares = shares;
                self.invested = invested;
            }
            _ => self.report_overflow(date, warnings),
        }
    }

    /// Removes `quantity` units sold for `proceeds` (base currency, net of fees).
    ///
    /// Selling more than is held clamps to the held quantity; the proceeds
    /// are scaled down to the units actually available.
    pub fn sell(
        &mut self,
        date: NaiveDate,
        quantity: Decimal,
        proceeds: Decimal,
        warnings: &mut Vec<ComputationWarning>,
    ) {
        let requested = quantity.abs();
        if requested.is_zero() {
            return;
        }

        let sold = if requested > self.shares {
            let warning = ComputationWarning::OversoldPosition {
                symbol: self.symbol.clone(),
                date,
                requested,
                available: self.shares,
            };
            warn!("{}", warning);
            warnings.push(warning);
            self.shares
        } else {
            requested
        };

        if sold.is_zero() {
            return;
        }

        let proceeds = if sold == requested {
            proceeds
        } else {
            proceeds * (sold / requested)
        };

        let fraction_sold = sold / self.shares;
        let cost_removed = self.invested * fraction_sold;

        self.shares -= sold;
        self.invested -= cost_removed;
        self.realized_pnl = self
            .realized_pnl
            .saturating_add(proceeds.saturating_sub(cost_removed));

        if self.shares < QUANTITY_THRESHOLD {
            self.shares = Decimal::ZERO;
            self.invested = Decimal::ZERO;
        }
    }

    pub fn average_cost(&self) -> Decimal {
        if self.shares.is_zero() {
            Decimal::ZERO
        } else {
            self.invested / self.shares
        }
    }

    pub fn is_open(&self) -> bool {
        !self.shares.is_zero()
    }

    pub(crate) fn report_overflow(&self, date: NaiveDate, warnings: &mut Vec<ComputationWarning>) {
        let warning = ComputationWarning::AmountOverflow {
            symbol: self.symbol.clone(),
            date,
        };
        warn!("{}", warning);
        warnings.push(warning);
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
    fn test_partial_sell_keeps_average_cost() {
        let mut position = AverageCostPosition::new("VTI");
        let mut warnings = Vec::new();

        position.buy(date(2024, 1, 2), dec!(10), dec!(1000), &mut warnings);
        position.sell(date(2024, 2, 1), dec!(5), dec!(600), &mut warnings);

        assert_eq!(position.shares, dec!(5));
        assert_eq!(position.invested, dec!(500));
        assert_eq!(position.average_cost(), dec!(100));
        assert_eq!(position.realized_pnl, dec!(100));
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_buys_at_different_prices_blend() {
        let mut position = AverageCostPosition::new("VTI");
        let mut warnings = Vec::new();
        position.buy(date(2024, 1, 2), dec!(10), dec!(1000), &mut warnings);
        position.buy(date(2024, 1, 2), dec!(10), dec!(1200), &mut warnings);
        assert_eq!(position.average_cost(), dec!(110));
    }

    #[test]
    fn test_buy_past_decimal_range_is_left_out() {
        let mut position = AverageCostPosition::new("VTI");
        let mut warnings = Vec::new();
        position.buy(date(2024, 1, 2), dec!(1), Decimal::MAX, &mut warnings);
        position.buy(date(2024, 1, 3), dec!(1), dec!(100), &mut warnings);

        assert_eq!(position.shares, dec!(1));
        assert_eq!(position.invested, Decimal::MAX);
        assert_eq!(
            warnings,
            vec![ComputationWarning::AmountOverflow {
                symbol: "VTI".to_string(),
                date: date(2024, 1, 3),
            }]
        );
    }

    #[test]
    fn test_full_sell_closes_position() {
        let mut position = AverageCostPosition::new("VTI");
        let mut warnings = Vec::new();
        position.buy(date(2024, 1, 2), dec!(3), dec!(300), &mut warnings);
        position.sell(date(2024, 2, 1), dec!(3), dec!(270), &mut warnings);

        assert!(!position.is_open());
        assert_eq!(position.invested, Decimal::ZERO);
        assert_eq!(position.realized_pnl, dec!(-30));
        assert_eq!(position.average_cost(), Decimal::ZERO);
    }

    #[test]
    fn test_oversell_is_clamped_and_reported() {
        let mut position = AverageCostPosition::new("VTI");
        let mut warnings = Vec::new();
        position.buy(date(2024, 1, 2), dec!(4), dec!(400), &mut warnings);
        position.sell(date(2024, 3, 1), dec!(8), dec!(960), &mut warnings);

        assert_eq!(position.shares, Decimal::ZERO);
        // Only half the proceeds belong to units that were held
        assert_eq!(position.realized_pnl, dec!(80));
        assert_eq!(warnings.len(), 1);
        assert!(matches!(
            &warnings[0],
            ComputationWarning::OversoldPosition { requested, available, .. }
                if *requested == dec!(8) && *available == dec!(4)
        ));
    }

    #[test]
    fn test_sell_without_position_changes_nothing() {
        let mut position = AverageCostPosition::new("VTI");
        let mut warnings = Vec::new();
        position.sell(date(2024, 3, 1), dec!(1), dec!(100), &mut warnings);

        assert_eq!(position.realized_pnl, Decimal::ZERO);
        assert_eq!(warnings.len(), 1);
    }
}
