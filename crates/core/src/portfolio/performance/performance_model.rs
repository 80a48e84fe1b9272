use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Cumulative time-weighted return (percent) as of `date`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReturnData {
    pub date: NaiveDate,
    pub value: Decimal,
}

/// A lossy degradation taken while computing metrics.
///
/// Calculations never fail on bad input; every fallback they take is
/// recorded here so callers can decide how much to trust the numbers.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ComputationWarning {
    /// No rate path existed; the amount was used unconverted.
    #[serde(rename_all = "camelCase")]
    MissingExchangeRate {
        from: String,
        to: String,
        date: NaiveDate,
    },
    /// Newton-Raphson stopped without meeting the tolerance.
    #[serde(rename_all = "camelCase")]
    XirrNotConverged { iterations: u32, last_rate: f64 },
    /// The adjusted starting value of a TWR sub-period was zero or negative.
    #[serde(rename_all = "camelCase")]
    TwrPeriodSkipped {
        start_date: NaiveDate,
        end_date: NaiveDate,
    },
    /// Several valuations shared a date; the last one supplied was kept.
    #[serde(rename_all = "camelCase")]
    DuplicateValuationDate { date: NaiveDate },
    /// A sell exceeded the held quantity and was clamped.
    #[serde(rename_all = "camelCase")]
    OversoldPosition {
        symbol: String,
        date: NaiveDate,
        requested: Decimal,
        available: Decimal,
    },
    /// Compounding the total return to a yearly rate left the decimal
    /// range; the unannualized total return was reported instead.
    #[serde(rename_all = "camelCase")]
    AnnualizedReturnOverflow {
        total_return: Decimal,
        period_days: i64,
    },
    /// An amount for `symbol` left the decimal range and was left out.
    #[serde(rename_all = "camelCase")]
    AmountOverflow { symbol: String, date: NaiveDate },
}

impl fmt::Display for ComputationWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ComputationWarning::MissingExchangeRate { from, to, date } => write!(
                f,
                "No exchange rate {}->{} near {}; amount left unconverted",
                from, to, date
            ),
            ComputationWarning::XirrNotConverged {
                iterations,
                last_rate,
            } => write!(
                f,
                "XIRR did not converge after {} iterations (last rate {:.6})",
                iterations, last_rate
            ),
            ComputationWarning::TwrPeriodSkipped {
                start_date,
                end_date,
            } => write!(
                f,
                "TWR sub-period {}..{} skipped: non-positive starting value",
                start_date, end_date
            ),
            ComputationWarning::DuplicateValuationDate { date } => {
                write!(f, "Duplicate valuations on {}; kept the last one", date)
            }
            ComputationWarning::OversoldPosition {
                symbol,
                date,
                requested,
                available,
            } => write!(
                f,
                "Sell of {} {} on {} exceeds held {}; clamped",
                requested, symbol, date, available
            ),
            ComputationWarning::AnnualizedReturnOverflow {
                total_return,
                period_days,
            } => write!(
                f,
                "Annualizing {}% over {} days overflowed; reported the total return",
                total_return, period_days
            ),
            ComputationWarning::AmountOverflow { symbol, date } => {
                write!(f, "Amount for {} on {} overflowed; left out", symbol, date)
            }
        }
    }
}

/// Result of the XIRR solver. `rate` is in percent.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct XirrResult {
    pub rate: Decimal,
    pub converged: bool,
    pub iterations: u32,
}

impl XirrResult {
    pub fn zero() -> Self {
        XirrResult {
            rate: Decimal::ZERO,
            converged: true,
            iterations: 0,
        }
    }
}

/// Portfolio-level performance, all amounts in `base_currency` and all
/// rates in percent.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceMetrics {
    pub twr: Decimal,
    pub xirr: Decimal,
    pub xirr_converged: bool,
    pub total_return: Decimal,
    pub annualized_return: Decimal,
    pub total_dividends: Decimal,
    pub total_fees: Decimal,
    pub current_value: Decimal,
    pub invested_amount: Decimal,
    pub total_withdrawn: Decimal,
    pub profit_loss: Decimal,
    pub base_currency: String,
    pub period_days: i64,
    pub period_start_date: Option<NaiveDate>,
    pub period_end_date: Option<NaiveDate>,
    pub returns: Vec<ReturnData>,
    pub volatility: Decimal,
    pub max_drawdown: Decimal,
    #[serde(default)]
    pub warnings: Vec<ComputationWarning>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_warning_serializes_as_tagged_union() {
        let warning = ComputationWarning::MissingExchangeRate {
            from: "EUR".to_string(),
            to: "USD".to_string(),
            date: NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
        };
        let json = serde_json::to_value(&warning).unwrap();
        assert_eq!(json["type"], "MISSING_EXCHANGE_RATE");
        assert_eq!(json["from"], "EUR");
        assert_eq!(json["date"], "2024-05-01");
    }

    #[test]
    fn test_skipped_period_warning_uses_camel_case_fields() {
        let warning = ComputationWarning::TwrPeriodSkipped {
            start_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2024, 2, 1).unwrap(),
        };
        let json = serde_json::to_value(&warning).unwrap();
        assert_eq!(json["type"], "TWR_PERIOD_SKIPPED");
        assert_eq!(json["startDate"], "2024-01-01");
    }

    #[test]
    fn test_annualized_overflow_warning_fields() {
        let warning = ComputationWarning::AnnualizedReturnOverflow {
            total_return: dec!(30),
            period_days: 1,
        };
        let json = serde_json::to_value(&warning).unwrap();
        assert_eq!(json["type"], "ANNUALIZED_RETURN_OVERFLOW");
        assert_eq!(json["periodDays"], 1);
        assert_eq!(json["totalReturn"], 30.0);
    }

    #[test]
    fn test_warning_display() {
        let warning = ComputationWarning::OversoldPosition {
            symbol: "SPY".to_string(),
            date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            requested: dec!(12),
            available: dec!(10),
        };
        assert_eq!(
            warning.to_string(),
            "Sell of 12 SPY on 2024-01-01 exceeds held 10; clamped"
        );
    }
}
