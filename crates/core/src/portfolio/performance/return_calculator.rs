use chrono::NaiveDate;
use log::{debug, warn};
use num_traits::{FromPrimitive, ToPrimitive};
use rust_decimal::{Decimal, MathematicalOps};
use rust_decimal_macros::dec;

use crate::activities::{CashFlow, CashFlowKind, Trade, TradeSide};
use crate::constants::{DAYS_PER_YEAR, DECIMAL_PRECISION, XIRR_DAYS_PER_YEAR};
use crate::fx::{ExchangeRateTable, FxError};
use crate::portfolio::holdings::{AverageCostPosition, EtfPerformance};
use crate::portfolio::valuation::PortfolioValuation;
use crate::utils::time_utils::{period_days, valuation_date_today, year_fraction};

use super::flow_classifier::{investor_cash_flow, is_external_flow, net_contribution};
use super::xirr::{solve_xirr, TimedFlow};
use super::{ComputationWarning, PerformanceMetrics, ReturnData, XirrResult};

const HUNDRED: Decimal = dec!(100);

/// A cash flow already normalized into the base currency.
#[derive(Debug, Clone)]
struct BaseFlow {
    date: NaiveDate,
    kind: CashFlowKind,
    amount: Decimal,
    external: bool,
}

/// Output of one TWR pass over a valuation path.
#[derive(Debug, Default)]
struct TwrAnalysis {
    twr: Decimal,
    returns: Vec<ReturnData>,
    period_returns: Vec<Decimal>,
}

/// Stateless performance calculator over in-memory ledgers.
///
/// Every amount is converted into `base_currency` before it takes part in
/// any arithmetic. None of the calculations fail on malformed input: they
/// fall back to a numeric default (zero, an unconverted amount, the last
/// solver iterate) and report the fallback as a [`ComputationWarning`].
#[derive(Debug, Clone)]
pub struct ReturnCalculator {
    base_currency: String,
    rates: ExchangeRateTable,
    as_of: NaiveDate,
}

impl ReturnCalculator {
    pub fn new(base_currency: &str, rates: ExchangeRateTable) -> Self {
        Self {
            base_currency: base_currency.trim().to_ascii_uppercase(),
            rates,
            as_of: valuation_date_today(),
        }
    }

    /// Overrides "now": the date of the XIRR terminal value and of the
    /// current price conversion.
    pub fn with_as_of(mut self, as_of: NaiveDate) -> Self {
        self.as_of = as_of;
        self
    }

    pub fn base_currency(&self) -> &str {
        &self.base_currency
    }

    pub fn as_of(&self) -> NaiveDate {
        self.as_of
    }

    /// Converts `amount` into the base currency at `date`.
    ///
    /// Falls back to the unconverted amount (a rate of 1.0) when the table
    /// has no path between the currencies, logging a warning.
    pub fn convert_to_base_currency(
        &self,
        amount: Decimal,
        from_currency: &str,
        date: NaiveDate,
    ) -> Decimal {
        self.to_base(amount, from_currency, date, &mut Vec::new())
    }

    fn to_base(
        &self,
        amount: Decimal,
        from_currency: &str,
        date: NaiveDate,
        warnings: &mut Vec<ComputationWarning>,
    ) -> Decimal {
        if from_currency.trim().eq_ignore_ascii_case(&self.base_currency) {
            return amount;
        }

        match self
            .rates
            .convert_amount(amount, from_currency, &self.base_currency, date)
        {
            Ok(converted) => converted,
            Err(err) => {
                let warning = ComputationWarning::MissingExchangeRate {
                    from: from_currency.trim().to_ascii_uppercase(),
                    to: self.base_currency.clone(),
                    date,
                };
                match err {
                    FxError::RateNotFound(_) => warn!("{}", warning),
                    other => warn!("{} ({})", warning, other),
                }
                if !warnings.contains(&warning) {
                    warnings.push(warning);
                }
                amount
            }
        }
    }

    fn normalize_flows(
        &self,
        cash_flows: &[CashFlow],
        warnings: &mut Vec<ComputationWarning>,
    ) -> Vec<BaseFlow> {
        let mut flows: Vec<BaseFlow> = cash_flows
            .iter()
            .map(|flow| BaseFlow {
                date: flow.date,
                kind: flow.kind,
                amount: self.to_base(flow.magnitude(), &flow.currency, flow.date, warnings),
                external: is_external_flow(flow),
            })
            .collect();
        flows.sort_by_key(|flow| flow.date);
        flows
    }

    /// Sorts valuations by date and converts them to the base currency.
    /// When several share a date, the last one supplied wins.
    fn normalize_valuations(
        &self,
        valuations: &[PortfolioValuation],
        warnings: &mut Vec<ComputationWarning>,
    ) -> Vec<(NaiveDate, Decimal)> {
        let mut ordered: Vec<&PortfolioValuation> = valuations.iter().collect();
        ordered.sort_by_key(|valuation| valuation.date);

        let mut points: Vec<(NaiveDate, Decimal)> = Vec::with_capacity(ordered.len());
        for valuation in ordered {
            let value = self.to_base(valuation.value, &valuation.currency, valuation.date, warnings);
            match points.last_mut() {
                Some(last) if last.0 == valuation.date => {
                    let warning = ComputationWarning::DuplicateValuationDate {
                        date: valuation.date,
                    };
                    if !warnings.contains(&warning) {
                        warn!("{}", warning);
                        warnings.push(warning);
                    }
                    last.1 = value;
                }
                _ => points.push((valuation.date, value)),
            }
        }
        points
    }

    /// Time-weighted return in percent.
    ///
    /// Each pair of consecutive valuations forms a sub-period whose factor
    /// is `V[i] / (V[i-1] + net contributions in [date(V[i-1]), date(V[i])))`.
    /// Factors are chained and the result is `(product - 1) * 100`.
    pub fn calculate_twr(
        &self,
        valuations: &[PortfolioValuation],
        cash_flows: &[CashFlow],
    ) -> Decimal {
        let mut warnings = Vec::new();
        let points = self.normalize_valuations(valuations, &mut warnings);
        let flows = self.normalize_flows(cash_flows, &mut warnings);
        Self::analyze_twr(&points, &flows, &mut warnings).twr
    }

    fn analyze_twr(
        points: &[(NaiveDate, Decimal)],
        flows: &[BaseFlow],
        warnings: &mut Vec<ComputationWarning>,
    ) -> TwrAnalysis {
        let Some(&(first_date, _)) = points.first() else {
            return TwrAnalysis::default();
        };

        let mut analysis = TwrAnalysis {
            twr: Decimal::ZERO,
            returns: vec![ReturnData {
                date: first_date,
                value: Decimal::ZERO,
            }],
            period_returns: Vec::with_capacity(points.len().saturating_sub(1)),
        };

        if points.len() < 2 {
            return analysis;
        }

        let external: Vec<&BaseFlow> = flows.iter().filter(|flow| flow.external).collect();
        // Flows dated before the first valuation belong to no sub-period
        let mut cursor = external.partition_point(|flow| flow.date < first_date);
        let mut cumulative = Decimal::ONE;

        for window in points.windows(2) {
            let (start_date, start_value) = window[0];
            let (end_date, end_value) = window[1];

            let mut net = Decimal::ZERO;
            while cursor < external.len() && external[cursor].date < end_date {
                let flow = external[cursor];
                net += net_contribution(flow.kind, flow.amount);
                cursor += 1;
            }

            let adjusted_start = start_value + net;
            if adjusted_start <= Decimal::ZERO {
                let warning = ComputationWarning::TwrPeriodSkipped {
                    start_date,
                    end_date,
                };
                warn!("{}", warning);
                warnings.push(warning);
            } else {
                let period_return = end_value / adjusted_start - Decimal::ONE;
                analysis.period_returns.push(period_return);
                cumulative *= Decimal::ONE + period_return;
            }

            analysis.returns.push(ReturnData {
                date: end_date,
                value: ((cumulative - Decimal::ONE) * HUNDRED).round_dp(DECIMAL_PRECISION),
            });
        }

        analysis.twr = ((cumulative - Decimal::ONE) * HUNDRED).round_dp(DECIMAL_PRECISION);
        analysis
    }

    /// Money-weighted return (XIRR) in percent.
    ///
    /// Contributions and fees count as money paid in, withdrawals and
    /// dividends as money received; `final_value` is received on the as-of
    /// date.
    pub fn calculate_xirr(&self, cash_flows: &[CashFlow], final_value: Decimal) -> XirrResult {
        let mut warnings = Vec::new();
        let flows = self.normalize_flows(cash_flows, &mut warnings);
        self.xirr_from_flows(&flows, final_value, &mut warnings)
    }

    fn xirr_from_flows(
        &self,
        flows: &[BaseFlow],
        final_value: Decimal,
        warnings: &mut Vec<ComputationWarning>,
    ) -> XirrResult {
        let Some(first) = flows.first() else {
            return XirrResult::zero();
        };
        let first_date = first.date;

        let mut timed: Vec<TimedFlow> = flows
            .iter()
            .map(|flow| {
                (
                    investor_cash_flow(flow.kind, flow.amount)
                        .to_f64()
                        .unwrap_or(0.0),
                    year_fraction(first_date, flow.date, XIRR_DAYS_PER_YEAR),
                )
            })
            .collect();
        timed.push((
            final_value.to_f64().unwrap_or(0.0),
            year_fraction(first_date, self.as_of, XIRR_DAYS_PER_YEAR),
        ));

        let solution = solve_xirr(&timed);
        debug!(
            "XIRR solved over {} flows: rate={} converged={} iterations={}",
            timed.len(),
            solution.rate,
            solution.converged,
            solution.iterations
        );

        if !solution.converged {
            let warning = ComputationWarning::XirrNotConverged {
                iterations: solution.iterations,
                last_rate: solution.rate,
            };
            warn!("{}", warning);
            warnings.push(warning);
        }

        XirrResult {
            rate: Decimal::from_f64(solution.rate * 100.0)
                .unwrap_or(Decimal::ZERO)
                .round_dp(DECIMAL_PRECISION),
            converged: solution.converged,
            iterations: solution.iterations,
        }
    }

    /// Annualizes a total return (percent) earned over `period_days`.
    ///
    /// When compounding leaves the decimal range the total return is
    /// reported unannualized.
    pub fn calculate_annualized_return(total_return: Decimal, period_days: i64) -> Decimal {
        Self::annualize(total_return, period_days, &mut Vec::new())
    }

    fn annualize(
        total_return: Decimal,
        period_days: i64,
        warnings: &mut Vec<ComputationWarning>,
    ) -> Decimal {
        if total_return.is_zero() || period_days <= 0 {
            return Decimal::ZERO;
        }

        let growth = Decimal::ONE + total_return / HUNDRED;
        if growth <= Decimal::ZERO {
            return -HUNDRED;
        }

        let exponent = DAYS_PER_YEAR / Decimal::from(period_days);
        let annualized = growth
            .checked_powd(exponent)
            .and_then(|compounded| (compounded - Decimal::ONE).checked_mul(HUNDRED));
        match annualized {
            Some(value) => value.round_dp(DECIMAL_PRECISION),
            None => {
                let warning = ComputationWarning::AnnualizedReturnOverflow {
                    total_return,
                    period_days,
                };
                warn!("{}", warning);
                warnings.push(warning);
                total_return
            }
        }
    }

    /// Sample standard deviation of the sub-period returns, in percent.
    fn calculate_volatility(period_returns: &[Decimal]) -> Decimal {
        if period_returns.len() < 2 {
            return Decimal::ZERO;
        }

        let count = Decimal::from(period_returns.len());
        let mean = period_returns.iter().sum::<Decimal>() / count;
        let sum_squared_diff: Decimal = period_returns
            .iter()
            .map(|&r| {
                let diff = r - mean;
                diff * diff
            })
            .sum();

        let variance = sum_squared_diff / (count - Decimal::ONE);
        variance.sqrt().unwrap_or(Decimal::ZERO) * HUNDRED
    }

    /// Largest peak-to-trough fall of the chained return index, in percent.
    fn calculate_max_drawdown(period_returns: &[Decimal]) -> Decimal {
        let mut cumulative_value = Decimal::ONE;
        let mut peak_value = Decimal::ONE;
        let mut max_drawdown = Decimal::ZERO;

        for &period_return in period_returns {
            cumulative_value *= Decimal::ONE + period_return;
            peak_value = peak_value.max(cumulative_value);
            if peak_value.is_zero() {
                max_drawdown = max_drawdown.max(Decimal::ONE);
            } else {
                let drawdown = (peak_value - cumulative_value) / peak_value;
                max_drawdown = max_drawdown.max(drawdown);
            }
        }

        max_drawdown.max(Decimal::ZERO) * HUNDRED
    }

    /// Portfolio-level metrics over the whole ledger.
    pub fn calculate_complete_performance(
        &self,
        trades: &[Trade],
        cash_flows: &[CashFlow],
        valuations: &[PortfolioValuation],
    ) -> PerformanceMetrics {
        let mut warnings = Vec::new();
        let flows = self.normalize_flows(cash_flows, &mut warnings);
        let points = self.normalize_valuations(valuations, &mut warnings);

        let mut invested_amount = Decimal::ZERO;
        let mut total_withdrawn = Decimal::ZERO;
        let mut total_dividends = Decimal::ZERO;
        let mut total_fees = Decimal::ZERO;
        for flow in &flows {
            match flow.kind {
                CashFlowKind::Contribution => invested_amount += flow.amount,
                CashFlowKind::Withdrawal => total_withdrawn += flow.amount,
                CashFlowKind::Dividend => total_dividends += flow.amount,
                CashFlowKind::Fee => total_fees += flow.amount,
            }
        }

        let current_value = points.last().map_or(Decimal::ZERO, |&(_, value)| value);
        let profit_loss =
            current_value + total_withdrawn + total_dividends - invested_amount - total_fees;

        let total_return = if invested_amount.is_zero() {
            Decimal::ZERO
        } else {
            (profit_loss / invested_amount * HUNDRED).round_dp(DECIMAL_PRECISION)
        };

        let period_start_date = flows
            .first()
            .map(|flow| flow.date)
            .or_else(|| trades.iter().map(|trade| trade.date).min())
            .or_else(|| points.first().map(|&(date, _)| date));
        let period_end_date = points.last().map(|&(date, _)| date).or(Some(self.as_of));
        let days = match (period_start_date, period_end_date) {
            (Some(start), Some(end)) => period_days(start, end),
            _ => 1,
        };

        let annualized_return = Self::annualize(total_return, days, &mut warnings);

        let twr = Self::analyze_twr(&points, &flows, &mut warnings);
        let xirr = self.xirr_from_flows(&flows, current_value, &mut warnings);
        let volatility = Self::calculate_volatility(&twr.period_returns);
        let max_drawdown = Self::calculate_max_drawdown(&twr.period_returns);

        debug!(
            "Performance over {} days: {} flows, {} valuations, {} warnings",
            days,
            flows.len(),
            points.len(),
            warnings.len()
        );

        PerformanceMetrics {
            twr: twr.twr,
            xirr: xirr.rate,
            xirr_converged: xirr.converged,
            total_return,
            annualized_return,
            total_dividends: total_dividends.round_dp(DECIMAL_PRECISION),
            total_fees: total_fees.round_dp(DECIMAL_PRECISION),
            current_value: current_value.round_dp(DECIMAL_PRECISION),
            invested_amount: invested_amount.round_dp(DECIMAL_PRECISION),
            total_withdrawn: total_withdrawn.round_dp(DECIMAL_PRECISION),
            profit_loss: profit_loss.round_dp(DECIMAL_PRECISION),
            base_currency: self.base_currency.clone(),
            period_days: days,
            period_start_date,
            period_end_date,
            returns: twr.returns,
            volatility: volatility.round_dp(DECIMAL_PRECISION),
            max_drawdown: max_drawdown.round_dp(DECIMAL_PRECISION),
            warnings,
        }
    }

    /// Position summary for one ETF using average-cost accounting.
    pub fn calculate_etf_performance(
        &self,
        symbol: &str,
        trades: &[Trade],
        cash_flows: &[CashFlow],
        current_price: Decimal,
        current_price_currency: &str,
    ) -> EtfPerformance {
        let mut warnings = Vec::new();

        let mut symbol_trades: Vec<&Trade> = trades
            .iter()
            .filter(|trade| trade.symbol.eq_ignore_ascii_case(symbol))
            .collect();
        symbol_trades.sort_by_key(|trade| trade.date);

        let mut position = AverageCostPosition::new(symbol);
        for trade in symbol_trades {
            let Some(gross) = trade.gross_amount() else {
                position.report_overflow(trade.date, &mut warnings);
                continue;
            };
            let gross = self.to_base(gross, &trade.currency, trade.date, &mut warnings);
            let fee = self.to_base(trade.fee.abs(), &trade.currency, trade.date, &mut warnings);
            match trade.side {
                TradeSide::Buy => match gross.checked_add(fee) {
                    Some(cost) => position.buy(trade.date, trade.quantity, cost, &mut warnings),
                    None => position.report_overflow(trade.date, &mut warnings),
                },
                TradeSide::Sell => {
                    position.sell(trade.date, trade.quantity, gross - fee, &mut warnings)
                }
            }
        }

        let total_dividends: Decimal = cash_flows
            .iter()
            .filter(|flow| flow.kind == CashFlowKind::Dividend && flow.is_for_symbol(symbol))
            .map(|flow| self.to_base(flow.magnitude(), &flow.currency, flow.date, &mut warnings))
            .sum();

        let price = self.to_base(current_price, current_price_currency, self.as_of, &mut warnings);
        let average_cost = position.average_cost();
        let current_value = match position.shares.checked_mul(price) {
            Some(value) => value,
            None => {
                position.report_overflow(self.as_of, &mut warnings);
                Decimal::ZERO
            }
        };
        let cost_basis = position
            .shares
            .checked_mul(average_cost)
            .unwrap_or(position.invested);
        let unrealized_pnl = current_value - cost_basis;
        let unrealized_pnl_percent = unrealized_pnl
            .checked_div(cost_basis)
            .and_then(|ratio| ratio.checked_mul(HUNDRED))
            .unwrap_or(Decimal::ZERO);

        EtfPerformance {
            symbol: symbol.to_string(),
            total_shares: position.shares,
            total_invested: position.invested.round_dp(DECIMAL_PRECISION),
            average_cost: average_cost.round_dp(DECIMAL_PRECISION),
            current_price: price.round_dp(DECIMAL_PRECISION),
            current_value: current_value.round_dp(DECIMAL_PRECISION),
            unrealized_pnl: unrealized_pnl.round_dp(DECIMAL_PRECISION),
            unrealized_pnl_percent: unrealized_pnl_percent.round_dp(DECIMAL_PRECISION),
            realized_pnl: position.realized_pnl.round_dp(DECIMAL_PRECISION),
            total_dividends: total_dividends.round_dp(DECIMAL_PRECISION),
            base_currency: self.base_currency.clone(),
            warnings,
        }
    }
}
