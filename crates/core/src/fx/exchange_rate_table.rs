use crate::fx::fx_errors::FxError;
use crate::fx::fx_model::{normalize_currency_code, ExchangeRate};
use chrono::NaiveDate;
use log::warn;
use rust_decimal::Decimal;
use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};

/// Lookup table for `(from, to, date) -> rate`.
///
/// Rates are kept as independent time-series per directed pair, with the
/// inverse of every inserted rate stored alongside it. Lookups prefer the
/// exact date and otherwise take the nearest recorded date on either side.
/// Pairs with no direct series are resolved through the currency graph
/// (e.g. CHF -> EUR -> USD).
#[derive(Debug, Clone, Default)]
pub struct ExchangeRateTable {
    /// Graph adjacency list: Currency -> Set of connected currencies.
    adj: HashMap<String, HashSet<String>>,

    /// Key: (From_Currency, To_Currency), Value: Date -> Rate
    rates: HashMap<(String, String), BTreeMap<NaiveDate, Decimal>>,
}

impl ExchangeRateTable {
    pub fn new(exchange_rates: Vec<ExchangeRate>) -> Self {
        let mut table = ExchangeRateTable::default();
        table.add_rates(exchange_rates);
        table
    }

    /// Adds rates to the table. A later rate for the same pair and date
    /// replaces the earlier one.
    pub fn add_rates(&mut self, rates: Vec<ExchangeRate>) {
        for rate in rates {
            let (from, to) = match (
                normalize_currency_code(&rate.from_currency),
                normalize_currency_code(&rate.to_currency),
            ) {
                (Ok(from), Ok(to)) => (from, to),
                (Err(e), _) | (_, Err(e)) => {
                    warn!("Skipping exchange rate on {}: {}", rate.date, e);
                    continue;
                }
            };

            if from == to {
                continue;
            }

            if rate.rate.is_sign_negative() || rate.rate.is_zero() {
                warn!(
                    "Skipping non-positive exchange rate {} for {}->{} on {}",
                    rate.rate, from, to, rate.date
                );
                continue;
            }

            self.insert_edge(&from, &to, rate.date, rate.rate);
            self.insert_edge(&to, &from, rate.date, Decimal::ONE / rate.rate);
        }
    }

    fn insert_edge(&mut self, from: &str, to: &str, date: NaiveDate, rate: Decimal) {
        self.rates
            .entry((from.to_string(), to.to_string()))
            .or_default()
            .insert(date, rate);
        self.adj
            .entry(from.to_string())
            .or_default()
            .insert(to.to_string());
    }

    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }

    /// Finds the direct rate between two connected currencies.
    /// Takes the closest rate on or before the date and the closest after it,
    /// and returns whichever is fewer days away (the past wins ties).
    fn get_direct_rate(&self, from: &str, to: &str, date: NaiveDate) -> Option<Decimal> {
        let history = self.rates.get(&(from.to_string(), to.to_string()))?;

        let prev = history.range(..=date).next_back();
        let next = history.range(date..).next();

        match (prev, next) {
            (Some((d1, r1)), Some((d2, r2))) => {
                let dist_prev = (date - *d1).num_days().abs();
                let dist_next = (*d2 - date).num_days().abs();
                if dist_prev <= dist_next {
                    Some(*r1)
                } else {
                    Some(*r2)
                }
            }
            (Some((_, r)), None) | (None, Some((_, r))) => Some(*r),
            (None, None) => None,
        }
    }

    /// Converts an amount, walking the currency graph breadth-first so the
    /// path with the fewest hops wins.
    pub fn convert_amount(
        &self,
        amount: Decimal,
        from_currency: &str,
        to_currency: &str,
        date: NaiveDate,
    ) -> Result<Decimal, FxError> {
        let from = from_currency.trim().to_ascii_uppercase();
        let to = to_currency.trim().to_ascii_uppercase();

        if from == to {
            return Ok(amount);
        }

        let mut queue: VecDeque<(String, Decimal)> = VecDeque::new();
        let mut visited: HashSet<String> = HashSet::new();

        queue.push_back((from.clone(), Decimal::ONE));
        visited.insert(from.clone());

        while let Some((current, accumulated)) = queue.pop_front() {
            if current == to {
                return amount.checked_mul(accumulated).ok_or_else(|| {
                    FxError::ConversionError(format!(
                        "Overflow converting {} {} -> {}",
                        amount, from, to
                    ))
                });
            }

            if let Some(neighbors) = self.adj.get(&current) {
                for neighbor in neighbors {
                    if visited.contains(neighbor) {
                        continue;
                    }
                    if let Some(rate) = self.get_direct_rate(&current, neighbor, date) {
                        visited.insert(neighbor.clone());
                        queue.push_back((neighbor.clone(), accumulated * rate));
                    }
                }
            }
        }

        Err(FxError::RateNotFound(format!(
            "No conversion path found for {} -> {} on or near {}",
            from, to, date
        )))
    }

    /// Rate for one unit of `from_currency`.
    pub fn get_rate(
        &self,
        from_currency: &str,
        to_currency: &str,
        date: NaiveDate,
    ) -> Result<Decimal, FxError> {
        self.convert_amount(Decimal::ONE, from_currency, to_currency, date)
    }
}
