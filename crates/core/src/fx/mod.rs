//! FX (Foreign Exchange) module - rate models and the lookup table used to
//! normalize amounts into a base currency.

mod exchange_rate_table;
mod fx_errors;
mod fx_model;

pub use exchange_rate_table::ExchangeRateTable;
pub use fx_errors::FxError;
pub use fx_model::{normalize_currency_code, ExchangeRate};
