use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum FxError {
    #[error("Exchange rate not found: {0}")]
    RateNotFound(String),

    #[error("Invalid currency code: {0}")]
    InvalidCurrencyCode(String),

    #[error("Currency conversion error: {0}")]
    ConversionError(String),
}
