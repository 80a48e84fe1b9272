//! Core error types for the ETF curator.
//!
//! Return calculations never fail on malformed input; they degrade and report
//! warnings instead. These errors cover the surfaces that can genuinely fail:
//! loading a ledger, parsing input, and exchange-rate lookups.

use chrono::ParseError as ChronoParseError;
use thiserror::Error;

use crate::fx::FxError;

/// Type alias for Result using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Root error type for the performance core.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Failed to read input: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to (de)serialize data: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Input validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("Fx error: {0}")]
    Fx(#[from] FxError),
}

/// Validation errors for user input and data parsing.
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Failed to parse decimal number: {0}")]
    DecimalParse(#[from] rust_decimal::Error),

    #[error("Failed to parse date/time: {0}")]
    DateTimeParse(#[from] ChronoParseError),
}

impl From<rust_decimal::Error> for Error {
    fn from(err: rust_decimal::Error) -> Self {
        Error::Validation(ValidationError::DecimalParse(err))
    }
}

impl From<ChronoParseError> for Error {
    fn from(err: ChronoParseError) -> Self {
        Error::Validation(ValidationError::DateTimeParse(err))
    }
}

impl From<Error> for String {
    fn from(err: Error) -> Self {
        err.to_string()
    }
}
