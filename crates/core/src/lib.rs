//! ETF Curator Core - ledger models and return calculations.
//!
//! Turns dated cash flows, trades and portfolio valuations (in any mix of
//! currencies) into performance metrics: time-weighted return, XIRR,
//! annualized return and average-cost holding summaries. Everything here is
//! synchronous and works on in-memory slices.

pub mod activities;
pub mod constants;
pub mod errors;
pub mod fx;
pub mod ledger;
pub mod portfolio;
pub mod utils;

// Re-export common types from the activity and portfolio modules
pub use activities::*;
pub use ledger::Ledger;
pub use portfolio::*;

// Re-export error types
pub use errors::Error;
pub use errors::Result;
