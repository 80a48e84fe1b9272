//! Portfolio module - valuations, holdings and performance.

pub mod holdings;
pub mod performance;
pub mod valuation;

pub use holdings::*;
pub use performance::*;
pub use valuation::*;
