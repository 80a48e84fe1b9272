pub mod valuation_model;

pub use valuation_model::*;
