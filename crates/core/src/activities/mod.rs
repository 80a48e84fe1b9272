//! Activities module - cash flow and trade models.

mod activities_model;

pub use activities_model::{CashFlow, CashFlowKind, Trade, TradeSide};
