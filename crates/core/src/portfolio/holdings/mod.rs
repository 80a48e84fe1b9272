mod holdings_model;
mod position_tracker;

pub use holdings_model::EtfPerformance;
pub use position_tracker::AverageCostPosition;
