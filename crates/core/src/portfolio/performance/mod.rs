mod flow_classifier;
pub mod performance_model;
mod return_calculator;
mod xirr;


pub use flow_classifier::{
    classify_flow, investor_cash_flow, is_external_flow, net_contribution, FlowType,
};
pub use performance_model::*;
pub use return_calculator::ReturnCalculator;
pub use xirr::{solve_xirr, TimedFlow, XirrSolution};
