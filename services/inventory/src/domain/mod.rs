//! 领域层

pub mod status;
pub mod stock_current;
