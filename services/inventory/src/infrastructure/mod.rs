//! 基础设施层

pub mod persistence;
pub mod search;
