//! 状态字典

mod repository;
mod status;

pub use repository::*;
pub use status::*;
