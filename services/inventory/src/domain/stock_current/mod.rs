//! 当前库存

mod repository;
mod sort;
mod stock_current;

pub use repository::*;
pub use sort::*;
pub use stock_current::*;
