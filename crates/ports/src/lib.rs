//! inv-ports - 抽象 trait 层
//!
//! 定义主库与搜索索引两类存储的能力接口，服务层只依赖这些 trait

mod repository;
mod search;

pub use repository::*;
pub use search::*;
