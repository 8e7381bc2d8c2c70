//! Inventory Service Library
//!
//! 分层结构：
//! - `domain`: StockCurrent / Status 实体与仓储接口
//! - `application`: 服务编排、DTO 映射、搜索索引同步
//! - `infrastructure`: PostgreSQL、Elasticsearch 与内存实现
//! - `api`: REST 接口

pub mod api;
pub mod application;
pub mod domain;
pub mod error;
pub mod infrastructure;
