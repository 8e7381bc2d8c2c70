//! 主库仓储实现

mod memory;
mod migrations;
mod status_repository;
mod stock_current_repository;

pub use memory::{InMemoryStatusRepository, InMemoryStockCurrentRepository};
pub use migrations::migrations;
pub use status_repository::PostgresStatusRepository;
pub use stock_current_repository::PostgresStockCurrentRepository;
