//! 应用层

pub mod context;
pub mod dto;
pub mod index_sync;
pub mod mapper;
pub mod status_service;
pub mod stock_current_service;

pub use context::RequestContext;
pub use index_sync::{IndexSynchronizer, SyncOperation};
pub use status_service::StatusService;
pub use stock_current_service::{ReconcileReport, StockCurrentService};
