//! 库存服务业务错误

use inv_errors::AppError;
use thiserror::Error;

use crate::domain::status::StatusId;
use crate::domain::stock_current::{ProductId, StockCurrentId};

#[derive(Debug, Error)]
pub enum InventoryError {
    #[error("StockCurrent {0} not found")]
    StockCurrentNotFound(StockCurrentId),
    #[error("Status {0} not found")]
    StatusNotFound(StatusId),
    #[error("No StockCurrent for product {0}")]
    NoStockCurrentForProduct(ProductId),
    #[error("Product {0} already has a StockCurrent")]
    ProductAlreadyAssigned(ProductId),
    #[error("Product {0} has more than one StockCurrent")]
    AmbiguousProduct(ProductId),
    #[error("A new {0} cannot already have an ID")]
    IdAlreadyPresent(&'static str),
    #[error("Invalid id: an update of {0} needs an ID")]
    IdMissing(&'static str),
    #[error("Unknown filter: {0}")]
    UnknownFilter(String),
    #[error("Unknown sort property: {0}")]
    UnknownSortProperty(String),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<InventoryError> for AppError {
    fn from(error: InventoryError) -> Self {
        let msg = error.to_string();
        match error {
            InventoryError::StockCurrentNotFound(_)
            | InventoryError::StatusNotFound(_)
            | InventoryError::NoStockCurrentForProduct(_) => AppError::NotFound(msg),
            InventoryError::ProductAlreadyAssigned(_) => AppError::Conflict(msg),
            InventoryError::AmbiguousProduct(_) => AppError::DataIntegrity(msg),
            InventoryError::IdAlreadyPresent(_)
            | InventoryError::IdMissing(_)
            | InventoryError::UnknownFilter(_)
            | InventoryError::UnknownSortProperty(_) => AppError::Validation(msg),
            InventoryError::Internal(msg) => AppError::Internal(msg),
        }
    }
}
