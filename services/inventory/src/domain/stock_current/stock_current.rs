//! 当前库存实体

use derive_more::{Display, From};
use inv_ports::Document;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// 库存记录 ID，由主库在首次保存时分配
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Display, From,
)]
#[display("{_0}")]
#[serde(transparent)]
pub struct StockCurrentId(pub i64);

impl FromStr for StockCurrentId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.parse()?))
    }
}

/// 产品 ID
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Display, From,
)]
#[display("{_0}")]
#[serde(transparent)]
pub struct ProductId(pub i64);

/// 当前库存
///
/// 同时存在于主库和搜索索引，两边的 ID 和字段值一致
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StockCurrent {
    pub id: Option<StockCurrentId>,
    pub quantity: Option<f64>,
    pub units: Option<String>,
    pub sell_price: Option<f64>,
    pub product_id: Option<ProductId>,
}

impl StockCurrent {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_quantity(mut self, quantity: f64, units: impl Into<String>) -> Self {
        self.quantity = Some(quantity);
        self.units = Some(units.into());
        self
    }

    pub fn with_sell_price(mut self, sell_price: f64) -> Self {
        self.sell_price = Some(sell_price);
        self
    }

    pub fn with_product(mut self, product_id: ProductId) -> Self {
        self.product_id = Some(product_id);
        self
    }

    /// 是否已持久化
    pub fn is_persisted(&self) -> bool {
        self.id.is_some()
    }

    pub fn has_product(&self) -> bool {
        self.product_id.is_some()
    }
}

impl Document for StockCurrent {
    fn document_id(&self) -> Option<String> {
        self.id.map(|id| id.to_string())
    }
}
