//! 对外数据传输对象

use serde::{Deserialize, Serialize};

/// 当前库存 DTO，产品关联展开为 `productId`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockCurrentDto {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub quantity: Option<f64>,
    #[serde(default)]
    pub units: Option<String>,
    #[serde(default)]
    pub sell_price: Option<f64>,
    #[serde(default)]
    pub product_id: Option<i64>,
}

/// 状态 DTO
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusDto {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub name: Option<String>,
}

/// 对账结果
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconcileReportDto {
    pub reindexed: Vec<i64>,
    pub removed: Vec<i64>,
    pub failed: Vec<i64>,
}

/// 重建索引结果
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReindexResultDto {
    pub indexed: u64,
}
