//! 实体与 DTO 之间的字段映射

use crate::application::dto::{ReconcileReportDto, StatusDto, StockCurrentDto};
use crate::application::stock_current_service::ReconcileReport;
use crate::domain::status::{Status, StatusId};
use crate::domain::stock_current::{ProductId, StockCurrent, StockCurrentId};

impl From<StockCurrent> for StockCurrentDto {
    fn from(entity: StockCurrent) -> Self {
        Self {
            id: entity.id.map(|id| id.0),
            quantity: entity.quantity,
            units: entity.units,
            sell_price: entity.sell_price,
            product_id: entity.product_id.map(|p| p.0),
        }
    }
}

impl From<StockCurrentDto> for StockCurrent {
    fn from(dto: StockCurrentDto) -> Self {
        Self {
            id: dto.id.map(StockCurrentId),
            quantity: dto.quantity,
            units: dto.units,
            sell_price: dto.sell_price,
            product_id: dto.product_id.map(ProductId),
        }
    }
}

impl From<Status> for StatusDto {
    fn from(entity: Status) -> Self {
        Self {
            id: entity.id.map(|id| id.0),
            name: entity.name,
        }
    }
}

impl From<StatusDto> for Status {
    fn from(dto: StatusDto) -> Self {
        Self {
            id: dto.id.map(StatusId),
            name: dto.name,
        }
    }
}

impl From<ReconcileReport> for ReconcileReportDto {
    fn from(report: ReconcileReport) -> Self {
        let raw = |ids: Vec<StockCurrentId>| -> Vec<i64> { ids.into_iter().map(|id| id.0).collect() };
        Self {
            reindexed: raw(report.reindexed),
            removed: raw(report.removed),
            failed: raw(report.failed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stock_current_mapping_is_lossless() {
        let dto = StockCurrentDto {
            id: Some(3),
            quantity: Some(10.0),
            units: Some("kg".to_string()),
            sell_price: Some(4.5),
            product_id: Some(21),
        };

        let entity = StockCurrent::from(dto.clone());
        assert_eq!(entity.id, Some(StockCurrentId(3)));
        assert_eq!(entity.product_id, Some(ProductId(21)));
        assert_eq!(StockCurrentDto::from(entity), dto);
    }

    #[test]
    fn test_dto_camel_case() {
        let dto = StockCurrentDto {
            sell_price: Some(1.0),
            product_id: Some(2),
            ..Default::default()
        };
        let json = serde_json::to_value(&dto).unwrap();
        assert_eq!(json["sellPrice"], 1.0);
        assert_eq!(json["productId"], 2);

        let parsed: StockCurrentDto = serde_json::from_str(r#"{"units":"box"}"#).unwrap();
        assert_eq!(parsed.id, None);
        assert_eq!(parsed.units.as_deref(), Some("box"));
    }

    #[test]
    fn test_status_mapping() {
        let status = Status::from(StatusDto {
            id: Some(1),
            name: Some("ACTIVE".to_string()),
        });
        assert_eq!(status.id, Some(StatusId(1)));
        assert_eq!(StatusDto::from(status).name.as_deref(), Some("ACTIVE"));
    }
}
