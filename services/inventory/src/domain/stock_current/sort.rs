//! 库存记录可排序字段

use std::cmp::Ordering;

use inv_common::{Pagination, SortDirection, SortOrder};
use inv_errors::{AppError, AppResult};

use super::StockCurrent;
use crate::error::InventoryError;

/// 允许排序的字段
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StockCurrentSortField {
    Id,
    Quantity,
    Units,
    SellPrice,
    ProductId,
}

impl StockCurrentSortField {
    /// 同时接受 snake_case 和 camelCase 属性名
    pub fn parse(property: &str) -> Option<Self> {
        match property {
            "id" => Some(Self::Id),
            "quantity" => Some(Self::Quantity),
            "units" => Some(Self::Units),
            "sell_price" | "sellPrice" => Some(Self::SellPrice),
            "product_id" | "productId" => Some(Self::ProductId),
            _ => None,
        }
    }

    /// 列名，同时也是索引文档中的字段名
    pub fn column(&self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::Quantity => "quantity",
            Self::Units => "units",
            Self::SellPrice => "sell_price",
            Self::ProductId => "product_id",
        }
    }

    /// 比较两条记录，空值排在非空值之后
    pub fn compare(&self, a: &StockCurrent, b: &StockCurrent) -> Ordering {
        match self {
            Self::Id => nulls_last(a.id.as_ref(), b.id.as_ref(), Ord::cmp),
            Self::Quantity => nulls_last(a.quantity.as_ref(), b.quantity.as_ref(), f64::total_cmp),
            Self::Units => nulls_last(a.units.as_ref(), b.units.as_ref(), Ord::cmp),
            Self::SellPrice => {
                nulls_last(a.sell_price.as_ref(), b.sell_price.as_ref(), f64::total_cmp)
            }
            Self::ProductId => nulls_last(a.product_id.as_ref(), b.product_id.as_ref(), Ord::cmp),
        }
    }
}

fn nulls_last<T>(a: Option<&T>, b: Option<&T>, cmp: impl Fn(&T, &T) -> Ordering) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => cmp(a, b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// 校验分页参数中的排序字段，并统一为列名
pub fn normalize_sort(pagination: &Pagination) -> AppResult<Pagination> {
    let mut normalized = Pagination::new(pagination.page, pagination.page_size);
    for order in &pagination.sort {
        let field = StockCurrentSortField::parse(&order.property).ok_or_else(|| {
            AppError::from(InventoryError::UnknownSortProperty(order.property.clone()))
        })?;
        normalized = normalized.with_sort(SortOrder {
            property: field.column().to_string(),
            direction: order.direction,
        });
    }
    Ok(normalized)
}

/// 按排序条件比较两条记录，最后按 ID 升序保证顺序稳定
pub fn compare_by_sort(sort: &[SortOrder], a: &StockCurrent, b: &StockCurrent) -> Ordering {
    for order in sort {
        let Some(field) = StockCurrentSortField::parse(&order.property) else {
            continue;
        };
        let ordering = match order.direction {
            SortDirection::Asc => field.compare(a, b),
            SortDirection::Desc => field.compare(b, a),
        };
        if ordering != Ordering::Equal {
            return ordering;
        }
    }
    StockCurrentSortField::Id.compare(a, b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::stock_current::StockCurrentId;

    fn stock(id: i64, quantity: Option<f64>) -> StockCurrent {
        StockCurrent {
            id: Some(StockCurrentId(id)),
            quantity,
            ..Default::default()
        }
    }

    #[test]
    fn test_parse_aliases() {
        assert_eq!(
            StockCurrentSortField::parse("sellPrice"),
            Some(StockCurrentSortField::SellPrice)
        );
        assert_eq!(
            StockCurrentSortField::parse("product_id"),
            Some(StockCurrentSortField::ProductId)
        );
        assert_eq!(StockCurrentSortField::parse("password"), None);
    }

    #[test]
    fn test_normalize_sort() {
        let pagination = Pagination::new(2, 5).with_sort(SortOrder::desc("sellPrice"));
        let normalized = normalize_sort(&pagination).unwrap();

        assert_eq!(normalized.page, 2);
        assert_eq!(normalized.sort, vec![SortOrder::desc("sell_price")]);
    }

    #[test]
    fn test_normalize_sort_rejects_unknown() {
        let pagination = Pagination::default().with_sort(SortOrder::asc("id; DROP TABLE x"));
        assert!(matches!(
            normalize_sort(&pagination),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn test_compare_nulls_last() {
        let mut items = vec![stock(1, None), stock(2, Some(5.0)), stock(3, Some(1.0))];
        items.sort_by(|a, b| compare_by_sort(&[SortOrder::asc("quantity")], a, b));
        let ids: Vec<i64> = items.iter().map(|s| s.id.unwrap().0).collect();
        assert_eq!(ids, vec![3, 2, 1]);

        items.sort_by(|a, b| compare_by_sort(&[SortOrder::desc("quantity")], a, b));
        let ids: Vec<i64> = items.iter().map(|s| s.id.unwrap().0).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }
}
