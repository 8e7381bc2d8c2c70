//! PostgreSQL 库存仓储实现

use async_trait::async_trait;
use inv_adapter_postgres::map_sqlx_error;
use inv_common::{PagedResult, Pagination, SortOrder};
use inv_errors::{AppError, AppResult};
use inv_ports::{PageableRepository, Repository};
use sqlx::PgPool;

use crate::domain::stock_current::{
    ProductId, StockCurrent, StockCurrentId, StockCurrentRepository, StockCurrentSortField,
};
use crate::error::InventoryError;

const COLUMNS: &str = "id, quantity, units, sell_price, product_id";

pub struct PostgresStockCurrentRepository {
    pool: PgPool,
}

impl PostgresStockCurrentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// 由白名单字段拼出 ORDER BY，最后按 id 保证分页稳定
fn order_by(sort: &[SortOrder]) -> AppResult<String> {
    let mut clauses = Vec::with_capacity(sort.len() + 1);
    for order in sort {
        let field = StockCurrentSortField::parse(&order.property).ok_or_else(|| {
            AppError::from(InventoryError::UnknownSortProperty(order.property.clone()))
        })?;
        clauses.push(format!("{} {}", field.column(), order.direction.as_sql()));
    }
    if !sort.iter().any(|o| o.property == "id") {
        clauses.push("id ASC".to_string());
    }
    Ok(clauses.join(", "))
}

#[async_trait]
impl Repository<StockCurrent, StockCurrentId> for PostgresStockCurrentRepository {
    async fn find_by_id(&self, id: &StockCurrentId) -> AppResult<Option<StockCurrent>> {
        let row = sqlx::query_as::<_, StockCurrentRow>(&format!(
            "SELECT {COLUMNS} FROM stock_current WHERE id = $1"
        ))
        .bind(id.0)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.map(StockCurrentRow::into_stock_current))
    }

    async fn save(&self, entity: &StockCurrent) -> AppResult<StockCurrent> {
        let row = match entity.id {
            None => sqlx::query_as::<_, StockCurrentRow>(&format!(
                r#"
                INSERT INTO stock_current (quantity, units, sell_price, product_id)
                VALUES ($1, $2, $3, $4)
                RETURNING {COLUMNS}
                "#
            ))
            .bind(entity.quantity)
            .bind(&entity.units)
            .bind(entity.sell_price)
            .bind(entity.product_id.map(|p| p.0))
            .fetch_one(&self.pool)
            .await
            .map_err(map_sqlx_error)?,
            Some(id) => sqlx::query_as::<_, StockCurrentRow>(&format!(
                r#"
                UPDATE stock_current
                SET quantity = $2, units = $3, sell_price = $4, product_id = $5
                WHERE id = $1
                RETURNING {COLUMNS}
                "#
            ))
            .bind(id.0)
            .bind(entity.quantity)
            .bind(&entity.units)
            .bind(entity.sell_price)
            .bind(entity.product_id.map(|p| p.0))
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_error)?
            .ok_or_else(|| AppError::from(InventoryError::StockCurrentNotFound(id)))?,
        };

        Ok(row.into_stock_current())
    }

    async fn delete(&self, id: &StockCurrentId) -> AppResult<()> {
        sqlx::query("DELETE FROM stock_current WHERE id = $1")
            .bind(id.0)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        Ok(())
    }

    async fn exists(&self, id: &StockCurrentId) -> AppResult<bool> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM stock_current WHERE id = $1)")
                .bind(id.0)
                .fetch_one(&self.pool)
                .await
                .map_err(map_sqlx_error)?;

        Ok(exists)
    }
}

#[async_trait]
impl PageableRepository<StockCurrent, StockCurrentId> for PostgresStockCurrentRepository {
    async fn find_all(&self, pagination: &Pagination) -> AppResult<PagedResult<StockCurrent>> {
        let sql = format!(
            "SELECT {COLUMNS} FROM stock_current ORDER BY {} LIMIT $1 OFFSET $2",
            order_by(&pagination.sort)?
        );
        let rows = sqlx::query_as::<_, StockCurrentRow>(&sql)
            .bind(pagination.limit() as i64)
            .bind(pagination.offset() as i64)
            .fetch_all(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        let total = self.count().await?;
        let items = rows.into_iter().map(StockCurrentRow::into_stock_current).collect();
        Ok(PagedResult::new(items, total, pagination))
    }

    async fn count(&self) -> AppResult<u64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM stock_current")
            .fetch_one(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        Ok(count.max(0) as u64)
    }
}

#[async_trait]
impl StockCurrentRepository for PostgresStockCurrentRepository {
    async fn find_all_unpaged(&self) -> AppResult<Vec<StockCurrent>> {
        let rows = sqlx::query_as::<_, StockCurrentRow>(&format!(
            "SELECT {COLUMNS} FROM stock_current ORDER BY id ASC"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(rows.into_iter().map(StockCurrentRow::into_stock_current).collect())
    }

    async fn find_by_product_id(&self, product_id: ProductId) -> AppResult<Option<StockCurrent>> {
        // 取两条即可判断是否唯一
        let mut rows = sqlx::query_as::<_, StockCurrentRow>(&format!(
            "SELECT {COLUMNS} FROM stock_current WHERE product_id = $1 ORDER BY id ASC LIMIT 2"
        ))
        .bind(product_id.0)
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        if rows.len() > 1 {
            return Err(InventoryError::AmbiguousProduct(product_id).into());
        }
        Ok(rows.pop().map(StockCurrentRow::into_stock_current))
    }

    async fn find_all_where_product_is_null(&self) -> AppResult<Vec<StockCurrent>> {
        let rows = sqlx::query_as::<_, StockCurrentRow>(&format!(
            "SELECT {COLUMNS} FROM stock_current WHERE product_id IS NULL ORDER BY id ASC"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(rows.into_iter().map(StockCurrentRow::into_stock_current).collect())
    }
}

#[derive(sqlx::FromRow)]
struct StockCurrentRow {
    id: i64,
    quantity: Option<f64>,
    units: Option<String>,
    sell_price: Option<f64>,
    product_id: Option<i64>,
}

impl StockCurrentRow {
    fn into_stock_current(self) -> StockCurrent {
        StockCurrent {
            id: Some(StockCurrentId(self.id)),
            quantity: self.quantity,
            units: self.units,
            sell_price: self.sell_price,
            product_id: self.product_id.map(ProductId),
        }
    }
}
