//! PostgreSQL 状态仓储实现

use async_trait::async_trait;
use inv_adapter_postgres::map_sqlx_error;
use inv_common::{PagedResult, Pagination};
use inv_errors::{AppError, AppResult};
use inv_ports::{PageableRepository, Repository};
use sqlx::PgPool;

use crate::domain::status::{Status, StatusId};
use crate::error::InventoryError;

pub struct PostgresStatusRepository {
    pool: PgPool,
}

impl PostgresStatusRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn order_by(pagination: &Pagination) -> AppResult<String> {
    let mut clauses = Vec::new();
    for order in &pagination.sort {
        let column = match order.property.as_str() {
            "id" => "id",
            "name" => "name",
            other => {
                return Err(InventoryError::UnknownSortProperty(other.to_string()).into());
            }
        };
        clauses.push(format!("{} {}", column, order.direction.as_sql()));
    }
    if clauses.is_empty() {
        clauses.push("id ASC".to_string());
    }
    Ok(clauses.join(", "))
}

#[async_trait]
impl Repository<Status, StatusId> for PostgresStatusRepository {
    async fn find_by_id(&self, id: &StatusId) -> AppResult<Option<Status>> {
        let row = sqlx::query_as::<_, StatusRow>("SELECT id, name FROM status WHERE id = $1")
            .bind(id.0)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        Ok(row.map(Into::into))
    }

    async fn save(&self, entity: &Status) -> AppResult<Status> {
        let row = match entity.id {
            None => sqlx::query_as::<_, StatusRow>(
                "INSERT INTO status (name) VALUES ($1) RETURNING id, name",
            )
            .bind(&entity.name)
            .fetch_one(&self.pool)
            .await
            .map_err(map_sqlx_error)?,
            Some(id) => sqlx::query_as::<_, StatusRow>(
                "UPDATE status SET name = $2 WHERE id = $1 RETURNING id, name",
            )
            .bind(id.0)
            .bind(&entity.name)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_error)?
            .ok_or_else(|| AppError::from(InventoryError::StatusNotFound(id)))?,
        };

        Ok(row.into())
    }

    async fn delete(&self, id: &StatusId) -> AppResult<()> {
        sqlx::query("DELETE FROM status WHERE id = $1")
            .bind(id.0)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        Ok(())
    }

    async fn exists(&self, id: &StatusId) -> AppResult<bool> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM status WHERE id = $1)")
            .bind(id.0)
            .fetch_one(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        Ok(exists)
    }
}

#[async_trait]
impl PageableRepository<Status, StatusId> for PostgresStatusRepository {
    async fn find_all(&self, pagination: &Pagination) -> AppResult<PagedResult<Status>> {
        let sql = format!(
            "SELECT id, name FROM status ORDER BY {} LIMIT $1 OFFSET $2",
            order_by(pagination)?
        );
        let rows = sqlx::query_as::<_, StatusRow>(&sql)
            .bind(pagination.limit() as i64)
            .bind(pagination.offset() as i64)
            .fetch_all(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        let total = self.count().await?;
        Ok(PagedResult::new(
            rows.into_iter().map(Into::into).collect(),
            total,
            pagination,
        ))
    }

    async fn count(&self) -> AppResult<u64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM status")
            .fetch_one(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        Ok(count.max(0) as u64)
    }
}

#[derive(sqlx::FromRow)]
struct StatusRow {
    id: i64,
    name: Option<String>,
}

impl From<StatusRow> for Status {
    fn from(row: StatusRow) -> Self {
        Self {
            id: Some(StatusId(row.id)),
            name: row.name,
        }
    }
}
