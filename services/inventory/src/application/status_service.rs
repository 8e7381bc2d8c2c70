//! 状态服务，只读写主库

use std::sync::Arc;

use inv_common::{PagedResult, Pagination, SortOrder};
use inv_errors::AppResult;
use tracing::debug;

use crate::application::RequestContext;
use crate::application::dto::StatusDto;
use crate::domain::status::{Status, StatusId, StatusRepository};
use crate::error::InventoryError;

const SORTABLE: [&str; 2] = ["id", "name"];

pub struct StatusService {
    repository: Arc<dyn StatusRepository>,
}

impl StatusService {
    pub fn new(repository: Arc<dyn StatusRepository>) -> Self {
        Self { repository }
    }

    pub async fn save(&self, ctx: &RequestContext, dto: StatusDto) -> AppResult<StatusDto> {
        debug!(request_id = %ctx.request_id, ?dto, "Request to save Status");
        let saved = self.repository.save(&Status::from(dto)).await?;
        Ok(saved.into())
    }

    pub async fn find_all(
        &self,
        ctx: &RequestContext,
        pagination: &Pagination,
    ) -> AppResult<PagedResult<StatusDto>> {
        debug!(request_id = %ctx.request_id, "Request to get all Statuses");

        if let Some(order) = pagination
            .sort
            .iter()
            .find(|o| !SORTABLE.contains(&o.property.as_str()))
        {
            return Err(InventoryError::UnknownSortProperty(order.property.clone()).into());
        }
        let pagination = if pagination.sort.is_empty() {
            pagination.clone().with_sort(SortOrder::asc("id"))
        } else {
            pagination.clone()
        };

        let page = self.repository.find_all(&pagination).await?;
        Ok(page.map(StatusDto::from))
    }

    pub async fn find_one(&self, ctx: &RequestContext, id: StatusId) -> AppResult<Option<StatusDto>> {
        debug!(request_id = %ctx.request_id, %id, "Request to get Status");
        Ok(self.repository.find_by_id(&id).await?.map(StatusDto::from))
    }

    pub async fn delete(&self, ctx: &RequestContext, id: StatusId) -> AppResult<()> {
        debug!(request_id = %ctx.request_id, %id, "Request to delete Status");
        self.repository.delete(&id).await
    }
}
