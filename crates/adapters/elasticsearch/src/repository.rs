//! Generic Elasticsearch-backed search repository

use std::fmt::Display;
use std::marker::PhantomData;
use std::sync::Arc;

use async_trait::async_trait;
use inv_common::{PagedResult, Pagination};
use inv_errors::{AppError, AppResult};
use inv_ports::{Document, SearchRepository};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use crate::client::{BulkOperation, ElasticsearchClient};
use crate::query::build_search_body;

/// One index holding one document type
pub struct ElasticsearchRepository<T> {
    client: Arc<ElasticsearchClient>,
    index: String,
    keyword_fields: &'static [&'static str],
    _marker: PhantomData<fn() -> T>,
}

impl<T> ElasticsearchRepository<T>
where
    T: Document + Serialize + DeserializeOwned + 'static,
{
    pub fn new(client: Arc<ElasticsearchClient>, index: impl Into<String>) -> Self {
        Self {
            client,
            index: index.into(),
            keyword_fields: &[],
            _marker: PhantomData,
        }
    }

    /// Text fields that are sorted through their `.keyword` sub-field
    pub fn with_keyword_fields(mut self, fields: &'static [&'static str]) -> Self {
        self.keyword_fields = fields;
        self
    }

    pub fn index_name(&self) -> &str {
        &self.index
    }

    /// Create the index if it does not exist yet
    pub async fn ensure_index(&self) -> AppResult<()> {
        self.client.create_index_if_missing(&self.index).await
    }

    fn require_id(document: &T) -> AppResult<String> {
        document
            .document_id()
            .ok_or_else(|| AppError::validation("Cannot index a document without an id"))
    }

    fn to_source(document: &T) -> AppResult<Value> {
        serde_json::to_value(document)
            .map_err(|e| AppError::internal(format!("Failed to serialize document: {}", e)))
    }
}

#[async_trait]
impl<T, ID> SearchRepository<T, ID> for ElasticsearchRepository<T>
where
    T: Document + Serialize + DeserializeOwned + 'static,
    ID: Display + Send + Sync,
{
    async fn index(&self, document: &T) -> AppResult<()> {
        let id = Self::require_id(document)?;
        self.client.put_document(&self.index, &id, document).await
    }

    async fn index_all(&self, documents: &[T]) -> AppResult<()> {
        let operations = documents
            .iter()
            .map(|document| -> AppResult<BulkOperation> {
                Ok(BulkOperation::Index {
                    id: Self::require_id(document)?,
                    document: Self::to_source(document)?,
                })
            })
            .collect::<AppResult<Vec<_>>>()?;

        self.client.bulk(&self.index, &operations).await
    }

    async fn delete(&self, id: &ID) -> AppResult<()> {
        self.client
            .delete_document(&self.index, &id.to_string())
            .await
    }

    async fn delete_all(&self) -> AppResult<()> {
        self.client.delete_all_documents(&self.index).await
    }

    async fn search(&self, query: &str, pagination: &Pagination) -> AppResult<PagedResult<T>> {
        let body = build_search_body(query, pagination, self.keyword_fields);
        debug!(index = %self.index, query, "Searching index");

        let response = self.client.search::<T>(&self.index, &body).await?;
        let total = response.total();
        Ok(PagedResult::new(response.into_sources(), total, pagination))
    }
}
