//! Elasticsearch REST client

use inv_errors::{AppError, AppResult};
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use secrecy::{ExposeSecret, Secret};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use tracing::{debug, info};
use url::Url;

use crate::config::ElasticsearchConfig;
use crate::error::{map_status_error, map_transport_error};
use crate::response::{BulkResponse, ClusterHealth, SearchResponse};

/// A single line pair in a `_bulk` request
#[derive(Debug, Clone)]
pub enum BulkOperation {
    Index { id: String, document: Value },
    Delete { id: String },
}

/// Elasticsearch client shared by all index repositories
pub struct ElasticsearchClient {
    http: Client,
    base_url: Url,
    username: Option<String>,
    password: Option<Secret<String>>,
}

impl ElasticsearchClient {
    /// Create a new client; does not touch the network
    pub fn new(config: &ElasticsearchConfig) -> AppResult<Self> {
        // Url::join drops the last path segment unless it ends with '/'
        let mut raw = config.url.clone();
        if !raw.ends_with('/') {
            raw.push('/');
        }
        let base_url = Url::parse(&raw).map_err(|e| {
            AppError::validation(format!("Invalid Elasticsearch url '{}': {}", config.url, e))
        })?;

        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| map_transport_error(e, "Failed to build Elasticsearch client"))?;

        info!(url = %base_url, "Elasticsearch client created");

        Ok(Self {
            http,
            base_url,
            username: config.username.clone(),
            password: config.password.clone(),
        })
    }

    fn url(&self, path: &str) -> AppResult<Url> {
        self.base_url
            .join(path)
            .map_err(|e| AppError::internal(format!("Invalid Elasticsearch path '{}': {}", path, e)))
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        let builder = self.http.request(method, url);
        match &self.username {
            Some(username) => builder.basic_auth(
                username,
                self.password.as_ref().map(|p| p.expose_secret().to_string()),
            ),
            None => builder,
        }
    }

    async fn send(&self, builder: RequestBuilder, context: &str) -> AppResult<Response> {
        builder
            .send()
            .await
            .map_err(|e| map_transport_error(e, context))
    }

    async fn error_from(response: Response, context: &str) -> AppError {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        map_status_error(status, &body, context)
    }

    /// Upsert a document; waits for the next refresh so it is searchable on return
    pub async fn put_document<D: Serialize + ?Sized>(
        &self,
        index: &str,
        id: &str,
        document: &D,
    ) -> AppResult<()> {
        let mut url = self.url(&format!("{}/_doc/{}", index, id))?;
        url.query_pairs_mut().append_pair("refresh", "wait_for");

        let context = format!("Failed to index document {}/{}", index, id);
        let response = self
            .send(self.request(Method::PUT, url).json(document), &context)
            .await?;

        if !response.status().is_success() {
            return Err(Self::error_from(response, &context).await);
        }
        debug!(index, id, "Document indexed");
        Ok(())
    }

    /// Delete a document; a missing document or index is not an error
    pub async fn delete_document(&self, index: &str, id: &str) -> AppResult<()> {
        let mut url = self.url(&format!("{}/_doc/{}", index, id))?;
        url.query_pairs_mut().append_pair("refresh", "wait_for");

        let context = format!("Failed to delete document {}/{}", index, id);
        let response = self.send(self.request(Method::DELETE, url), &context).await?;

        match response.status() {
            s if s.is_success() => {
                debug!(index, id, "Document deleted");
                Ok(())
            }
            StatusCode::NOT_FOUND => {
                debug!(index, id, "Document already absent");
                Ok(())
            }
            _ => Err(Self::error_from(response, &context).await),
        }
    }

    /// Run a search request body against an index
    pub async fn search<T: DeserializeOwned>(
        &self,
        index: &str,
        body: &Value,
    ) -> AppResult<SearchResponse<T>> {
        let url = self.url(&format!("{}/_search", index))?;
        let context = format!("Failed to search index {}", index);
        let response = self
            .send(self.request(Method::POST, url).json(body), &context)
            .await?;

        match response.status() {
            s if s.is_success() => response
                .json::<SearchResponse<T>>()
                .await
                .map_err(|e| map_transport_error(e, &context)),
            // Nothing has been indexed yet
            StatusCode::NOT_FOUND => Ok(SearchResponse::empty()),
            _ => Err(Self::error_from(response, &context).await),
        }
    }

    /// Send a batch of operations through `_bulk`
    pub async fn bulk(&self, index: &str, operations: &[BulkOperation]) -> AppResult<()> {
        if operations.is_empty() {
            return Ok(());
        }

        let body = bulk_body(index, operations)?;
        let mut url = self.url("_bulk")?;
        url.query_pairs_mut().append_pair("refresh", "wait_for");

        let context = format!("Bulk request to {} failed", index);
        let response = self
            .send(
                self.request(Method::POST, url)
                    .header(reqwest::header::CONTENT_TYPE, "application/x-ndjson")
                    .body(body),
                &context,
            )
            .await?;

        if !response.status().is_success() {
            return Err(Self::error_from(response, &context).await);
        }

        let result: BulkResponse = response
            .json()
            .await
            .map_err(|e| map_transport_error(e, &context))?;
        if result.errors {
            let detail = result.first_error().unwrap_or_else(|| "unknown".to_string());
            return Err(AppError::external_service(format!("{}: {}", context, detail)));
        }

        debug!(index, count = operations.len(), "Bulk request applied");
        Ok(())
    }

    /// Remove every document from an index, keeping the index itself
    pub async fn delete_all_documents(&self, index: &str) -> AppResult<()> {
        let mut url = self.url(&format!("{}/_delete_by_query", index))?;
        url.query_pairs_mut()
            .append_pair("refresh", "true")
            .append_pair("conflicts", "proceed");

        let context = format!("Failed to clear index {}", index);
        let body = json!({ "query": { "match_all": {} } });
        let response = self
            .send(self.request(Method::POST, url).json(&body), &context)
            .await?;

        match response.status() {
            s if s.is_success() => {
                info!(index, "Index cleared");
                Ok(())
            }
            StatusCode::NOT_FOUND => Ok(()),
            _ => Err(Self::error_from(response, &context).await),
        }
    }

    /// Create the index with default settings if it does not exist
    pub async fn create_index_if_missing(&self, index: &str) -> AppResult<()> {
        let url = self.url(index)?;
        let context = format!("Failed to create index {}", index);

        let exists = self
            .send(self.request(Method::HEAD, url.clone()), &context)
            .await?;
        if exists.status().is_success() {
            return Ok(());
        }

        let response = self.send(self.request(Method::PUT, url), &context).await?;
        if response.status().is_success() {
            info!(index, "Index created");
            return Ok(());
        }

        // Lost a race with another instance creating the same index
        let err = Self::error_from(response, &context).await;
        if err.to_string().contains("resource_already_exists_exception")
            || err.to_string().contains("already exists")
        {
            return Ok(());
        }
        Err(err)
    }

    /// Fetch `_cluster/health`
    pub async fn cluster_health(&self) -> AppResult<ClusterHealth> {
        let url = self.url("_cluster/health")?;
        let context = "Failed to read cluster health";
        let response = self.send(self.request(Method::GET, url), context).await?;

        if !response.status().is_success() {
            return Err(Self::error_from(response, context).await);
        }
        response
            .json()
            .await
            .map_err(|e| map_transport_error(e, context))
    }
}

/// Build an NDJSON `_bulk` body; every line, including the last, ends with '\n'
pub fn bulk_body(index: &str, operations: &[BulkOperation]) -> AppResult<String> {
    let mut body = String::new();
    for operation in operations {
        let lines = match operation {
            BulkOperation::Index { id, document } => vec![
                json!({ "index": { "_index": index, "_id": id } }),
                document.clone(),
            ],
            BulkOperation::Delete { id } => {
                vec![json!({ "delete": { "_index": index, "_id": id } })]
            }
        };
        for line in lines {
            let encoded = serde_json::to_string(&line)
                .map_err(|e| AppError::internal(format!("Failed to encode bulk line: {}", e)))?;
            body.push_str(&encoded);
            body.push('\n');
        }
    }
    Ok(body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ElasticsearchConfigBuilder;

    #[test]
    fn test_bulk_body_format() {
        let operations = vec![
            BulkOperation::Index {
                id: "1".to_string(),
                document: json!({"id": 1, "units": "kg"}),
            },
            BulkOperation::Delete {
                id: "2".to_string(),
            },
        ];

        let body = bulk_body("stock_current", &operations).unwrap();
        let lines: Vec<&str> = body.lines().collect();

        assert_eq!(lines.len(), 3);
        assert!(body.ends_with('\n'));

        let action: Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(action["index"]["_index"], "stock_current");
        assert_eq!(action["index"]["_id"], "1");

        let source: Value = serde_json::from_str(lines[1]).unwrap();
        assert_eq!(source["units"], "kg");

        let delete: Value = serde_json::from_str(lines[2]).unwrap();
        assert_eq!(delete["delete"]["_id"], "2");
    }

    #[test]
    fn test_url_join_keeps_base_path() {
        let config = ElasticsearchConfigBuilder::new("http://proxy:8080/es").build();
        let client = ElasticsearchClient::new(&config).unwrap();

        let url = client.url("stock_current/_doc/5").unwrap();
        assert_eq!(url.as_str(), "http://proxy:8080/es/stock_current/_doc/5");
    }

    #[test]
    fn test_invalid_url_rejected() {
        let config = ElasticsearchConfigBuilder::new("not a url").build();
        assert!(matches!(
            ElasticsearchClient::new(&config),
            Err(AppError::Validation(_))
        ));
    }

    #[tokio::test]
    #[ignore] // Requires running Elasticsearch, ELASTICSEARCH_URL
    async fn test_cluster_health_live() {
        let url = std::env::var("ELASTICSEARCH_URL")
            .unwrap_or_else(|_| "http://localhost:9200".to_string());
        let client = ElasticsearchClient::new(&ElasticsearchConfigBuilder::new(url).build()).unwrap();

        let health = client.cluster_health().await.unwrap();
        assert!(!health.cluster_name.is_empty());
    }
}
