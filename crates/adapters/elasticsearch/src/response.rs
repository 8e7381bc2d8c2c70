//! Elasticsearch response bodies

use serde::Deserialize;

/// `_search` response
#[derive(Debug, Deserialize)]
pub struct SearchResponse<T> {
    pub hits: Hits<T>,
}

#[derive(Debug, Deserialize)]
pub struct Hits<T> {
    pub total: Option<TotalHits>,
    pub hits: Vec<Hit<T>>,
}

#[derive(Debug, Deserialize)]
pub struct TotalHits {
    pub value: u64,
}

#[derive(Debug, Deserialize)]
pub struct Hit<T> {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "_source")]
    pub source: T,
}

impl<T> SearchResponse<T> {
    /// Response for an index that does not exist yet
    pub fn empty() -> Self {
        Self {
            hits: Hits {
                total: Some(TotalHits { value: 0 }),
                hits: Vec::new(),
            },
        }
    }

    pub fn total(&self) -> u64 {
        self.hits
            .total
            .as_ref()
            .map(|t| t.value)
            .unwrap_or(self.hits.hits.len() as u64)
    }

    pub fn into_sources(self) -> Vec<T> {
        self.hits.hits.into_iter().map(|h| h.source).collect()
    }
}

/// `_bulk` response
#[derive(Debug, Deserialize)]
pub struct BulkResponse {
    pub errors: bool,
    #[serde(default)]
    pub items: Vec<serde_json::Map<String, serde_json::Value>>,
}

impl BulkResponse {
    /// First failed item as `id: reason`
    pub fn first_error(&self) -> Option<String> {
        self.items.iter().find_map(|item| {
            let result = item.values().next()?;
            let error = result.get("error")?;
            let id = result.get("_id").and_then(|v| v.as_str()).unwrap_or("?");
            let reason = error
                .get("reason")
                .and_then(|r| r.as_str())
                .unwrap_or("unknown");
            Some(format!("{}: {}", id, reason))
        })
    }
}

/// `_cluster/health` response
#[derive(Debug, Deserialize)]
pub struct ClusterHealth {
    pub cluster_name: String,
    pub status: String,
}

impl ClusterHealth {
    /// Green or yellow clusters accept reads and writes
    pub fn is_available(&self) -> bool {
        self.status == "green" || self.status == "yellow"
    }
}
