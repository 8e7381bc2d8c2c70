//! inv-adapter-elasticsearch - Elasticsearch adapter
//!
//! Talks to Elasticsearch over its REST API:
//! - Document upsert / delete keyed by the primary store id
//! - `query_string` full-text search with pagination and sorting
//! - Bulk indexing and index wipe for full reindex
//! - Health checking via `_cluster/health`

pub mod client;
pub mod config;
pub mod error;
pub mod health;
pub mod query;
pub mod repository;
pub mod response;

pub use client::{BulkOperation, ElasticsearchClient};
pub use config::{ElasticsearchConfig, ElasticsearchConfigBuilder};
pub use health::ElasticsearchHealthCheck;
pub use repository::ElasticsearchRepository;
