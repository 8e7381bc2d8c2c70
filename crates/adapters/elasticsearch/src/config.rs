//! Elasticsearch configuration

use std::time::Duration;

use secrecy::Secret;

/// Elasticsearch client configuration
#[derive(Debug, Clone)]
pub struct ElasticsearchConfig {
    /// Cluster endpoint, e.g. `http://localhost:9200`
    pub url: String,

    /// Prepended to every index name
    pub index_prefix: String,

    /// Basic auth username
    pub username: Option<String>,

    /// Basic auth password
    pub password: Option<Secret<String>>,

    /// Per-request timeout
    pub timeout: Duration,
}

impl Default for ElasticsearchConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:9200".to_string(),
            index_prefix: String::new(),
            username: None,
            password: None,
            timeout: Duration::from_secs(10),
        }
    }
}

impl ElasticsearchConfig {
    /// Full index name for an entity
    pub fn index_name(&self, entity: &str) -> String {
        format!("{}{}", self.index_prefix, entity)
    }
}

/// Builder for ElasticsearchConfig
pub struct ElasticsearchConfigBuilder {
    config: ElasticsearchConfig,
}

impl ElasticsearchConfigBuilder {
    /// Create a new builder with endpoint
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            config: ElasticsearchConfig {
                url: url.into(),
                ..Default::default()
            },
        }
    }

    /// Set index prefix
    pub fn with_index_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.config.index_prefix = prefix.into();
        self
    }

    /// Set basic auth credentials
    pub fn with_basic_auth(mut self, username: impl Into<String>, password: Secret<String>) -> Self {
        self.config.username = Some(username.into());
        self.config.password = Some(password);
        self
    }

    /// Set request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Build the configuration
    pub fn build(self) -> ElasticsearchConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_builder() {
        let config = ElasticsearchConfigBuilder::new("http://es:9200")
            .with_index_prefix("dev_")
            .with_basic_auth("elastic", Secret::new("changeme".to_string()))
            .with_timeout(Duration::from_secs(3))
            .build();

        assert_eq!(config.url, "http://es:9200");
        assert_eq!(config.index_name("stock_current"), "dev_stock_current");
        assert_eq!(config.username.as_deref(), Some("elastic"));
        assert_eq!(config.timeout, Duration::from_secs(3));
        assert!(!format!("{:?}", config).contains("changeme"));
    }

    #[test]
    fn test_default_config() {
        let config = ElasticsearchConfig::default();
        assert_eq!(config.url, "http://localhost:9200");
        assert_eq!(config.index_name("status"), "status");
        assert!(config.password.is_none());
    }
}
