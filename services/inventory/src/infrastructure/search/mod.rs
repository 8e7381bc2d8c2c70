//! 搜索索引实现

mod memory_index;

use inv_adapter_elasticsearch::{ElasticsearchConfig, ElasticsearchConfigBuilder};
use inv_config::SearchConfig;
use secrecy::Secret;

pub use memory_index::InMemorySearchIndex;

/// 库存文档中需要通过 `.keyword` 子字段排序的文本字段
pub const STOCK_CURRENT_KEYWORD_FIELDS: &[&str] = &["units"];

/// 由应用配置生成 Elasticsearch 客户端配置
pub fn elasticsearch_config(config: &SearchConfig) -> ElasticsearchConfig {
    let mut builder = ElasticsearchConfigBuilder::new(config.url.clone())
        .with_index_prefix(config.index_prefix.clone())
        .with_timeout(config.timeout());

    if let Some(username) = &config.username {
        let password = config
            .password
            .clone()
            .unwrap_or_else(|| Secret::new(String::new()));
        builder = builder.with_basic_auth(username.clone(), password);
    }
    builder.build()
}
