//! 数据库迁移

use inv_adapter_postgres::Migration;

const CREATE_STOCK_CURRENT: &str = r#"
CREATE TABLE IF NOT EXISTS stock_current (
    id BIGSERIAL PRIMARY KEY,
    quantity DOUBLE PRECISION,
    units VARCHAR(255),
    sell_price DOUBLE PRECISION,
    product_id BIGINT,
    CONSTRAINT ux_stock_current_product_id UNIQUE (product_id)
);
"#;

const CREATE_STATUS: &str = r#"
CREATE TABLE IF NOT EXISTS status (
    id BIGSERIAL PRIMARY KEY,
    name VARCHAR(255)
);
"#;

/// 本服务的全部迁移，按版本号排列
pub fn migrations() -> Vec<Migration> {
    vec![
        Migration::new(1, "create_stock_current", CREATE_STOCK_CURRENT),
        Migration::new(2, "create_status", CREATE_STATUS),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_versions_are_unique_and_ordered() {
        let versions: Vec<i64> = migrations().iter().map(|m| m.version).collect();
        let mut sorted = versions.clone();
        sorted.sort();
        sorted.dedup();
        assert_eq!(versions, sorted);
    }
}
