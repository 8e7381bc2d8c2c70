//! Inventory Service - 当前库存服务入口
//!
//! PostgreSQL 为主库，Elasticsearch 为搜索镜像

use std::sync::Arc;

use inv_adapter_elasticsearch::{ElasticsearchClient, ElasticsearchHealthCheck, ElasticsearchRepository};
use inv_adapter_postgres::{MigrationManager, PostgresConfig, PostgresHealthCheck, create_pool};
use inv_common::{HealthCheck, RetryConfig, with_retry};
use inv_config::{AppConfig, SearchBackend};
use inv_telemetry::{init_metrics, init_tracing_with_format};
use secrecy::ExposeSecret;
use tower_http::cors::CorsLayer;
use tracing::{error, info, warn};

use inventory::api::{AppState, router};
use inventory::application::{IndexSynchronizer, RequestContext, StatusService, StockCurrentService};
use inventory::domain::stock_current::{StockCurrent, StockCurrentSearchRepository};
use inventory::infrastructure::persistence::{
    PostgresStatusRepository, PostgresStockCurrentRepository, migrations,
};
use inventory::infrastructure::search::{
    InMemorySearchIndex, STOCK_CURRENT_KEYWORD_FIELDS, elasticsearch_config,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    // 1. 加载配置
    let config = AppConfig::load("config")?;

    // 2. 初始化日志和指标
    init_tracing_with_format(
        &config.telemetry.log_level,
        config.telemetry.json || config.is_production(),
    );
    let metrics = init_metrics()?;
    info!(
        app_name = %config.app_name,
        app_env = %config.app_env,
        "Starting inventory service"
    );

    // 3. 主库
    let pg_config = PostgresConfig::new(config.database.url.expose_secret().clone())
        .with_max_connections(config.database.max_connections);
    let pool = create_pool(&pg_config).await?;
    if config.database.run_migrations {
        let result = MigrationManager::new(pool.clone())
            .migrate(&migrations())
            .await?
            .into_result()?;
        info!(
            applied = result.applied.len(),
            skipped = result.skipped.len(),
            "Migrations finished"
        );
    }

    let mut health_checks: Vec<Arc<dyn HealthCheck>> =
        vec![Arc::new(PostgresHealthCheck::new(pool.clone()))];

    // 4. 搜索索引
    let search: Arc<dyn StockCurrentSearchRepository> = match config.search.backend {
        SearchBackend::Elasticsearch => {
            let es_config = elasticsearch_config(&config.search);
            let client = Arc::new(ElasticsearchClient::new(&es_config)?);
            let repository = ElasticsearchRepository::<StockCurrent>::new(
                client.clone(),
                es_config.index_name(StockCurrentService::entity_name()),
            )
            .with_keyword_fields(STOCK_CURRENT_KEYWORD_FIELDS);

            // 索引暂不可用时照常启动，写入失败会进入差异账本
            let ensured = with_retry(&RetryConfig::default(), "search.ensure_index", || {
                repository.ensure_index()
            })
            .await;
            if let Err(e) = ensured {
                warn!(index = repository.index_name(), error = %e, "Could not ensure search index");
            }
            health_checks.push(Arc::new(ElasticsearchHealthCheck::new(client)));
            Arc::new(repository)
        }
        SearchBackend::Memory => {
            warn!("Using in-process search index, not for production");
            Arc::new(InMemorySearchIndex::<StockCurrent>::new())
        }
    };

    // 5. 应用服务
    let stock_currents = Arc::new(StockCurrentService::new(
        Arc::new(PostgresStockCurrentRepository::new(pool.clone())),
        search,
        IndexSynchronizer::from_config(StockCurrentService::entity_name(), &config.index_sync),
        config.index_sync.reindex_batch_size,
    ));
    let statuses = Arc::new(StatusService::new(Arc::new(PostgresStatusRepository::new(
        pool.clone(),
    ))));

    // 进程内索引启动时为空，从主库填充
    if config.search.backend == SearchBackend::Memory {
        let indexed = stock_currents.reindex(&RequestContext::default()).await?;
        info!(indexed, "In-process search index populated");
    }

    let state = AppState::new(stock_currents, statuses)
        .with_health_checks(health_checks)
        .with_metrics(metrics);
    let app = router(state).layer(CorsLayer::permissive());

    // 6. 启动 HTTP 服务
    let addr = config.server.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(%addr, "Inventory service listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Inventory service stopped");
    Ok(())
}

/// 等待 Ctrl+C 或 SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
