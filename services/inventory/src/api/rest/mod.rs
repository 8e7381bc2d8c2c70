//! REST 接口

mod context;
mod error;
mod health;
mod params;
mod status;
mod stock_current;

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use inv_common::HealthCheck;
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::trace::TraceLayer;

use crate::application::{StatusService, StockCurrentService};

pub use error::ApiError;
pub use params::{IdPath, PageRequest};

/// 路由共享状态
#[derive(Clone)]
pub struct AppState {
    pub stock_currents: Arc<StockCurrentService>,
    pub statuses: Arc<StatusService>,
    pub health_checks: Arc<Vec<Arc<dyn HealthCheck>>>,
    pub metrics: Option<PrometheusHandle>,
}

impl AppState {
    pub fn new(stock_currents: Arc<StockCurrentService>, statuses: Arc<StatusService>) -> Self {
        Self {
            stock_currents,
            statuses,
            health_checks: Arc::new(Vec::new()),
            metrics: None,
        }
    }

    pub fn with_health_checks(mut self, checks: Vec<Arc<dyn HealthCheck>>) -> Self {
        self.health_checks = Arc::new(checks);
        self
    }

    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = Some(handle);
        self
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route(
            "/api/stock-currents",
            get(stock_current::list)
                .post(stock_current::create)
                .put(stock_current::update),
        )
        .route(
            "/api/stock-currents/{id}",
            get(stock_current::get_one).delete(stock_current::delete),
        )
        .route(
            "/api/stock-currents/by-product/{product_id}",
            get(stock_current::get_by_product),
        )
        .route("/api/_search/stock-currents", get(stock_current::search))
        .route("/api/_index/stock-currents", post(stock_current::reindex))
        .route(
            "/api/_reconcile/stock-currents",
            get(stock_current::pending).post(stock_current::reconcile),
        )
        .route(
            "/api/statuses",
            get(status::list).post(status::create).put(status::update),
        )
        .route("/api/statuses/{id}", get(status::get_one).delete(status::delete))
        .route("/health", get(health::health))
        .route("/metrics", get(health::metrics))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
