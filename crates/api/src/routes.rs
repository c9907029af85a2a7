use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use crate::handlers::{compute::compute_add, health::health_check};
use crate::service::ComputeService;

/// API应用状态
#[derive(Clone)]
pub struct AppState {
    pub compute: Arc<ComputeService>,
}

/// 创建API路由
pub fn create_routes(state: AppState) -> Router {
    Router::new()
        // 健康检查
        .route("/health", get(health_check))
        // 计算API
        .route("/api/v1/compute/add", post(compute_add))
        .with_state(state)
}
