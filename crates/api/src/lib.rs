//! # Flint API
//!
//! 计算集群的HTTP管理接口，基于Axum构建。
//!
//! ## API 端点
//!
//! - `GET /health` - 健康检查
//! - `POST /api/v1/compute/add` - 提交一次加法计算，请求体 `{"x": 3, "y": 5, "timeout_ms": 2000}`，
//!   返回 `{"success": true, "result": "8"}`
//!
//! 调度失败（Nack、超时、取消）同样以 `success: false` 的结果返回，
//! 只有请求体本身无效时才返回HTTP错误。

pub mod error;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod service;

use axum::Router;
use std::sync::Arc;
use tower::ServiceBuilder;

use middleware::{cors_layer, request_logging, trace_layer};
pub use routes::{create_routes, AppState};
pub use service::ComputeService;

/// 创建完整的API应用
pub fn create_app(compute: Arc<ComputeService>) -> Router {
    create_routes(AppState { compute }).layer(
        ServiceBuilder::new()
            .layer(trace_layer())
            .layer(cors_layer())
            .layer(axum::middleware::from_fn(request_logging)),
    )
}
