use std::time::Duration;

use axum::{extract::rejection::JsonRejection, extract::State, Json};
use serde::Deserialize;
use tracing::info;

use flint_core::DispatchResult;

use crate::error::ApiError;
use crate::routes::AppState;

#[derive(Debug, Deserialize)]
pub struct AddRequest {
    pub x: i64,
    pub y: i64,
    /// 本次调用的截止时间，缺省使用配置值
    #[serde(default)]
    pub timeout_ms: Option<u64>,
}

/// 计算结果总是以 `{success, result}` 返回，调度失败不是HTTP错误
pub async fn compute_add(
    State(state): State<AppState>,
    payload: Result<Json<AddRequest>, JsonRejection>,
) -> Result<Json<DispatchResult>, ApiError> {
    let Json(request) = payload?;

    let timeout = match request.timeout_ms {
        Some(0) => {
            return Err(ApiError::BadRequest("timeout_ms 必须大于0".to_string()));
        }
        Some(ms) => Some(Duration::from_millis(ms)),
        None => None,
    };

    let result = state.compute.compute_add(request.x, request.y, timeout).await;
    info!(
        "compute_add({}, {}) -> success={} result={}",
        request.x, request.y, result.success, result.result
    );

    Ok(Json(result))
}
