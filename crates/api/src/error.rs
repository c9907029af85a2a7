use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("请求体解析失败: {0}")]
    InvalidBody(#[from] JsonRejection),

    #[error("请求参数错误: {0}")]
    BadRequest(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_message, error_type, suggestions) = match &self {
            ApiError::InvalidBody(rejection) => (
                rejection.status(),
                rejection.body_text(),
                "INVALID_BODY",
                vec![
                    "请检查JSON格式是否正确".to_string(),
                    "请求体需要包含整数字段 x 和 y".to_string(),
                ],
            ),
            ApiError::BadRequest(msg) => (
                StatusCode::BAD_REQUEST,
                format!("请求参数错误: {}", msg),
                "BAD_REQUEST",
                vec!["请检查请求格式和参数".to_string()],
            ),
        };

        let body = Json(json!({
            "success": false,
            "error": {
                "message": error_message,
                "type": error_type,
                "code": status.as_u16(),
                "suggestions": suggestions,
            }
        }));

        (status, body).into_response()
    }
}
