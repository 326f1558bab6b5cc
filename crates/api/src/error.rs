//! # API 统一错误处理
//!
//! 将看板未就绪、上游失败与路径错误统一映射到 HTTP 状态码与 JSON 响应体。

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;

use crate::types::ApiErrorResponse;

/// API 层统一错误枚举
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// 首次抓取尚未完成 (503)
    #[error("数据加载中: {0}")]
    NotReady(String),

    /// 首次抓取失败，尚无任何可展示的快照 (502)
    #[error("上游数据源错误: {0}")]
    Upstream(String),

    /// 资源未找到 (404)
    #[error("资源未找到: {0}")]
    NotFound(String),
}

/// 将 `ApiError` 转换为 axum 的 HTTP 响应
impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ApiError::NotReady(msg) => (StatusCode::SERVICE_UNAVAILABLE, msg.clone()),
            ApiError::Upstream(msg) => (StatusCode::BAD_GATEWAY, msg.clone()),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
        };

        let body = Json(ApiErrorResponse::from_msg(message));
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (ApiError::NotReady("x".into()), StatusCode::SERVICE_UNAVAILABLE),
            (ApiError::Upstream("x".into()), StatusCode::BAD_GATEWAY),
            (ApiError::NotFound("x".into()), StatusCode::NOT_FOUND),
        ];
        for (err, status) in cases {
            assert_eq!(err.into_response().status(), status);
        }
    }
}
