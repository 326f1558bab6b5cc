use thiserror::Error;

/// # Summary
/// 快照抓取失败的错误分类。
///
/// # Invariants
/// - 必须通过 `thiserror` 派生 `Error` trait。
/// - 三种错误对调用方的处理策略完全一致：记录日志，保留已有快照。
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    // 网络层错误 (连接失败、DNS、超时)
    #[error("Network error: {0}")]
    Network(String),
    // 服务端返回非 2xx 状态码
    #[error("HTTP status error: {0}")]
    HttpStatus(u16),
    // 响应体不是合法 JSON 或结构不匹配
    #[error("Parse error: {0}")]
    Parse(String),
}
