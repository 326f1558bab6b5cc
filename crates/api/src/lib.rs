//! # `tzarfat-api` - 看板视图层
//!
//! 本 crate 是 Tzarfat 投资分析看板的 HTTP/REST 出口。
//! 使用 `axum` 构建路由与控制器，通过 `utoipa` 自动生成 OpenAPI 3.0 Swagger 文档。
//!
//! ## 架构职责
//! - 读取 `Dashboard` 当前持有的视图状态
//! - 调用 core 中的投影函数得到各面板所需的记录
//! - 附加展示用的格式化字符串后以 JSON 返回，原始数值保持不变

pub mod types;
pub mod error;
pub mod routes;
pub mod server;
