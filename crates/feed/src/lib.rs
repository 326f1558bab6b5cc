//! # Tzarfat Feed
//!
//! 分析数据快照的 HTTP 数据源实现。

pub mod http;
