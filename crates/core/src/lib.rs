//! # Tzarfat Core
//!
//! 投资分析看板的领域层：实体、错误、端口 (Port)、视图投影与展示格式化。
//! 本 crate 不做任何 I/O，具体实现由 feed / dashboard / api 提供。

pub mod analytics {
    pub mod entity;
    pub mod error;
    pub mod port;
}

pub mod common;
pub mod config;

pub mod view {
    pub mod projection;
    pub mod state;
}

#[cfg(feature = "test-utils")]
pub mod testing;
