use serde::{Deserialize, Serialize};
use thiserror::Error;

/// 原部署使用的固定数据端点
pub const DEFAULT_ENDPOINT: &str =
    "https://functions.poehali.dev/1cbe5175-57ec-4d6b-bfa8-646c275977a5";

/// 默认刷新间隔 (毫秒)，按请求发起时刻计算
pub const DEFAULT_REFRESH_INTERVAL_MS: u64 = 30_000;

/// 配置校验错误
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid config value `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// 全局应用配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub feed: FeedConfig,
    pub refresh: RefreshConfig,
    pub log: LogConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// 数据源配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedConfig {
    pub endpoint: String,
    // 单次请求超时，必须短于刷新间隔
    pub timeout_secs: u64,
    pub user_agent: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshConfig {
    pub interval_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    // EnvFilter 语法，RUST_LOG 优先
    pub level: String,
    // 为空时只输出到终端
    pub dir: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 8080,
            },
            feed: FeedConfig {
                endpoint: DEFAULT_ENDPOINT.to_string(),
                timeout_secs: 10,
                user_agent: "tzarfat-dashboard/0.1.0".to_string(),
            },
            refresh: RefreshConfig {
                interval_ms: DEFAULT_REFRESH_INTERVAL_MS,
            },
            log: LogConfig {
                level: "info".to_string(),
                dir: None,
            },
        }
    }
}

impl AppConfig {
    /// # Summary
    /// 校验配置的取值范围。
    ///
    /// # Logic
    /// 1. 刷新间隔与请求超时均不能为 0。
    /// 2. 请求超时必须严格短于刷新间隔，保证稳态下最多一个在途请求。
    /// 3. 端点不能为空。
    ///
    /// # Returns
    /// 合法返回 Ok，否则返回第一个不合法字段。
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.refresh.interval_ms == 0 {
            return Err(ConfigError::Invalid {
                field: "refresh.interval_ms",
                reason: "must be greater than zero".to_string(),
            });
        }
        if self.feed.timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                field: "feed.timeout_secs",
                reason: "must be greater than zero".to_string(),
            });
        }
        if self.feed.timeout_secs.saturating_mul(1000) >= self.refresh.interval_ms {
            return Err(ConfigError::Invalid {
                field: "feed.timeout_secs",
                reason: format!(
                    "{}s is not shorter than the refresh interval of {}ms",
                    self.feed.timeout_secs, self.refresh.interval_ms
                ),
            });
        }
        if self.feed.endpoint.trim().is_empty() {
            return Err(ConfigError::Invalid {
                field: "feed.endpoint",
                reason: "must not be empty".to_string(),
            });
        }
        Ok(())
    }

    /// 服务监听地址，如 `"0.0.0.0:8080"`。
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
