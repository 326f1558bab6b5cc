//! 配置加载：内置默认值 < 配置文件 < 环境变量。

use std::collections::HashMap;
use std::path::Path;

use config::{Config, ConfigError, Environment, File};
use tzarfat_core::config::AppConfig;

/// 默认配置文件路径 (可选，不存在时忽略)
pub const CONFIG_FILE: &str = "config/tzarfat.toml";

/// 环境变量前缀，层级以 `__` 分隔，例如 `TZARFAT__REFRESH__INTERVAL_MS`
pub const ENV_PREFIX: &str = "TZARFAT";

/// # Summary
/// 从配置文件与进程环境变量加载配置。
///
/// # Arguments
/// * `file`: 配置文件路径，文件不存在时只使用默认值与环境变量。
pub fn load(file: &Path) -> Result<AppConfig, ConfigError> {
    build(file, None)
}

/// # Summary
/// 按优先级合并各配置来源。
///
/// # Logic
/// 1. 以 `AppConfig::default()` 作为最底层。
/// 2. 叠加可选的配置文件 (格式按扩展名推断)。
/// 3. 叠加 `TZARFAT__*` 环境变量；`env` 为 Some 时用给定的映射代替进程环境。
///
/// # Returns
/// 合并并反序列化后的配置，尚未做取值校验。
fn build(file: &Path, env: Option<HashMap<String, String>>) -> Result<AppConfig, ConfigError> {
    Config::builder()
        .add_source(Config::try_from(&AppConfig::default())?)
        .add_source(File::from(file).required(false))
        .add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true)
                .source(env),
        )
        .build()?
        .try_deserialize()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_missing_file_yields_defaults() {
        let config = build(Path::new("does/not/exist.toml"), Some(HashMap::new())).unwrap();
        assert_eq!(config.refresh.interval_ms, 30_000);
        assert_eq!(config.server.port, 8080);
        assert!(config.log.dir.is_none());
    }

    #[test]
    fn test_file_overrides_defaults() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            "[server]\nport = 9090\n\n[feed]\nendpoint = \"http://localhost:3000/analytics\"\n\n[log]\ndir = \"logs\""
        )
        .unwrap();

        let config = build(file.path(), Some(HashMap::new())).unwrap();
        assert_eq!(config.server.port, 9090);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.feed.endpoint, "http://localhost:3000/analytics");
        assert_eq!(config.feed.timeout_secs, 10);
        assert_eq!(config.log.dir.as_deref(), Some("logs"));
    }

    #[test]
    fn test_env_overrides_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "[refresh]\ninterval_ms = 60000").unwrap();

        let env = HashMap::from([
            ("TZARFAT__REFRESH__INTERVAL_MS".to_string(), "5000".to_string()),
            ("TZARFAT__FEED__TIMEOUT_SECS".to_string(), "2".to_string()),
            ("OTHER__REFRESH__INTERVAL_MS".to_string(), "1".to_string()),
        ]);
        let config = build(file.path(), Some(env)).unwrap();
        assert_eq!(config.refresh.interval_ms, 5000);
        assert_eq!(config.feed.timeout_secs, 2);
        assert!(config.validate().is_ok());
    }
}
