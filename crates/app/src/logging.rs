use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, fmt};
use tzarfat_core::config::LogConfig;

/// # Summary
/// 初始化全局日志。
///
/// # Logic
/// 1. 过滤规则优先取 `RUST_LOG`，否则使用配置中的级别。
/// 2. 始终输出到终端。
/// 3. 配置了 `dir` 时额外按天滚动写入 `tzarfat.log`。
///
/// # Returns
/// 写文件时返回后台写线程的守卫，调用方必须持有到进程退出。
pub fn init(config: &LogConfig) -> Result<Option<WorkerGuard>, Box<dyn std::error::Error>> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&config.level)?,
    };

    let registry = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(true));

    match &config.dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "tzarfat.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            registry
                .with(fmt::layer().with_ansi(false).with_writer(writer))
                .try_init()?;
            Ok(Some(guard))
        }
        None => {
            registry.try_init()?;
            Ok(None)
        }
    }
}
