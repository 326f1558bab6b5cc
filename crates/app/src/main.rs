use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use tracing::{error, info};
use tzarfat_api::server::{AppState, start_server};
use tzarfat_core::analytics::port::Dashboard;
use tzarfat_core::common::time::RealTimeProvider;
use tzarfat_dashboard::refresh::DashboardImpl;
use tzarfat_feed::http::HttpSnapshotSource;

mod logging;
mod settings;

/// # Summary
/// 应用启动入口，纯粹的 DI 容器。
/// 负责实例化所有具体实现组件并通过 Arc<dyn Trait> 注入到 API 层。
///
/// # Logic
/// 1. 加载并校验配置。
/// 2. 初始化全局日志。
/// 3. 实例化基础设施层（HTTP 数据源）。
/// 4. 启动看板聚合根（立即抓取一次并开始定时刷新）。
/// 5. 启动 API 服务，挂起直到收到退出信号。
/// 6. 释放看板，取消定时器与在途请求。
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. 加载配置
    let config = settings::load(Path::new(settings::CONFIG_FILE))?;
    config.validate()?;

    // 2. 初始化日志
    let _log_guard = logging::init(&config.log)?;
    info!("Tzarfat dashboard starting...");

    // 3. 实例化基础设施层
    let source = Arc::new(HttpSnapshotSource::new(&config.feed)?);
    info!(
        "Polling {} every {}ms (timeout {}s)",
        source.endpoint(),
        config.refresh.interval_ms,
        config.feed.timeout_secs
    );

    // 4. 启动看板
    let dashboard = DashboardImpl::start(
        source,
        Duration::from_millis(config.refresh.interval_ms),
        Arc::new(RealTimeProvider),
    );

    // 5. 挂起主线程，等待外部退出信号
    let state = AppState {
        dashboard: dashboard.clone(),
    };
    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for shutdown signal: {}", e);
        }
        info!("Shutdown signal received. Exiting...");
    };
    let served = start_server(state, &config.bind_addr(), shutdown).await;

    // 6. 释放看板
    dashboard.dispose();
    served
}
