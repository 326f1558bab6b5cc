//! # API 服务启动器
//!
//! 组装 axum 路由、挂载 Swagger UI、配置 CORS 并绑定 TCP 端口对外提供服务。
//! 本模块不直接启动 `main()`, 而是由 `crates/app` 的 DI 容器持有并调用。

use std::future::Future;
use std::sync::Arc;

use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use utoipa::OpenApi;
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;
use utoipa_swagger_ui::SwaggerUi;

use tzarfat_core::analytics::port::Dashboard;

use crate::routes::dashboard;

// ============================================================
//  共享应用状态
// ============================================================

/// 全局应用状态，通过 axum 的 `State` 提取器注入到每个 Handler 中。
///
/// # Invariants
/// - `dashboard` 在服务启动前由 DI 容器注入，生命周期与进程等同。
/// - Handler 只读取状态，从不写入快照。
#[derive(Clone)]
pub struct AppState {
    /// 看板聚合根 (持有唯一的视图状态)
    pub dashboard: Arc<dyn Dashboard>,
}

// ============================================================
//  OpenAPI 文档定义
// ============================================================

/// 全局 OpenAPI 文档结构
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Tzarfat 投资分析看板 API",
        version = "0.1.0",
        description = "定时拉取远端分析数据，按面板与标签页输出可直接渲染的投影结果。"
    ),
    tags(
        (name = "看板 (Dashboard)", description = "加载状态、汇总指标、成交、组合走势、资产配置与重仓持股")
    )
)]
pub struct ApiDoc;

// ============================================================
//  服务构建与启动
// ============================================================

/// # Summary
/// 构建完整的 axum 应用路由树。
///
/// # Logic
/// 1. 注册看板路由并自动收集 OpenAPI 文档。
/// 2. 挂载 Swagger UI。
/// 3. 配置 CORS (允许所有来源)。
///
/// # Arguments
/// * `state` - 由外部 DI 容器注入的共享状态
pub fn build_router(state: AppState) -> Router {
    let (router, api) = OpenApiRouter::with_openapi(ApiDoc::openapi())
        .routes(routes!(dashboard::get_state))
        .routes(routes!(dashboard::get_stats))
        .routes(routes!(dashboard::get_summary))
        .routes(routes!(dashboard::get_trades))
        .routes(routes!(dashboard::get_portfolio))
        .routes(routes!(dashboard::get_allocation))
        .routes(routes!(dashboard::get_holdings))
        .routes(routes!(dashboard::get_tab))
        .with_state(state)
        .split_for_parts();

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    router
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", api))
        .layer(cors)
}

/// 绑定端口并启动 HTTP 服务，直到 `shutdown` 完成后优雅退出。
///
/// # Arguments
/// * `state` - 由外部 DI 容器注入的共享状态
/// * `bind_addr` - 监听的地址与端口，如 `"0.0.0.0:8080"`
/// * `shutdown` - 退出信号
///
/// # Returns
/// 端口绑定或服务运行失败时返回错误。
pub async fn start_server<F>(
    state: AppState,
    bind_addr: &str,
    shutdown: F,
) -> Result<(), Box<dyn std::error::Error>>
where
    F: Future<Output = ()> + Send + 'static,
{
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(bind_addr).await?;
    tracing::info!("Tzarfat API server listening on {}", listener.local_addr()?);
    tracing::info!("Swagger UI: http://{}/swagger-ui/", bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;

    tracing::info!("Tzarfat API server stopped");
    Ok(())
}
