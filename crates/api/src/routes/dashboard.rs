//! # 看板路由控制器
//!
//! 实现 `/api/v1/dashboard/*` 路径下的 REST 接口。
//! 每个面板一个接口，另有按标签页打包的聚合接口；数据均来自当前快照的投影。

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::Json;

use tzarfat_core::analytics::entity::AnalyticsSnapshot;
use tzarfat_core::common::Tab;
use tzarfat_core::view::projection::{
    project_allocation, project_portfolio_series, project_recent_trades, project_summary,
    project_top_holdings,
};
use tzarfat_core::view::state::ViewState;

use crate::error::ApiError;
use crate::server::AppState;
use crate::types::{
    AllocationResponse, ApiResponse, HoldingResponse, PortfolioPointResponse, StateResponse,
    StatsResponse, SummaryResponse, TabResponse, TradeResponse,
};

/// # Summary
/// 取出当前可展示的快照。
///
/// # Logic
/// 1. `Ready` (含过期) 直接返回快照。
/// 2. 尚未完成首次抓取返回 `NotReady`。
/// 3. 首次抓取失败返回 `Upstream`，提示用户重新加载。
fn current_snapshot(state: &AppState) -> Result<Arc<AnalyticsSnapshot>, ApiError> {
    match state.dashboard.state() {
        ViewState::Ready(ready) => Ok(ready.snapshot),
        ViewState::Uninitialized | ViewState::Loading => Err(ApiError::NotReady(
            "Analytics data is still loading, retry shortly".to_string(),
        )),
        ViewState::Error(msg) => Err(ApiError::Upstream(format!(
            "Failed to load analytics data ({}). Reload the page to retry",
            msg
        ))),
    }
}

fn summary(snapshot: &AnalyticsSnapshot) -> SummaryResponse {
    project_summary(snapshot).into()
}

fn trades(snapshot: &AnalyticsSnapshot) -> Vec<TradeResponse> {
    project_recent_trades(snapshot)
        .into_iter()
        .map(Into::into)
        .collect()
}

fn portfolio(snapshot: &AnalyticsSnapshot) -> Vec<PortfolioPointResponse> {
    project_portfolio_series(snapshot)
        .into_iter()
        .map(Into::into)
        .collect()
}

fn allocation(snapshot: &AnalyticsSnapshot) -> Vec<AllocationResponse> {
    project_allocation(snapshot)
        .into_iter()
        .map(Into::into)
        .collect()
}

fn holdings(snapshot: &AnalyticsSnapshot) -> Vec<HoldingResponse> {
    project_top_holdings(snapshot)
        .into_iter()
        .map(Into::into)
        .collect()
}

/// 获取看板加载状态
///
/// 任何状态下都返回 200；`stale` 为 true 表示最近一次刷新失败、展示的是旧数据。
#[utoipa::path(
    get,
    path = "/api/v1/dashboard/state",
    tag = "看板 (Dashboard)",
    responses(
        (status = 200, description = "当前状态", body = ApiResponse<StateResponse>)
    )
)]
pub async fn get_state(State(state): State<AppState>) -> Json<ApiResponse<StateResponse>> {
    let view = state.dashboard.state();
    Json(ApiResponse::ok(StateResponse::from(&view)))
}

/// 获取刷新统计
#[utoipa::path(
    get,
    path = "/api/v1/dashboard/stats",
    tag = "看板 (Dashboard)",
    responses(
        (status = 200, description = "刷新统计", body = ApiResponse<StatsResponse>)
    )
)]
pub async fn get_stats(State(state): State<AppState>) -> Json<ApiResponse<StatsResponse>> {
    Json(ApiResponse::ok(state.dashboard.stats().into()))
}

/// 获取汇总指标
///
/// 对应总览页顶部的总资产 / 总盈亏 / 今日成交卡片。
#[utoipa::path(
    get,
    path = "/api/v1/dashboard/summary",
    tag = "看板 (Dashboard)",
    responses(
        (status = 200, description = "汇总指标", body = ApiResponse<SummaryResponse>),
        (status = 503, description = "数据加载中"),
        (status = 502, description = "首次抓取失败")
    )
)]
pub async fn get_summary(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<SummaryResponse>>, ApiError> {
    let snapshot = current_snapshot(&state)?;
    Ok(Json(ApiResponse::ok(summary(&snapshot))))
}

/// 获取最近成交列表 (保持服务端顺序)
#[utoipa::path(
    get,
    path = "/api/v1/dashboard/trades",
    tag = "看板 (Dashboard)",
    responses(
        (status = 200, description = "最近成交", body = ApiResponse<Vec<TradeResponse>>),
        (status = 503, description = "数据加载中"),
        (status = 502, description = "首次抓取失败")
    )
)]
pub async fn get_trades(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<TradeResponse>>>, ApiError> {
    let snapshot = current_snapshot(&state)?;
    Ok(Json(ApiResponse::ok(trades(&snapshot))))
}

/// 获取组合估值走势 (保持时间顺序)
#[utoipa::path(
    get,
    path = "/api/v1/dashboard/portfolio",
    tag = "看板 (Dashboard)",
    responses(
        (status = 200, description = "组合走势", body = ApiResponse<Vec<PortfolioPointResponse>>),
        (status = 503, description = "数据加载中"),
        (status = 502, description = "首次抓取失败")
    )
)]
pub async fn get_portfolio(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<PortfolioPointResponse>>>, ApiError> {
    let snapshot = current_snapshot(&state)?;
    Ok(Json(ApiResponse::ok(portfolio(&snapshot))))
}

/// 获取资产配置
///
/// 前四项带有固定配色槽位，其余项 `slot` 为 null。
#[utoipa::path(
    get,
    path = "/api/v1/dashboard/allocation",
    tag = "看板 (Dashboard)",
    responses(
        (status = 200, description = "资产配置", body = ApiResponse<Vec<AllocationResponse>>),
        (status = 503, description = "数据加载中"),
        (status = 502, description = "首次抓取失败")
    )
)]
pub async fn get_allocation(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<AllocationResponse>>>, ApiError> {
    let snapshot = current_snapshot(&state)?;
    Ok(Json(ApiResponse::ok(allocation(&snapshot))))
}

/// 获取重仓持股 (按服务端顺序编排名次)
#[utoipa::path(
    get,
    path = "/api/v1/dashboard/holdings",
    tag = "看板 (Dashboard)",
    responses(
        (status = 200, description = "重仓持股", body = ApiResponse<Vec<HoldingResponse>>),
        (status = 503, description = "数据加载中"),
        (status = 502, description = "首次抓取失败")
    )
)]
pub async fn get_holdings(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<HoldingResponse>>>, ApiError> {
    let snapshot = current_snapshot(&state)?;
    Ok(Json(ApiResponse::ok(holdings(&snapshot))))
}

/// 获取标签页的全部面板
///
/// # Logic
/// 1. 解析标签页名称，未知名称返回 404。
/// 2. 取当前快照，未就绪时按加载/错误状态返回。
/// 3. 按标签页组合面板：
///    - dashboard: 汇总 + 组合走势 + 最近成交
///    - analytics: 组合走势
///    - reports: 最近成交
///    - portfolio: 资产配置 + 重仓持股
#[utoipa::path(
    get,
    path = "/api/v1/dashboard/tabs/{tab}",
    tag = "看板 (Dashboard)",
    params(
        ("tab" = String, Path, description = "标签页: dashboard / analytics / reports / portfolio")
    ),
    responses(
        (status = 200, description = "标签页面板", body = ApiResponse<TabResponse>),
        (status = 404, description = "未知标签页"),
        (status = 503, description = "数据加载中"),
        (status = 502, description = "首次抓取失败")
    )
)]
pub async fn get_tab(
    State(state): State<AppState>,
    Path(tab): Path<String>,
) -> Result<Json<ApiResponse<TabResponse>>, ApiError> {
    let tab: Tab = tab.parse().map_err(ApiError::NotFound)?;
    let snapshot = current_snapshot(&state)?;

    let mut response = TabResponse {
        tab: tab.to_string(),
        summary: None,
        portfolio: None,
        trades: None,
        allocation: None,
        holdings: None,
    };
    match tab {
        Tab::Dashboard => {
            response.summary = Some(summary(&snapshot));
            response.portfolio = Some(portfolio(&snapshot));
            response.trades = Some(trades(&snapshot));
        }
        Tab::Analytics => {
            response.portfolio = Some(portfolio(&snapshot));
        }
        Tab::Reports => {
            response.trades = Some(trades(&snapshot));
        }
        Tab::Portfolio => {
            response.allocation = Some(allocation(&snapshot));
            response.holdings = Some(holdings(&snapshot));
        }
    }

    Ok(Json(ApiResponse::ok(response)))
}
