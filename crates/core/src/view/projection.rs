//! # 视图投影 (ViewProjector)
//!
//! 将快照映射为各面板所需的扁平展示记录。全部为纯函数：
//! 无副作用、无随机性、保持输入顺序，且不在客户端做任何排序。

use crate::analytics::entity::AnalyticsSnapshot;
use rust_decimal::Decimal;
use serde::Serialize;

/// 资产配置面板中有固定样式的槽位数量
pub const ALLOCATION_SLOTS: usize = 4;

/// 最近成交面板的一行。
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecentTrade {
    pub id: i64,
    pub ticker: String,
    #[serde(rename = "type")]
    pub trade_type: String,
    pub qty: u64,
    pub price: Decimal,
    pub total: Decimal,
    pub time: String,
}

/// 组合走势图的一个数据点。
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PortfolioPoint {
    pub period: String,
    pub value: Decimal,
    pub profit: Decimal,
}

/// # Summary
/// 资产配置面板的一行。
///
/// # Invariants
/// - `slot` 只由位置决定：前 `ALLOCATION_SLOTS` 条为 `Some(index)`，其后为 `None`（中性样式）。
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AllocationEntry {
    pub asset: String,
    pub percent: Decimal,
    pub value: Decimal,
    pub slot: Option<usize>,
}

/// # Summary
/// 重仓持股面板的一行。
///
/// # Invariants
/// - `rank` 为服务端顺序中的位置 (从 1 开始)，与 `change`、`value` 无关。
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RankedHolding {
    pub rank: usize,
    pub ticker: String,
    pub name: String,
    pub change: String,
    pub value: Decimal,
}

/// 顶部汇总指标。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SummaryView {
    pub total_assets: Decimal,
    pub total_profit: Decimal,
    pub today_trade_count: u64,
}

/// 最近成交：字段重命名后原样透传，保持顺序。
pub fn project_recent_trades(snapshot: &AnalyticsSnapshot) -> Vec<RecentTrade> {
    snapshot
        .trades
        .iter()
        .map(|t| RecentTrade {
            id: t.id,
            ticker: t.ticker.clone(),
            trade_type: t.trade_type.clone(),
            qty: t.quantity,
            price: t.price,
            total: t.total,
            time: t.time.clone(),
        })
        .collect()
}

/// 组合时间序列：按服务端给定的时间顺序透传。
pub fn project_portfolio_series(snapshot: &AnalyticsSnapshot) -> Vec<PortfolioPoint> {
    snapshot
        .portfolio
        .iter()
        .map(|p| PortfolioPoint {
            period: p.period.clone(),
            value: p.value,
            profit: p.profit,
        })
        .collect()
}

/// # Summary
/// 资产配置：透传并按位置分配样式槽位。
///
/// # Logic
/// 1. 按输入顺序遍历。
/// 2. 下标小于 `ALLOCATION_SLOTS` 的条目获得同名槽位，其余为 `None`。
pub fn project_allocation(snapshot: &AnalyticsSnapshot) -> Vec<AllocationEntry> {
    snapshot
        .assets
        .iter()
        .enumerate()
        .map(|(idx, a)| AllocationEntry {
            asset: a.asset.clone(),
            percent: a.percent,
            value: a.value,
            slot: (idx < ALLOCATION_SLOTS).then_some(idx),
        })
        .collect()
}

/// # Summary
/// 重仓持股：按位置赋予排名。
///
/// # Logic
/// 第 i 个元素 (从 0 开始) 的排名为 `i + 1`，不做排序。
pub fn project_top_holdings(snapshot: &AnalyticsSnapshot) -> Vec<RankedHolding> {
    snapshot
        .top_holdings
        .iter()
        .enumerate()
        .map(|(idx, h)| RankedHolding {
            rank: idx + 1,
            ticker: h.ticker.clone(),
            name: h.name.clone(),
            change: h.change.clone(),
            value: h.value,
        })
        .collect()
}

/// 汇总指标：透传。
pub fn project_summary(snapshot: &AnalyticsSnapshot) -> SummaryView {
    SummaryView {
        total_assets: snapshot.summary.total_assets,
        total_profit: snapshot.summary.total_profit,
        today_trade_count: snapshot.summary.today_trades,
    }
}
