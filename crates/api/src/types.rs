//! # DTO (Data Transfer Object) 层
//!
//! 将投影结果转化为面向前端 JSON 输出的轻量结构体。
//! 所有 DTO 必须派生 `utoipa::ToSchema` 以自动进入 Swagger 文档。
//! 金额以字符串形式给出原值，另附 `*_display` 展示字段，二者互不替代。

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use tzarfat_core::analytics::entity::TradeSide;
use tzarfat_core::common::format::{format_percent, format_signed_usd, format_usd};
use tzarfat_core::view::projection::{
    AllocationEntry, PortfolioPoint, RankedHolding, RecentTrade, SummaryView,
};
use tzarfat_core::view::state::{RefreshStats, ViewState};

// ============================================================
//  状态相关 DTO
// ============================================================

/// 看板加载状态 DTO
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct StateResponse {
    /// 状态 (loading / ready / error)
    #[schema(example = "ready")]
    pub status: String,
    /// 当前快照的抓取时间 (ISO 8601)
    #[schema(example = "2026-03-01T10:00:00Z")]
    pub fetched_at: Option<String>,
    /// 最近一次刷新失败，展示的数据可能已过期
    #[schema(example = false)]
    pub stale: bool,
    /// 错误信息 (error 状态，或过期时的最近一次失败原因)
    pub error: Option<String>,
}

/// 刷新统计 DTO
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct StatsResponse {
    /// 已发起的抓取次数
    #[schema(example = 12)]
    pub issued: u64,
    /// 被采纳的成功结果数
    #[schema(example = 11)]
    pub applied: u64,
    /// 被采纳的失败结果数
    #[schema(example = 1)]
    pub failed: u64,
    /// 因过期或已释放而丢弃的结果数
    #[schema(example = 0)]
    pub discarded: u64,
    /// 最近一次成功时间 (ISO 8601)
    pub last_success_at: Option<String>,
    /// 最近一次失败原因 (成功后清空)
    pub last_error: Option<String>,
}

// ============================================================
//  面板相关 DTO
// ============================================================

/// 汇总指标 DTO - 对应总览页顶部指标卡片
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SummaryResponse {
    /// 总资产
    #[schema(example = "100000")]
    pub total_assets: String,
    #[schema(example = "$100,000.00")]
    pub total_assets_display: String,
    /// 总盈亏
    #[schema(example = "2000")]
    pub total_profit: String,
    #[schema(example = "+$2,000.00")]
    pub total_profit_display: String,
    /// 今日成交笔数
    #[schema(example = 1)]
    pub today_trade_count: u64,
}

/// 最近成交 DTO
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TradeResponse {
    /// 成交 ID
    #[schema(example = 1)]
    pub id: i64,
    /// 股票代码
    #[schema(example = "AAPL")]
    pub ticker: String,
    /// 服务端原始方向标签
    #[serde(rename = "type")]
    #[schema(example = "Покупка")]
    pub trade_type: String,
    /// 归类后的方向 (Buy / Sell / Other)，仅用于着色
    #[schema(example = "Buy")]
    pub side: String,
    /// 成交数量
    #[schema(example = 10)]
    pub qty: u64,
    /// 成交价
    #[schema(example = "150.5")]
    pub price: String,
    #[schema(example = "$150.50")]
    pub price_display: String,
    /// 成交额
    #[schema(example = "1505")]
    pub total: String,
    #[schema(example = "$1,505.00")]
    pub total_display: String,
    /// 成交时间 (服务端格式化的展示串)
    #[schema(example = "10:32")]
    pub time: String,
}

/// 组合估值点 DTO
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PortfolioPointResponse {
    /// 周期标签
    #[schema(example = "Jan")]
    pub period: String,
    /// 估值
    #[schema(example = "100000")]
    pub value: String,
    #[schema(example = "$100,000.00")]
    pub value_display: String,
    /// 盈亏
    #[schema(example = "2000")]
    pub profit: String,
    #[schema(example = "+$2,000.00")]
    pub profit_display: String,
}

/// 资产配置 DTO
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AllocationResponse {
    /// 资产类别
    #[schema(example = "Stocks")]
    pub asset: String,
    /// 占比
    #[schema(example = "60")]
    pub percent: String,
    #[schema(example = "60%")]
    pub percent_display: String,
    /// 市值
    #[schema(example = "60000")]
    pub value: String,
    #[schema(example = "$60,000.00")]
    pub value_display: String,
    /// 配色槽位 (0..=3)，超出固定槽位时为 null，按中性样式渲染
    #[schema(example = 0)]
    pub slot: Option<usize>,
}

/// 重仓持股 DTO
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct HoldingResponse {
    /// 排名 (从 1 开始，按服务端顺序)
    #[schema(example = 1)]
    pub rank: usize,
    /// 股票代码
    #[schema(example = "AAPL")]
    pub ticker: String,
    /// 名称
    #[schema(example = "Apple")]
    pub name: String,
    /// 涨跌幅 (服务端格式化)
    #[schema(example = "+5%")]
    pub change: String,
    /// 市值
    #[schema(example = "6000")]
    pub value: String,
    #[schema(example = "$6,000.00")]
    pub value_display: String,
}

/// 标签页面板集合 DTO
///
/// 只有该标签页用到的面板才会出现在响应中。
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TabResponse {
    /// 标签页名称
    #[schema(example = "dashboard")]
    pub tab: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<SummaryResponse>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub portfolio: Option<Vec<PortfolioPointResponse>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trades: Option<Vec<TradeResponse>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allocation: Option<Vec<AllocationResponse>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub holdings: Option<Vec<HoldingResponse>>,
}

// ============================================================
//  通用响应 DTO
// ============================================================

/// 统一 API 响应包装器
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ApiResponse<T: Serialize + ToSchema> {
    /// 是否成功
    pub success: bool,
    /// 数据载荷 (成功时)
    pub data: Option<T>,
    /// 错误信息 (失败时)
    pub error: Option<String>,
}

impl<T: Serialize + ToSchema> ApiResponse<T> {
    /// 构建成功响应
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }
}

/// 构建失败响应 (不含泛型载荷)
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ApiErrorResponse {
    /// 固定为 false
    pub success: bool,
    /// 固定为 null
    #[schema(value_type = Option<Object>)]
    pub data: Option<serde_json::Value>,
    /// 错误描述信息
    pub error: String,
}

impl ApiErrorResponse {
    /// 从错误信息构建
    pub fn from_msg(msg: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: msg.into(),
        }
    }
}

// ============================================================
//  领域模型 → DTO 惯用转换 (impl From<T>)
// ============================================================

fn raw(value: Decimal) -> String {
    value.to_string()
}

impl From<&ViewState> for StateResponse {
    fn from(state: &ViewState) -> Self {
        let (fetched_at, stale, error) = match state {
            ViewState::Ready(ready) => (
                Some(ready.fetched_at.to_rfc3339()),
                ready.is_stale(),
                ready.last_error.clone(),
            ),
            ViewState::Error(msg) => (None, false, Some(msg.clone())),
            ViewState::Uninitialized | ViewState::Loading => (None, false, None),
        };
        Self {
            status: state.label().to_string(),
            fetched_at,
            stale,
            error,
        }
    }
}

impl From<RefreshStats> for StatsResponse {
    fn from(s: RefreshStats) -> Self {
        Self {
            issued: s.issued,
            applied: s.applied,
            failed: s.failed,
            discarded: s.discarded,
            last_success_at: s.last_success_at.map(|t| t.to_rfc3339()),
            last_error: s.last_error,
        }
    }
}

impl From<SummaryView> for SummaryResponse {
    fn from(s: SummaryView) -> Self {
        Self {
            total_assets: raw(s.total_assets),
            total_assets_display: format_usd(s.total_assets),
            total_profit: raw(s.total_profit),
            total_profit_display: format_signed_usd(s.total_profit),
            today_trade_count: s.today_trade_count,
        }
    }
}

impl From<RecentTrade> for TradeResponse {
    fn from(t: RecentTrade) -> Self {
        let side = format!("{:?}", TradeSide::from_label(&t.trade_type));
        Self {
            id: t.id,
            ticker: t.ticker,
            trade_type: t.trade_type,
            side,
            qty: t.qty,
            price: raw(t.price),
            price_display: format_usd(t.price),
            total: raw(t.total),
            total_display: format_usd(t.total),
            time: t.time,
        }
    }
}

impl From<PortfolioPoint> for PortfolioPointResponse {
    fn from(p: PortfolioPoint) -> Self {
        Self {
            period: p.period,
            value: raw(p.value),
            value_display: format_usd(p.value),
            profit: raw(p.profit),
            profit_display: format_signed_usd(p.profit),
        }
    }
}

impl From<AllocationEntry> for AllocationResponse {
    fn from(a: AllocationEntry) -> Self {
        Self {
            asset: a.asset,
            percent: raw(a.percent),
            percent_display: format_percent(a.percent),
            value: raw(a.value),
            value_display: format_usd(a.value),
            slot: a.slot,
        }
    }
}

impl From<RankedHolding> for HoldingResponse {
    fn from(h: RankedHolding) -> Self {
        Self {
            rank: h.rank,
            ticker: h.ticker,
            name: h.name,
            change: h.change,
            value: raw(h.value),
            value_display: format_usd(h.value),
        }
    }
}
