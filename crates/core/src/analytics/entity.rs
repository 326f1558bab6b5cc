use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// # Summary
/// 单笔已成交的委托记录。
///
/// # Invariants
/// - `id` 由服务端分配且在同一快照内唯一。
/// - `quantity` 与 `price` 必须为正数。
/// - `total` 预期等于 `quantity × price`，客户端不做校验。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trade {
    // 服务端分配的成交编号
    pub id: i64,
    // 证券代码 (例如: AAPL)
    pub ticker: String,
    // 交易方向标签，原样透传 (例如: "Покупка", "buy")
    pub trade_type: String,
    // 成交数量
    pub quantity: u64,
    // 成交单价
    pub price: Decimal,
    // 成交总额
    pub total: Decimal,
    // 成交时间，仅用于展示的不透明字符串 (例如: "10:32")
    pub time: String,
}

impl Trade {
    /// 根据 `trade_type` 标签推断交易方向。
    pub fn side(&self) -> TradeSide {
        TradeSide::from_label(&self.trade_type)
    }
}

/// # Summary
/// 交易方向的归类结果，仅用于展示着色，不改变原始标签。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TradeSide {
    /// 买入
    Buy,
    /// 卖出
    Sell,
    /// 无法识别的标签
    Other,
}

impl TradeSide {
    /// # Summary
    /// 将服务端的自由文本标签归类为交易方向。
    ///
    /// # Logic
    /// 1. 去除首尾空白并转为小写。
    /// 2. 匹配已知的买入/卖出标签（俄文与英文）。
    /// 3. 其余一律归为 `Other`。
    ///
    /// # Arguments
    /// * `label`: 服务端返回的 `trade_type` 字段。
    ///
    /// # Returns
    /// 归类后的 `TradeSide`。
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_lowercase().as_str() {
            "покупка" | "buy" | "long" => TradeSide::Buy,
            "продажа" | "sell" | "short" => TradeSide::Sell,
            _ => TradeSide::Other,
        }
    }
}

/// # Summary
/// 按时间分桶的组合估值点。
///
/// # Invariants
/// - 序列顺序即展示顺序（时间正序），客户端不重新排序。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortfolioSnapshot {
    // 周期标签 (例如: 月份缩写 "Jan")
    pub period: String,
    // 组合总估值
    pub value: Decimal,
    // 周期盈亏，可为负
    pub profit: Decimal,
}

/// # Summary
/// 单条资产配置记录。
///
/// # Invariants
/// - `percent` 位于 0..=100 区间。
/// - 不强制所有条目的百分比之和为 100。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Asset {
    // 资产类别标签
    pub asset: String,
    // 占比 (0-100)
    pub percent: Decimal,
    // 该类别市值
    pub value: Decimal,
}

/// # Summary
/// 排名靠前的持仓。
///
/// # Invariants
/// - 排名由服务端顺序决定，客户端不排序。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopHolding {
    // 证券代码
    pub ticker: String,
    // 展示名称
    pub name: String,
    // 服务端预先格式化的涨跌幅 (例如: "+5%")
    pub change: String,
    // 当前市值
    pub value: Decimal,
    // 所属板块，可能缺省
    pub sector: Option<String>,
}

/// 汇总指标组。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    // 总资产
    pub total_assets: Decimal,
    // 总盈亏
    pub total_profit: Decimal,
    // 今日成交笔数
    pub today_trades: u64,
}

/// # Summary
/// 一次成功抓取得到的完整分析数据，是整个视图的聚合根。
///
/// # Invariants
/// - 内存中同一时刻只持有一个快照。
/// - 新快照整体替换旧快照，不做合并或增量更新。
/// - 客户端只读，所有数值均来自外部服务。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalyticsSnapshot {
    // 最近成交
    pub trades: Vec<Trade>,
    // 组合估值时间序列
    pub portfolio: Vec<PortfolioSnapshot>,
    // 资产配置
    pub assets: Vec<Asset>,
    // 重仓持股
    pub top_holdings: Vec<TopHolding>,
    // 汇总指标
    pub summary: Summary,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trade_side_from_label() {
        assert_eq!(TradeSide::from_label("Покупка"), TradeSide::Buy);
        assert_eq!(TradeSide::from_label("ПРОДАЖА"), TradeSide::Sell);
        assert_eq!(TradeSide::from_label(" buy "), TradeSide::Buy);
        assert_eq!(TradeSide::from_label("Sell"), TradeSide::Sell);
        assert_eq!(TradeSide::from_label("transfer"), TradeSide::Other);
        assert_eq!(TradeSide::from_label(""), TradeSide::Other);
    }
}
