use serde::{Deserialize, Serialize};
use std::str::FromStr;

pub mod format;
pub mod time;

/// # Summary
/// 看板的标签页枚举，决定渲染哪些面板。
///
/// # Invariants
/// - 无特定约束。
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Tab {
    // 总览：汇总指标、组合走势、最近成交
    Dashboard,
    // 分析：组合估值与盈亏曲线
    Analytics,
    // 报表：成交明细
    Reports,
    // 持仓：资产配置与重仓持股
    Portfolio,
}

impl Tab {
    /// 全部标签页，按界面中的顺序排列。
    pub const ALL: [Tab; 4] = [Tab::Dashboard, Tab::Analytics, Tab::Reports, Tab::Portfolio];
}

impl FromStr for Tab {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "dashboard" => Ok(Tab::Dashboard),
            "analytics" => Ok(Tab::Analytics),
            "reports" => Ok(Tab::Reports),
            "portfolio" => Ok(Tab::Portfolio),
            _ => Err(format!("Unknown Tab: {}", s)),
        }
    }
}

impl std::fmt::Display for Tab {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Tab::Dashboard => write!(f, "dashboard"),
            Tab::Analytics => write!(f, "analytics"),
            Tab::Reports => write!(f, "reports"),
            Tab::Portfolio => write!(f, "portfolio"),
        }
    }
}
