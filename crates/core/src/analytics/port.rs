use crate::analytics::entity::AnalyticsSnapshot;
use crate::analytics::error::FetchError;
use crate::view::state::{RefreshStats, ViewState};
use async_trait::async_trait;
use futures::Stream;
use std::pin::Pin;

/// # Summary
/// 视图状态变更流别名，使用动态分发的异步流。
pub type StateStream = Pin<Box<dyn Stream<Item = ViewState> + Send>>;

/// # Summary
/// 分析数据快照的提供者接口（原始数据源）。
///
/// # Invariants
/// - 实现者不得修改任何共享状态，替换当前快照的职责属于调用方。
/// - 响应结构不完整时必须整体拒绝，不允许返回部分快照。
#[async_trait]
pub trait SnapshotSource: Send + Sync {
    /// # Summary
    /// 抓取一份完整的分析数据快照。
    ///
    /// # Logic
    /// 1. 向固定端点发起请求。
    /// 2. 校验状态码与响应结构。
    /// 3. 转换为领域实体。
    ///
    /// # Returns
    /// 成功返回 `AnalyticsSnapshot`，失败返回 `FetchError`。
    async fn fetch_snapshot(&self) -> Result<AnalyticsSnapshot, FetchError>;
}

/// # Summary
/// 仪表盘服务契约，持有唯一的视图状态并负责定时刷新。
///
/// # Invariants
/// - 任一时刻只有一个写入方。
/// - 释放后不再发起新的抓取，也不再写入任何结果。
pub trait Dashboard: Send + Sync {
    /// # Summary
    /// 读取当前视图状态。
    ///
    /// # Returns
    /// 当前 `ViewState` 的克隆（快照本身以 `Arc` 共享）。
    fn state(&self) -> ViewState;

    /// # Summary
    /// 订阅视图状态的后续变更。
    ///
    /// # Returns
    /// 每次状态发布都会产出一项的异步流。
    fn subscribe(&self) -> StateStream;

    /// 刷新任务的运行统计。
    fn stats(&self) -> RefreshStats;

    /// # Summary
    /// 释放仪表盘。
    ///
    /// # Logic
    /// 1. 标记状态单元为已释放。
    /// 2. 取消定时器与所有在途请求。
    fn dispose(&self);
}
