use crate::analytics::entity::AnalyticsSnapshot;
use crate::analytics::error::FetchError;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;

/// # Summary
/// 已有可展示数据时的状态内容。
///
/// # Invariants
/// - `snapshot` 是最近一次成功抓取的完整快照 (last-known-good)。
/// - `last_error` 非空表示之后的刷新失败过，数据可能已过期。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadyState {
    // 最近一次成功的快照
    pub snapshot: Arc<AnalyticsSnapshot>,
    // 该快照的抓取完成时间
    pub fetched_at: DateTime<Utc>,
    // 成功之后最近一次刷新失败的原因
    pub last_error: Option<String>,
}

impl ReadyState {
    /// 是否可能展示的是过期数据。
    pub fn is_stale(&self) -> bool {
        self.last_error.is_some()
    }
}

/// # Summary
/// 视图的状态机。
///
/// # Invariants
/// - `Uninitialized -> Loading -> {Ready | Error}`。
/// - `Ready` 在每次成功刷新后以新快照重新进入 `Ready`。
/// - `Error` 只在从未成功过的情况下可达；成功之后的失败保持 `Ready`。
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ViewState {
    /// 尚未发起任何抓取
    #[default]
    Uninitialized,
    /// 首次抓取进行中
    Loading,
    /// 持有可展示的快照
    Ready(ReadyState),
    /// 首次抓取失败，附带失败原因
    Error(String),
}

impl ViewState {
    /// # Summary
    /// 发起抓取时的状态迁移。
    ///
    /// # Logic
    /// 只有 `Uninitialized` 会进入 `Loading`，其余状态保持不变。
    pub fn on_request(self) -> ViewState {
        match self {
            ViewState::Uninitialized => ViewState::Loading,
            other => other,
        }
    }

    /// # Summary
    /// 抓取成功时的状态迁移。
    ///
    /// # Logic
    /// 无论之前处于何种状态，都以新快照整体替换，并清除过期标记。
    pub fn on_success(self, snapshot: Arc<AnalyticsSnapshot>, fetched_at: DateTime<Utc>) -> ViewState {
        ViewState::Ready(ReadyState {
            snapshot,
            fetched_at,
            last_error: None,
        })
    }

    /// # Summary
    /// 抓取失败时的状态迁移。
    ///
    /// # Logic
    /// 1. 已有快照：保留快照，只记录失败原因 (stale-on-failure)。
    /// 2. 从未成功：进入 `Error`。
    pub fn on_failure(self, error: &FetchError) -> ViewState {
        match self {
            ViewState::Ready(ready) => ViewState::Ready(ReadyState {
                last_error: Some(error.to_string()),
                ..ready
            }),
            _ => ViewState::Error(error.to_string()),
        }
    }

    /// 当前可展示的快照。
    pub fn snapshot(&self) -> Option<&Arc<AnalyticsSnapshot>> {
        match self {
            ViewState::Ready(ready) => Some(&ready.snapshot),
            _ => None,
        }
    }

    /// 状态名称，供日志与接口输出使用。
    pub fn label(&self) -> &'static str {
        match self {
            ViewState::Uninitialized | ViewState::Loading => "loading",
            ViewState::Ready(_) => "ready",
            ViewState::Error(_) => "error",
        }
    }
}

/// # Summary
/// 刷新任务的运行统计。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RefreshStats {
    // 已发起的请求数 (即最新序号)
    pub issued: u64,
    // 被采纳的成功结果数
    pub applied: u64,
    // 被采纳的失败结果数
    pub failed: u64,
    // 因序号过期或已释放而丢弃的结果数
    pub discarded: u64,
    // 最近一次成功时间
    pub last_success_at: Option<DateTime<Utc>>,
    // 最近一次失败原因
    pub last_error: Option<String>,
}
