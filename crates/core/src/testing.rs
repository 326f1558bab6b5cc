//! 测试辅助：固定样例快照与可编排的模拟数据源。
//! 仅在启用 `test-utils` feature 时编译。

use crate::analytics::entity::{AnalyticsSnapshot, Asset, PortfolioSnapshot, Summary, TopHolding, Trade};
use crate::analytics::error::FetchError;
use crate::analytics::port::SnapshotSource;
use async_trait::async_trait;
use rust_decimal::Decimal;
use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// 与接口文档示例一致的单条快照。
pub fn sample_snapshot() -> AnalyticsSnapshot {
    AnalyticsSnapshot {
        trades: vec![Trade {
            id: 1,
            ticker: "AAPL".to_string(),
            trade_type: "Покупка".to_string(),
            quantity: 10,
            price: Decimal::new(1505, 1),
            total: Decimal::from(1505),
            time: "10:32".to_string(),
        }],
        portfolio: vec![PortfolioSnapshot {
            period: "Jan".to_string(),
            value: Decimal::from(100_000),
            profit: Decimal::from(2000),
        }],
        assets: vec![Asset {
            asset: "Stocks".to_string(),
            percent: Decimal::from(60),
            value: Decimal::from(60_000),
        }],
        top_holdings: vec![TopHolding {
            ticker: "AAPL".to_string(),
            name: "Apple".to_string(),
            change: "+5%".to_string(),
            value: Decimal::from(6000),
            sector: None,
        }],
        summary: Summary {
            total_assets: Decimal::from(100_000),
            total_profit: Decimal::from(2000),
            today_trades: 1,
        },
    }
}

/// 以 `total_assets` 区分的快照，便于断言采纳的是哪一次结果。
pub fn snapshot_with_total(total_assets: i64) -> AnalyticsSnapshot {
    let mut snapshot = sample_snapshot();
    snapshot.summary.total_assets = Decimal::from(total_assets);
    snapshot
}

/// 单次编排的响应。
pub struct ScriptedReply {
    // 返回前的等待时间
    pub delay: Duration,
    pub result: Result<AnalyticsSnapshot, FetchError>,
}

impl ScriptedReply {
    pub fn ok(snapshot: AnalyticsSnapshot) -> Self {
        Self {
            delay: Duration::ZERO,
            result: Ok(snapshot),
        }
    }

    pub fn err(error: FetchError) -> Self {
        Self {
            delay: Duration::ZERO,
            result: Err(error),
        }
    }

    pub fn after(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

/// # Summary
/// 按顺序返回预设响应的模拟数据源。
///
/// # Invariants
/// - 队列耗尽后重复返回 `fallback`；未设置时返回网络错误。
pub struct ScriptedSource {
    replies: Mutex<VecDeque<ScriptedReply>>,
    fallback: Mutex<Option<AnalyticsSnapshot>>,
    calls: AtomicU64,
}

impl ScriptedSource {
    pub fn new(replies: Vec<ScriptedReply>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            fallback: Mutex::new(None),
            calls: AtomicU64::new(0),
        }
    }

    /// 设置队列耗尽后的默认快照。
    pub fn with_fallback(self, snapshot: AnalyticsSnapshot) -> Self {
        *self.fallback.lock().unwrap_or_else(|e| e.into_inner()) = Some(snapshot);
        self
    }

    /// 追加一条响应。
    pub fn push(&self, reply: ScriptedReply) {
        self.replies
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push_back(reply);
    }

    /// 已被调用的次数。
    pub fn calls(&self) -> u64 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SnapshotSource for ScriptedSource {
    async fn fetch_snapshot(&self) -> Result<AnalyticsSnapshot, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let next = self
            .replies
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .pop_front();

        match next {
            Some(reply) => {
                if !reply.delay.is_zero() {
                    tokio::time::sleep(reply.delay).await;
                }
                reply.result
            }
            None => self
                .fallback
                .lock()
                .unwrap_or_else(|e| e.into_inner())
                .clone()
                .ok_or_else(|| FetchError::Network("script exhausted".to_string())),
        }
    }
}
