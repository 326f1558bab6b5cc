use chrono::{DateTime, Utc};
use std::sync::Arc;
use tzarfat_core::analytics::entity::AnalyticsSnapshot;
use tzarfat_core::analytics::error::FetchError;
use tzarfat_core::view::state::{RefreshStats, ViewState};

/// # Summary
/// 一次抓取请求的序号凭证。
///
/// # Invariants
/// - 序号由 `SnapshotCell::issue` 单调递增分配，从 1 开始。
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestTicket(u64);

impl RequestTicket {
    pub fn seq(&self) -> u64 {
        self.0
    }
}

/// 抓取结果回写后的处理结论。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    /// 新快照被采纳
    Applied,
    /// 抓取失败，保留了已有快照
    Retained,
    /// 抓取失败且从未成功过，进入错误状态
    Failed,
    /// 序号已过期或单元已释放，结果被丢弃
    Discarded,
}

/// # Summary
/// 视图状态的唯一持有单元。
///
/// # Invariants
/// - 只有一个写入方，所有写入都经过 `complete`。
/// - 只有序号等于最新已发出序号的结果才会被采纳，旧请求不能覆盖新数据。
/// - 释放后不再发出新凭证，也不再接受任何结果。
#[derive(Debug, Default)]
pub struct SnapshotCell {
    // 最新已发出的序号
    issued: u64,
    // 当前视图状态
    state: ViewState,
    // 是否已释放
    disposed: bool,
    // 运行统计
    stats: RefreshStats,
}

impl SnapshotCell {
    pub fn new() -> Self {
        Self::default()
    }

    /// # Summary
    /// 为新一轮抓取分配序号。
    ///
    /// # Logic
    /// 1. 已释放则拒绝，返回 None。
    /// 2. 序号加一，首次请求时状态从 `Uninitialized` 进入 `Loading`。
    ///
    /// # Returns
    /// 新的请求凭证。
    pub fn issue(&mut self) -> Option<RequestTicket> {
        if self.disposed {
            return None;
        }
        self.issued += 1;
        self.stats.issued = self.issued;
        self.state = std::mem::take(&mut self.state).on_request();
        Some(RequestTicket(self.issued))
    }

    /// # Summary
    /// 回写一次抓取的结果。
    ///
    /// # Logic
    /// 1. 单元已释放或凭证不是最新序号：丢弃。
    /// 2. 成功：整体替换为新快照。
    /// 3. 失败：已有快照则保留并标记过期，否则进入错误状态。
    ///
    /// # Arguments
    /// * `ticket`: 发起请求时取得的凭证。
    /// * `result`: 抓取结果。
    /// * `at`: 结果到达的时间。
    ///
    /// # Returns
    /// 本次回写的处理结论。
    pub fn complete(
        &mut self,
        ticket: RequestTicket,
        result: Result<AnalyticsSnapshot, FetchError>,
        at: DateTime<Utc>,
    ) -> Completion {
        if self.disposed || ticket.0 != self.issued {
            self.stats.discarded += 1;
            return Completion::Discarded;
        }

        let previous = std::mem::take(&mut self.state);
        match result {
            Ok(snapshot) => {
                self.state = previous.on_success(Arc::new(snapshot), at);
                self.stats.applied += 1;
                self.stats.last_success_at = Some(at);
                self.stats.last_error = None;
                Completion::Applied
            }
            Err(error) => {
                let had_snapshot = previous.snapshot().is_some();
                self.state = previous.on_failure(&error);
                self.stats.failed += 1;
                self.stats.last_error = Some(error.to_string());
                if had_snapshot {
                    Completion::Retained
                } else {
                    Completion::Failed
                }
            }
        }
    }

    /// 释放单元，此后的凭证与结果一律无效。
    pub fn dispose(&mut self) {
        self.disposed = true;
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    pub fn stats(&self) -> &RefreshStats {
        &self.stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tzarfat_core::testing::{sample_snapshot, snapshot_with_total};

    fn total_assets(cell: &SnapshotCell) -> Option<rust_decimal::Decimal> {
        cell.state().snapshot().map(|s| s.summary.total_assets)
    }

    #[test]
    fn test_issue_enters_loading() {
        let mut cell = SnapshotCell::new();
        assert_eq!(cell.state(), &ViewState::Uninitialized);
        let ticket = cell.issue().unwrap();
        assert_eq!(ticket.seq(), 1);
        assert_eq!(cell.state(), &ViewState::Loading);
        assert_eq!(cell.issue().unwrap().seq(), 2);
    }

    #[test]
    fn test_stale_on_failure() {
        let mut cell = SnapshotCell::new();
        let t1 = cell.issue().unwrap();
        assert_eq!(
            cell.complete(t1, Ok(sample_snapshot()), Utc::now()),
            Completion::Applied
        );

        let t2 = cell.issue().unwrap();
        assert_eq!(
            cell.complete(t2, Err(FetchError::HttpStatus(503)), Utc::now()),
            Completion::Retained
        );

        let snapshot = cell.state().snapshot().unwrap();
        assert_eq!(**snapshot, sample_snapshot());
        assert_eq!(cell.stats().last_error.as_deref(), Some("HTTP status error: 503"));
    }

    #[test]
    fn test_first_failure_is_error() {
        let mut cell = SnapshotCell::new();
        let t1 = cell.issue().unwrap();
        let outcome = cell.complete(t1, Err(FetchError::Network("refused".into())), Utc::now());
        assert_eq!(outcome, Completion::Failed);
        assert!(matches!(cell.state(), ViewState::Error(msg) if msg.contains("refused")));
    }

    #[test]
    fn test_malformed_body_is_not_partially_adopted() {
        let mut cell = SnapshotCell::new();
        let t1 = cell.issue().unwrap();
        cell.complete(
            t1,
            Err(FetchError::Parse("missing field `summary`".into())),
            Utc::now(),
        );
        assert!(cell.state().snapshot().is_none());
        assert_eq!(cell.state().label(), "error");
    }

    #[test]
    fn test_out_of_order_response_is_discarded() {
        let mut cell = SnapshotCell::new();
        let t1 = cell.issue().unwrap();
        let t2 = cell.issue().unwrap();

        assert_eq!(
            cell.complete(t2, Ok(snapshot_with_total(2)), Utc::now()),
            Completion::Applied
        );
        assert_eq!(
            cell.complete(t1, Ok(snapshot_with_total(1)), Utc::now()),
            Completion::Discarded
        );

        assert_eq!(total_assets(&cell), Some(rust_decimal::Decimal::from(2)));
        assert_eq!(cell.stats().applied, 1);
        assert_eq!(cell.stats().discarded, 1);
    }

    #[test]
    fn test_superseded_failure_does_not_mark_stale() {
        let mut cell = SnapshotCell::new();
        let t1 = cell.issue().unwrap();
        cell.complete(t1, Ok(snapshot_with_total(1)), Utc::now());

        let t2 = cell.issue().unwrap();
        let t3 = cell.issue().unwrap();
        assert_eq!(
            cell.complete(t2, Err(FetchError::HttpStatus(500)), Utc::now()),
            Completion::Discarded
        );
        match cell.state() {
            ViewState::Ready(ready) => assert!(!ready.is_stale()),
            other => panic!("unexpected state: {:?}", other),
        }

        cell.complete(t3, Ok(snapshot_with_total(3)), Utc::now());
        assert_eq!(total_assets(&cell), Some(rust_decimal::Decimal::from(3)));
    }

    #[test]
    fn test_no_write_after_dispose() {
        let mut cell = SnapshotCell::new();
        let t1 = cell.issue().unwrap();
        cell.dispose();

        assert_eq!(
            cell.complete(t1, Ok(sample_snapshot()), Utc::now()),
            Completion::Discarded
        );
        assert_eq!(cell.state(), &ViewState::Loading);
        assert!(cell.issue().is_none());
        assert!(cell.is_disposed());
    }
}
