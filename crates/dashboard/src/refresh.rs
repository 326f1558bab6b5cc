use crate::cell::{Completion, RequestTicket, SnapshotCell};
use std::sync::{Arc, Mutex, Weak};
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::task::AbortHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, trace, warn};
use tzarfat_core::analytics::entity::AnalyticsSnapshot;
use tzarfat_core::analytics::error::FetchError;
use tzarfat_core::analytics::port::{Dashboard, SnapshotSource, StateStream};
use tzarfat_core::common::time::TimeProvider;
use tzarfat_core::view::state::{RefreshStats, ViewState};

/// # Summary
/// Dashboard 服务的具体实现类。
///
/// # Invariants
/// - 视图状态完全托管于独占的 `SnapshotCell`，所有写入经由同一把锁串行化。
/// - 后台刷新任务只持有弱引用，聚合根销毁即自动停止。
/// - 同一时刻最多保留一个在途抓取，新一轮发起时取消被取代的旧请求。
pub struct DashboardImpl {
    // 唯一的视图状态单元
    cell: Mutex<SnapshotCell>,
    // 状态变更广播
    updates: broadcast::Sender<ViewState>,
    // 定时刷新任务句柄
    ticker: Mutex<Option<AbortHandle>>,
    // 在途抓取任务 (序号, 句柄)
    in_flight: Mutex<Option<(u64, AbortHandle)>>,
    // 时钟
    clock: Arc<dyn TimeProvider>,
}

impl DashboardImpl {
    /// # Summary
    /// 创建仪表盘并启动定时刷新。
    ///
    /// # Logic
    /// 1. 构造 DashboardImpl 实例并包装为 Arc。
    /// 2. 启动后台刷新任务：立即抓取一次，此后按 `interval` 定时抓取 (以发起时刻计)。
    /// 3. 记录刷新任务的 AbortHandle 以便释放时取消。
    ///
    /// # Arguments
    /// * `source`: 数据源驱动。
    /// * `interval`: 两次抓取发起之间的间隔。
    /// * `clock`: 时钟，用于标记快照抓取时间。
    ///
    /// # Returns
    /// 返回 DashboardImpl 的共享指针。必须在 tokio 运行时内调用。
    pub fn start(
        source: Arc<dyn SnapshotSource>,
        interval: Duration,
        clock: Arc<dyn TimeProvider>,
    ) -> Arc<Self> {
        let (updates, _) = broadcast::channel(64);
        let dashboard = Arc::new(Self {
            cell: Mutex::new(SnapshotCell::new()),
            updates,
            ticker: Mutex::new(None),
            in_flight: Mutex::new(None),
            clock,
        });

        let refresher = Refresher::new(Arc::downgrade(&dashboard), source, interval);
        let handle = tokio::spawn(refresher.run()).abort_handle();
        *dashboard.ticker.lock().unwrap_or_else(|e| e.into_inner()) = Some(handle);

        info!("Dashboard refresh started, interval {:?}", interval);
        dashboard
    }

    /// # Summary
    /// 为新一轮抓取申请序号。
    ///
    /// # Logic
    /// 1. 在单元中分配序号，已释放则返回 None。
    /// 2. 首次申请时状态进入 Loading，广播新状态。
    fn issue(&self) -> Option<RequestTicket> {
        let mut cell = self.cell.lock().unwrap_or_else(|e| e.into_inner());
        let was_uninitialized = matches!(cell.state(), ViewState::Uninitialized);
        let ticket = cell.issue()?;
        if was_uninitialized {
            self.publish(cell.state().clone());
        }
        Some(ticket)
    }

    /// # Summary
    /// 登记新的在途抓取，并取消被它取代的旧请求。
    fn track(&self, seq: u64, handle: AbortHandle) {
        let mut slot = self.in_flight.lock().unwrap_or_else(|e| e.into_inner());
        if let Some((old_seq, old)) = slot.replace((seq, handle)) {
            debug!("Cancelling superseded fetch #{}", old_seq);
            old.abort();
        }
    }

    /// 抓取结束后移除自身的在途记录。
    fn untrack(&self, seq: u64) {
        let mut slot = self.in_flight.lock().unwrap_or_else(|e| e.into_inner());
        if slot.as_ref().is_some_and(|(s, _)| *s == seq) {
            *slot = None;
        }
    }

    /// # Summary
    /// 回写抓取结果并广播。
    ///
    /// # Logic
    /// 1. 在单元锁内完成状态迁移。
    /// 2. 被采纳的结果 (成功或失败) 在同一把锁内广播，保证订阅者看到的顺序与写入顺序一致。
    /// 3. 按结论输出日志。
    ///
    /// # Arguments
    /// * `ticket`: 请求凭证。
    /// * `result`: 抓取结果。
    ///
    /// # Returns
    /// 回写结论。
    fn complete(
        &self,
        ticket: RequestTicket,
        result: Result<AnalyticsSnapshot, FetchError>,
    ) -> Completion {
        let error_text = result.as_ref().err().map(|e| e.to_string());
        let mut cell = self.cell.lock().unwrap_or_else(|e| e.into_inner());
        let outcome = cell.complete(ticket, result, self.clock.now());
        if outcome != Completion::Discarded {
            self.publish(cell.state().clone());
        }
        drop(cell);

        match outcome {
            Completion::Applied => debug!("Snapshot #{} applied", ticket.seq()),
            Completion::Retained => warn!(
                "Refresh #{} failed, keeping last snapshot: {}",
                ticket.seq(),
                error_text.unwrap_or_default()
            ),
            Completion::Failed => error!(
                "Initial fetch #{} failed: {}",
                ticket.seq(),
                error_text.unwrap_or_default()
            ),
            Completion::Discarded => debug!("Result of fetch #{} discarded", ticket.seq()),
        }
        outcome
    }

    fn publish(&self, state: ViewState) {
        if self.updates.send(state).is_err() {
            trace!("No state subscribers");
        }
    }

    /// 是否已释放。
    pub fn is_disposed(&self) -> bool {
        self.cell
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .is_disposed()
    }
}

impl Dashboard for DashboardImpl {
    fn state(&self) -> ViewState {
        self.cell
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .state()
            .clone()
    }

    /// # Summary
    /// 订阅状态变更流。
    ///
    /// # Logic
    /// 挂载到内部广播器；落后的订阅者跳过丢失的中间状态，只关心最新状态。
    fn subscribe(&self) -> StateStream {
        let rx = self.updates.subscribe();
        let stream = async_stream::stream! {
            let mut rx = rx;
            loop {
                match rx.recv().await {
                    Ok(state) => yield state,
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        debug!("State subscriber lagged, skipped {} updates", n);
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        };
        Box::pin(stream)
    }

    fn stats(&self) -> RefreshStats {
        self.cell
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .stats()
            .clone()
    }

    /// # Summary
    /// 释放仪表盘。
    ///
    /// # Logic
    /// 1. 先标记单元已释放，之后到达的结果一律丢弃。
    /// 2. 取消定时刷新任务。
    /// 3. 取消在途抓取。
    fn dispose(&self) {
        {
            let mut cell = self.cell.lock().unwrap_or_else(|e| e.into_inner());
            if cell.is_disposed() {
                return;
            }
            cell.dispose();
        }

        if let Some(handle) = self.ticker.lock().unwrap_or_else(|e| e.into_inner()).take() {
            handle.abort();
        }
        if let Some((seq, handle)) = self
            .in_flight
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take()
        {
            debug!("Cancelling in-flight fetch #{}", seq);
            handle.abort();
        }
        info!("Dashboard disposed");
    }
}

impl Drop for DashboardImpl {
    fn drop(&mut self) {
        self.dispose();
    }
}

/// # Summary
/// 定时刷新任务的后台执行器。
struct Refresher {
    inner: Weak<DashboardImpl>,
    source: Arc<dyn SnapshotSource>,
    interval: Duration,
}

impl Refresher {
    fn new(inner: Weak<DashboardImpl>, source: Arc<dyn SnapshotSource>, interval: Duration) -> Self {
        Self {
            inner,
            source,
            // tokio 的 interval 不接受零周期
            interval: interval.max(Duration::from_millis(1)),
        }
    }

    /// # Summary
    /// 启动刷新循环。
    ///
    /// # Logic
    /// 1. 首个 tick 立即触发，此后按固定间隔触发；tick 之间不受抓取耗时影响。
    /// 2. 每个 tick 申请序号，并把抓取放入独立任务执行。
    /// 3. 聚合根已销毁或已释放时退出循环。
    async fn run(self) {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;

            let Some(dashboard) = self.inner.upgrade() else {
                break;
            };
            let Some(ticket) = dashboard.issue() else {
                break;
            };

            trace!("Issuing fetch #{}", ticket.seq());
            let task = tokio::spawn(Self::fetch(self.inner.clone(), self.source.clone(), ticket));
            dashboard.track(ticket.seq(), task.abort_handle());
        }
        debug!("Refresh loop stopped");
    }

    /// 执行单次抓取并把结果交回聚合根。
    async fn fetch(inner: Weak<DashboardImpl>, source: Arc<dyn SnapshotSource>, ticket: RequestTicket) {
        let result = source.fetch_snapshot().await;
        if let Some(dashboard) = inner.upgrade() {
            dashboard.complete(ticket, result);
            dashboard.untrack(ticket.seq());
        }
    }
}
