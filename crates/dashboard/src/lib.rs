//! # Tzarfat Dashboard
//!
//! 持有唯一视图状态的快照单元，以及驱动它的定时刷新任务。

pub mod cell;
pub mod refresh;
