use std::sync::atomic::{AtomicU64, Ordering};

/// Counters the write worker bumps as it processes mutations.
#[derive(Debug, Default)]
pub(crate) struct StatsCounters {
    executed: AtomicU64,
    failed: AtomicU64,
    discarded: AtomicU64,
}

impl StatsCounters {
    pub(crate) fn record_executed(&self) {
        self.executed.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_failed(&self) {
        self.failed.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_discarded(&self, count: u64) {
        self.discarded.fetch_add(count, Ordering::Relaxed);
    }

    pub(crate) fn snapshot(&self) -> QueueStats {
        QueueStats {
            executed: self.executed.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
            discarded: self.discarded.load(Ordering::Relaxed),
        }
    }
}

/// Cumulative write-queue counters for one proxy, across reconnects.
///
/// Diagnostics only: a submitter cannot tell from these whether *its* mutation succeeded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct QueueStats {
    /// Statements the connection accepted.
    pub executed: u64,
    /// Statements that failed to build or execute.
    pub failed: u64,
    /// Mutations dropped unexecuted by a [`ShutdownPolicy::Discard`](crate::ShutdownPolicy) close.
    pub discarded: u64,
}
