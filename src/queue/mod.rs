//! The bounded write queue and its single background worker.
//!
//! Producers push [`MutationRequest`]s through a [`WriteHandle`]; one tokio task pops them
//! in FIFO order and executes each to completion before taking the next. A full queue makes
//! [`WriteHandle::submit`] wait, which throttles producers to the rate the connection can
//! absorb.
//!
//! Submission is fire-and-forget. A successful `submit` means the mutation was *accepted
//! for queuing*, not that it was written: execution failures are logged by the worker and
//! counted in [`QueueStats`], never returned to the producer.

mod stats;
mod worker;

use std::sync::Arc;

use tokio::sync::mpsc::{self, Sender, error::TrySendError};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::Instrument;

use crate::config::ProxyOptions;
use crate::connection::DbConnection;
use crate::error::SqlProxyError;
use crate::model::MutationRequest;
use crate::query_builder::validate_mutation;

pub(crate) use stats::StatsCounters;
pub use stats::QueueStats;

use worker::WriteWorker;

/// Cloneable producer side of the write queue.
///
/// Handles stay valid only while the proxy that issued them is connected; afterwards every
/// submission fails with [`SqlProxyError::NotConnected`].
#[derive(Debug, Clone)]
pub struct WriteHandle {
    sender: Sender<MutationRequest>,
}

impl WriteHandle {
    /// Queue a mutation, waiting for a free slot if the queue is full.
    ///
    /// # Errors
    /// Returns [`SqlProxyError::InvalidRequest`] for a mutation that cannot form a statement
    /// and [`SqlProxyError::NotConnected`] once the worker has stopped.
    pub async fn submit(&self, request: MutationRequest) -> Result<(), SqlProxyError> {
        validate_mutation(&request)?;
        self.sender
            .send(request)
            .await
            .map_err(|_| SqlProxyError::NotConnected)
    }

    /// Queue a mutation without waiting.
    ///
    /// # Errors
    /// Returns [`SqlProxyError::QueueFull`] when no slot is free, plus the errors of
    /// [`submit`](Self::submit).
    pub fn try_submit(&self, request: MutationRequest) -> Result<(), SqlProxyError> {
        validate_mutation(&request)?;
        self.sender.try_send(request).map_err(|err| match err {
            TrySendError::Full(_) => SqlProxyError::QueueFull,
            TrySendError::Closed(_) => SqlProxyError::NotConnected,
        })
    }

    /// Mutations accepted but not yet taken by the worker.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.sender.max_capacity() - self.sender.capacity()
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }
}

/// A running queue: the producer handle, the shutdown signal, and the worker task.
pub(crate) struct WriteQueue {
    handle: WriteHandle,
    shutdown: CancellationToken,
    worker: JoinHandle<()>,
}

impl WriteQueue {
    /// Allocate a fresh queue and start its worker. Must be called inside a tokio runtime.
    ///
    /// The worker inherits the caller's span so its log lines stay attached to the connect.
    pub(crate) fn start(
        conn: Arc<dyn DbConnection>,
        options: &ProxyOptions,
        stats: Arc<StatsCounters>,
    ) -> Self {
        let (sender, receiver) = mpsc::channel(options.queue_capacity);
        let shutdown = CancellationToken::new();
        let worker = WriteWorker {
            conn,
            receiver,
            shutdown: shutdown.clone(),
            policy: options.shutdown,
            stats,
        };
        Self {
            handle: WriteHandle { sender },
            shutdown,
            worker: tokio::spawn(worker.run().in_current_span()),
        }
    }

    pub(crate) fn handle(&self) -> &WriteHandle {
        &self.handle
    }

    /// Signal shutdown and wait for the worker to finish draining or discarding.
    pub(crate) async fn stop(self) -> Result<(), SqlProxyError> {
        let Self {
            handle,
            shutdown,
            worker,
        } = self;
        drop(handle);
        shutdown.cancel();
        worker.await.map_err(|err| {
            SqlProxyError::ExecutionError(format!("write worker terminated abnormally: {err}"))
        })
    }

    /// Signal shutdown without waiting.
    pub(crate) fn cancel(&self) {
        self.shutdown.cancel();
    }
}
