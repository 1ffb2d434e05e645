use std::sync::Arc;

use tokio::sync::mpsc::Receiver;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::config::ShutdownPolicy;
use crate::connection::DbConnection;
use crate::model::MutationRequest;
use crate::query_builder::build_mutation;

use super::stats::StatsCounters;

enum Step {
    Apply(MutationRequest),
    Shutdown,
    ProducersGone,
}

/// The single consumer of the write queue and the only writer to the connection.
pub(super) struct WriteWorker {
    pub(super) conn: Arc<dyn DbConnection>,
    pub(super) receiver: Receiver<MutationRequest>,
    pub(super) shutdown: CancellationToken,
    pub(super) policy: ShutdownPolicy,
    pub(super) stats: Arc<StatsCounters>,
}

impl WriteWorker {
    pub(super) async fn run(mut self) {
        debug!("write worker started");
        loop {
            let step = tokio::select! {
                biased;
                _ = self.shutdown.cancelled() => Step::Shutdown,
                next = self.receiver.recv() => next.map_or(Step::ProducersGone, Step::Apply),
            };
            match step {
                // One at a time: the next command is not taken until this one finishes.
                Step::Apply(request) => self.apply(request).await,
                Step::Shutdown => break,
                Step::ProducersGone => {
                    debug!("all producers dropped; write worker stopping");
                    return;
                }
            }
        }

        // Refuse new work, then settle what is already queued.
        self.receiver.close();
        match self.policy {
            ShutdownPolicy::Drain => {
                let mut drained = 0_u64;
                while let Some(request) = self.receiver.recv().await {
                    self.apply(request).await;
                    drained += 1;
                }
                info!(drained, "write queue drained; worker stopped");
            }
            ShutdownPolicy::Discard => {
                let mut discarded = 0_u64;
                while self.receiver.try_recv().is_ok() {
                    discarded += 1;
                }
                if discarded > 0 {
                    self.stats.record_discarded(discarded);
                    warn!(discarded, "queued mutations discarded on shutdown");
                }
                info!("write worker stopped");
            }
        }
    }

    async fn apply(&self, request: MutationRequest) {
        let statement = match build_mutation(&request) {
            Ok(statement) => statement,
            Err(err) => {
                self.stats.record_failed();
                error!(table = request.table.as_str(), error = %err, "queued mutation rejected");
                return;
            }
        };

        debug!(statement = %statement, "executing statement");
        match self.conn.execute(&statement).await {
            Ok(rows) => {
                self.stats.record_executed();
                debug!(rows, "statement applied");
            }
            Err(err) => {
                // Nobody is waiting on this result; the log line is the only report.
                self.stats.record_failed();
                error!(statement = %statement, error = %err, "queued statement failed");
            }
        }
    }
}
