//! # Snapshot Worker
//!
//! Sequentially executes dump-then-persist operations, one at a time. The
//! worker owns the only blocking calls in the system: the state dump against
//! the chain service and the write into the snapshot store.
//!
//! Mutual exclusion is enforced upstream by the scheduler, not here: the
//! request channel has depth 1 and the scheduler never submits a second
//! request while one is outstanding. The completion channel also has depth
//! 1, which serializes worker throughput to the rate the coordinator
//! consumes completions.

use crate::chain::{BlockNumber, ChainClient};
use crate::config::SnapguardConfig;
use crate::error::Result;
use crate::store::SnapshotStore;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{error, info, warn};

/// A block number that should be reflected in the next persisted snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaptureRequest {
    pub block: BlockNumber,
}

/// Completion signal for one capture. `Err` means retries were exhausted
/// and the failure is unrecoverable for the whole process.
pub type CaptureOutcome = Result<BlockNumber>;

/// Worker half of the scheduler/worker pair.
pub struct SnapshotWorker {
    client: Arc<dyn ChainClient>,
    store: Arc<dyn SnapshotStore>,
    config: SnapguardConfig,
    requests: mpsc::Receiver<CaptureRequest>,
    outcomes: mpsc::Sender<CaptureOutcome>,
}

impl SnapshotWorker {
    /// Create the worker together with its channel endpoints.
    ///
    /// Returns `(worker, request_tx, outcome_rx)`. Both channels have depth
    /// 1: the request slot because the scheduler guarantees at most one
    /// outstanding capture, the outcome slot as the system's only
    /// backpressure point.
    pub fn channel(
        client: Arc<dyn ChainClient>,
        store: Arc<dyn SnapshotStore>,
        config: SnapguardConfig,
    ) -> (
        Self,
        mpsc::Sender<CaptureRequest>,
        mpsc::Receiver<CaptureOutcome>,
    ) {
        let (request_tx, requests) = mpsc::channel(1);
        let (outcomes, outcome_rx) = mpsc::channel(1);

        let worker = Self {
            client,
            store,
            config,
            requests,
            outcomes,
        };

        (worker, request_tx, outcome_rx)
    }

    /// Process capture requests until the request channel closes or a
    /// capture fails unrecoverably. Never begins a new dump before the
    /// previous completion signal has been sent.
    pub async fn run(mut self) {
        while let Some(request) = self.requests.recv().await {
            let outcome = self
                .capture(request.block)
                .await
                .map(|_| request.block);
            let fatal = outcome.is_err();

            if self.outcomes.send(outcome).await.is_err() {
                // Coordinator is gone; nothing left to report to
                return;
            }
            if fatal {
                return;
            }
        }
    }

    /// One capture: dump the service state, persist it, retrying the whole
    /// pair with exponential backoff up to `retry_limit` times. A failed
    /// dump writes nothing, so the slot never holds a partial snapshot.
    async fn capture(&self, block: BlockNumber) -> Result<()> {
        let mut attempt = 0u32;
        loop {
            match self.try_capture().await {
                Ok(size_bytes) => {
                    info!(block, size_bytes, attempt, "📸 Captured snapshot");
                    return Ok(());
                }
                Err(e) if attempt < self.config.retry_limit => {
                    let delay = self.config.backoff_delay(attempt);
                    warn!(
                        block,
                        attempt,
                        retry_limit = self.config.retry_limit,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "Capture attempt failed, backing off before retry"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => {
                    error!(block, attempt, error = %e, "Capture failed, retries exhausted");
                    return Err(e);
                }
            }
        }
    }

    async fn try_capture(&self) -> Result<usize> {
        let state = self.client.dump_state().await?;
        self.store.write(&state).await?;
        Ok(state.len())
    }
}
