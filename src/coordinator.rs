//! # Snapshot Coordinator
//!
//! Owns the event-multiplexing loop that drives the debounce machine. The
//! coordinator is single-threaded and cooperative: it suspends on whichever
//! of {progress event, capture outcome, subscription error, shutdown}
//! arrives first and never performs blocking I/O itself. All dump and
//! persist work happens in the [`SnapshotWorker`](crate::worker::SnapshotWorker)
//! task it spawns.

use crate::chain::ChainClient;
use crate::config::SnapguardConfig;
use crate::error::{Result, SnapguardError};
use crate::recovery::{recover, RecoveryOutcome};
use crate::state_machine::{DebounceMachine, DrainPlan, Effect, SchedulerEvent};
use crate::store::SnapshotStore;
use crate::worker::{CaptureOutcome, CaptureRequest, SnapshotWorker};
use std::sync::Arc;
use tokio::sync::{mpsc, Notify};
use tracing::{debug, error, info, warn};

/// Supervises the capture worker and keeps the snapshot slot in sync with
/// the progress stream.
pub struct SnapshotCoordinator {
    client: Arc<dyn ChainClient>,
    store: Arc<dyn SnapshotStore>,
    config: SnapguardConfig,
}

impl SnapshotCoordinator {
    pub fn new(
        client: Arc<dyn ChainClient>,
        store: Arc<dyn SnapshotStore>,
        config: SnapguardConfig,
    ) -> Self {
        Self {
            client,
            store,
            config,
        }
    }

    /// Run until `shutdown` is notified (or the progress stream ends), then
    /// drain: wait for any in-flight capture and force one final capture of
    /// the latest observed block before returning.
    ///
    /// The returned error is always fatal; the caller is expected to stop
    /// the process with a diagnostic.
    pub async fn run(self, shutdown: Arc<Notify>) -> Result<()> {
        let (worker, request_tx, mut outcome_rx) = SnapshotWorker::channel(
            self.client.clone(),
            self.store.clone(),
            self.config.clone(),
        );
        let worker_handle = tokio::spawn(worker.run());

        // Recovery runs strictly before any event is consumed, so it never
        // contends with steady-state captures for the slot
        let recovery = recover(&self.client, &self.store, &request_tx, &mut outcome_rx).await?;
        match recovery {
            RecoveryOutcome::Resumed { latest } => {
                info!(latest, "▶️ Resuming from persisted snapshot")
            }
            RecoveryOutcome::Primed { block } => info!(block, "▶️ Starting from priming capture"),
        }
        let mut machine = DebounceMachine::new(recovery.latest_seen());

        let mut subscription = self.client.subscribe_progress().await?;
        info!(
            latest_seen = machine.latest_seen(),
            "🔔 Subscribed to progress events"
        );

        let mut errors_open = true;
        let plan = loop {
            tokio::select! {
                maybe_block = subscription.events.recv() => match maybe_block {
                    Some(block) => {
                        debug!(block, state = %machine.state(), "Progress event");
                        let effect = machine.handle(SchedulerEvent::Progress(block));
                        self.apply(effect, &request_tx).await?;
                    }
                    None => {
                        warn!("Progress stream ended, draining as if shutdown was requested");
                        break Self::shutdown_plan(&mut machine);
                    }
                },
                maybe_outcome = outcome_rx.recv() => {
                    let block = match maybe_outcome {
                        Some(Ok(block)) => block,
                        Some(Err(e)) => {
                            error!(error = %e, "Capture failed unrecoverably");
                            return Err(e);
                        }
                        None => {
                            return Err(SnapguardError::ChannelClosed {
                                channel: "capture outcomes",
                            })
                        }
                    };
                    let effect = machine.handle(SchedulerEvent::CaptureCompleted(block));
                    self.apply(effect, &request_tx).await?;
                },
                maybe_error = subscription.errors.recv(), if errors_open => match maybe_error {
                    Some(message) => {
                        let effect = machine.handle(SchedulerEvent::SubscriptionLost(message));
                        self.apply(effect, &request_tx).await?;
                    }
                    None => errors_open = false,
                },
                _ = shutdown.notified() => {
                    info!(
                        latest_seen = machine.latest_seen(),
                        state = %machine.state(),
                        "🛑 Shutdown requested, draining"
                    );
                    break Self::shutdown_plan(&mut machine);
                },
            }
        };

        match tokio::time::timeout(
            self.config.drain_timeout(),
            Self::drain(plan, &request_tx, &mut outcome_rx),
        )
        .await
        {
            Ok(drained) => drained?,
            Err(_) => {
                // The hung capture cannot be waited out; the slot keeps the
                // last successfully persisted snapshot
                error!(
                    timeout_ms = self.config.drain_timeout_ms,
                    final_block = plan.final_block,
                    "Shutdown drain timed out"
                );
                worker_handle.abort();
                return Err(SnapguardError::DrainTimeout {
                    timeout_ms: self.config.drain_timeout_ms,
                });
            }
        }

        machine.stop();
        info!(
            block = plan.final_block,
            "✅ Final snapshot persisted, coordinator stopped"
        );

        drop(request_tx);
        let _ = worker_handle.await;
        Ok(())
    }

    fn shutdown_plan(machine: &mut DebounceMachine) -> DrainPlan {
        match machine.handle(SchedulerEvent::ShutdownRequested) {
            Effect::Drain(plan) => plan,
            effect => unreachable!("shutdown always yields a drain plan, got {effect:?}"),
        }
    }

    /// Execute one machine effect.
    async fn apply(&self, effect: Effect, requests: &mpsc::Sender<CaptureRequest>) -> Result<()> {
        match effect {
            Effect::None => Ok(()),
            Effect::SubmitCapture(block) => {
                debug!(block, "Submitting capture request");
                requests
                    .send(CaptureRequest { block })
                    .await
                    .map_err(|_| SnapguardError::ChannelClosed {
                        channel: "capture requests",
                    })
            }
            Effect::Report(message) => {
                warn!(error = %message, "Subscription error reported, continuing on stale delivery");
                Ok(())
            }
            Effect::Drain(_) => unreachable!("drain effects are produced only by the run loop"),
        }
    }

    /// The shutdown sequence: consume the in-flight completion if one is
    /// outstanding, then submit and await the mandatory final capture.
    async fn drain(
        plan: DrainPlan,
        requests: &mpsc::Sender<CaptureRequest>,
        outcomes: &mut mpsc::Receiver<CaptureOutcome>,
    ) -> Result<()> {
        if plan.wait_for_inflight {
            match outcomes.recv().await {
                Some(Ok(block)) => debug!(block, "In-flight capture completed during drain"),
                Some(Err(e)) => return Err(e),
                None => {
                    return Err(SnapguardError::ChannelClosed {
                        channel: "capture outcomes",
                    })
                }
            }
        }

        requests
            .send(CaptureRequest {
                block: plan.final_block,
            })
            .await
            .map_err(|_| SnapguardError::ChannelClosed {
                channel: "capture requests",
            })?;

        match outcomes.recv().await {
            Some(Ok(block)) => {
                debug!(block, "Final capture completed");
                Ok(())
            }
            Some(Err(e)) => Err(e),
            None => Err(SnapguardError::ChannelClosed {
                channel: "capture outcomes",
            }),
        }
    }
}
