//! # Startup Recovery
//!
//! Runs strictly before the coordinator starts consuming progress events,
//! so it never races the worker for the snapshot slot. Decides between
//! resuming from persisted state and priming the store with an initial
//! capture, guaranteeing that a snapshot always exists once the system is
//! in steady state.

use crate::chain::{BlockNumber, ChainClient};
use crate::error::{Result, SnapguardError};
use crate::store::SnapshotStore;
use crate::worker::{CaptureOutcome, CaptureRequest};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::info;

/// How startup state was established.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecoveryOutcome {
    /// A persisted snapshot existed and the chain service accepted it.
    Resumed { latest: BlockNumber },
    /// No usable prior state; one priming capture was persisted.
    Primed { block: BlockNumber },
}

impl RecoveryOutcome {
    /// Progress number the scheduler should start from.
    pub fn latest_seen(&self) -> BlockNumber {
        match self {
            Self::Resumed { latest } => *latest,
            Self::Primed { block } => *block,
        }
    }
}

/// Load persisted state into the chain service, or prime the store with an
/// initial capture when no usable state exists.
///
/// The priming capture goes through the worker's own channel pair so the
/// dump-then-persist path is identical to steady-state captures. A load
/// call that returns definitive rejection is fatal; absent data is not an
/// error.
pub async fn recover(
    client: &Arc<dyn ChainClient>,
    store: &Arc<dyn SnapshotStore>,
    requests: &mpsc::Sender<CaptureRequest>,
    outcomes: &mut mpsc::Receiver<CaptureOutcome>,
) -> Result<RecoveryOutcome> {
    match store.read().await? {
        Some(bytes) => {
            let accepted = client.load_state(&bytes).await?;
            if !accepted {
                return Err(SnapguardError::LoadRejected);
            }

            let latest = client.current_progress().await?;
            info!(
                size_bytes = bytes.len(),
                latest, "✅ Loaded persisted snapshot into chain service"
            );
            Ok(RecoveryOutcome::Resumed { latest })
        }
        None => {
            info!("No persisted snapshot found, priming with an initial capture");

            let block = client.current_progress().await?;
            requests
                .send(CaptureRequest { block })
                .await
                .map_err(|_| SnapguardError::ChannelClosed {
                    channel: "capture requests",
                })?;
            let outcome = outcomes.recv().await.ok_or(SnapguardError::ChannelClosed {
                channel: "capture outcomes",
            })?;
            outcome?;

            info!(block, "✅ Priming capture persisted");
            Ok(RecoveryOutcome::Primed { block })
        }
    }
}
