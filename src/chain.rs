//! # Chain Client Interface
//!
//! The narrow seam to the supervised chain service. The coordinator only
//! needs four operations: current progress, a one-shot state dump, a
//! one-shot state load, and a subscription producing block arrivals plus a
//! side channel of subscription errors.
//!
//! Implementations own everything this crate deliberately does not: process
//! supervision, RPC transport, and the snapshot byte format. The dump
//! payload is opaque bytes end to end.

use crate::error::Result;
use async_trait::async_trait;
use tokio::sync::mpsc;

/// Monotonically non-decreasing unit of upstream progress (a block height).
pub type BlockNumber = u64;

/// A live progress subscription.
///
/// `events` yields block numbers in non-decreasing order. `errors` is a
/// non-fatal side channel; an error there means delivery may be stale but
/// the subscription object itself is still alive. Closing `events` means
/// the subscription has ended for good.
pub struct ProgressSubscription {
    pub events: mpsc::Receiver<BlockNumber>,
    pub errors: mpsc::Receiver<String>,
}

/// Client contract for the supervised chain service.
#[async_trait]
pub trait ChainClient: Send + Sync {
    /// Current progress number of the service.
    async fn current_progress(&self) -> Result<BlockNumber>;

    /// Dump the service's full state as opaque bytes.
    async fn dump_state(&self) -> Result<Vec<u8>>;

    /// Load previously dumped state into the service.
    ///
    /// `Ok(false)` means the call went through but the service rejected the
    /// data; transport failures are `Err`.
    async fn load_state(&self, bytes: &[u8]) -> Result<bool>;

    /// Subscribe to progress events.
    async fn subscribe_progress(&self) -> Result<ProgressSubscription>;
}
