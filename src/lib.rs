#![allow(clippy::missing_errors_doc)] // Allow public functions without # Errors sections
#![allow(clippy::must_use_candidate)] // Allow methods without must_use when context is clear

//! # Snapguard
//!
//! Snapshot debounce coordinator for a long-running, stateful chain service.
//! Keeps a durable single-slot snapshot synchronized with a stream of
//! monotonically increasing block arrivals, so a restart resumes from the
//! most recent known state instead of genesis.
//!
//! ## Architecture
//!
//! Three cooperating pieces:
//!
//! - [`state_machine::DebounceMachine`] decides *when* to capture: it
//!   coalesces rapid-fire block arrivals into at most one in-flight capture
//!   plus one pending follow-up, as a pure transition function with no I/O.
//! - [`worker::SnapshotWorker`] executes dump-then-persist operations
//!   strictly sequentially, with bounded retry and exponential backoff.
//! - [`coordinator::SnapshotCoordinator`] wires them together: startup
//!   recovery, the `tokio::select!` event loop, and the shutdown drain that
//!   guarantees one final capture of the latest observed block.
//!
//! The supervised service itself stays behind two narrow trait seams:
//! [`chain::ChainClient`] (progress, dump, load, subscribe) and
//! [`store::SnapshotStore`] (single overwritable slot). Process spawning,
//! RPC transport, and the snapshot byte format all live on the other side
//! of those seams.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use snapguard::{FileSnapshotStore, SnapguardConfig, SnapshotCoordinator};
//! use std::sync::Arc;
//! use tokio::sync::Notify;
//!
//! # async fn example(client: Arc<dyn snapguard::ChainClient>) -> snapguard::Result<()> {
//! snapguard::init_structured_logging();
//!
//! let store = Arc::new(FileSnapshotStore::new("chain_state.bin"));
//! let config = SnapguardConfig::from_env()?;
//! let coordinator = SnapshotCoordinator::new(client, store, config);
//!
//! let shutdown = Arc::new(Notify::new());
//! tokio::spawn({
//!     let shutdown = shutdown.clone();
//!     async move {
//!         let _ = tokio::signal::ctrl_c().await;
//!         shutdown.notify_one();
//!     }
//! });
//!
//! coordinator.run(shutdown).await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Guarantees
//!
//! - At most one dump-and-persist operation executes at any instant.
//! - A block arriving mid-capture is never dropped; the newest one is
//!   eventually captured.
//! - Shutdown always attempts one final capture reflecting the latest
//!   observed block, under a configurable drain deadline.

pub mod chain;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod logging;
pub mod recovery;
pub mod state_machine;
pub mod store;
pub mod worker;

pub use chain::{BlockNumber, ChainClient, ProgressSubscription};
pub use config::SnapguardConfig;
pub use coordinator::SnapshotCoordinator;
pub use error::{Result, SnapguardError};
pub use logging::init_structured_logging;
pub use recovery::{recover, RecoveryOutcome};
pub use state_machine::{CaptureState, DebounceMachine, DrainPlan, Effect, SchedulerEvent};
pub use store::{FileSnapshotStore, MemorySnapshotStore, SnapshotStore};
pub use worker::{CaptureOutcome, CaptureRequest, SnapshotWorker};
