//! # Error Types
//!
//! Structured error handling for the snapshot coordinator using thiserror
//! for typed errors instead of `Box<dyn Error>` patterns.
//!
//! The taxonomy mirrors the failure policy: capture and load failures are
//! unrecoverable once retries are exhausted, while an absent snapshot at
//! startup is not an error at all. Subscription errors never surface here;
//! they are reported on the subscription side channel and the event loop
//! continues.

use thiserror::Error;

/// Errors surfaced by the snapshot coordinator and its collaborators.
#[derive(Error, Debug)]
pub enum SnapguardError {
    /// The chain service failed to produce a state dump.
    #[error("State dump failed: {message}")]
    Dump { message: String },

    /// The persistent store failed to write the snapshot slot.
    #[error("Snapshot write failed: {message}")]
    StoreWrite { message: String },

    /// The persistent store failed while reading the snapshot slot.
    /// Absent data is `Ok(None)` on the store, never this error.
    #[error("Snapshot read failed: {message}")]
    StoreRead { message: String },

    /// The load call against the chain service failed in transit.
    #[error("State load failed: {message}")]
    Load { message: String },

    /// The chain service received the persisted snapshot but rejected it.
    /// Distinct from absent data: data existed and could not be applied.
    #[error("Chain service rejected the persisted snapshot")]
    LoadRejected,

    /// Establishing the progress subscription failed at startup.
    #[error("Progress subscription failed: {message}")]
    Subscribe { message: String },

    /// The shutdown drain did not finish within its deadline. The persisted
    /// slot still holds the last successfully captured snapshot.
    #[error("Shutdown drain exceeded its {timeout_ms}ms budget")]
    DrainTimeout { timeout_ms: u64 },

    /// Invalid configuration value.
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// An internal channel between coordinator and worker closed while the
    /// other side still expected it.
    #[error("Internal channel closed unexpectedly: {channel}")]
    ChannelClosed { channel: &'static str },
}

pub type Result<T> = std::result::Result<T, SnapguardError>;
