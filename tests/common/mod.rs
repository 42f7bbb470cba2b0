//! Shared fixtures for coordinator integration tests.
//!
//! `MockChainClient` is a scripted chain service: the test owns the
//! progress feed, can gate dump completion to hold captures in flight, and
//! can make dumps hang entirely to exercise the drain deadline.

#![allow(dead_code)]

use async_trait::async_trait;
use snapguard::{
    BlockNumber, ChainClient, ProgressSubscription, Result, SnapguardConfig, SnapguardError,
};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::{mpsc, Semaphore};

/// Sender halves of the progress subscription, owned by the test.
pub struct ProgressFeed {
    pub events: mpsc::Sender<BlockNumber>,
    pub errors: mpsc::Sender<String>,
}

pub struct MockChainClient {
    current: AtomicU64,
    dumps: AtomicU64,
    dump_attempts: AtomicU64,
    gate_enabled: AtomicBool,
    gate: Semaphore,
    hang_dumps: AtomicBool,
    load_response: Mutex<Option<bool>>,
    loads: Mutex<Vec<Vec<u8>>>,
    subscription: Mutex<Option<ProgressSubscription>>,
}

impl MockChainClient {
    /// Create a client reporting `current` as its progress number, plus the
    /// feed the test uses to deliver events and subscription errors.
    pub fn new(current: BlockNumber) -> (Arc<Self>, ProgressFeed) {
        let (event_tx, event_rx) = mpsc::channel(64);
        let (error_tx, error_rx) = mpsc::channel(16);

        let client = Arc::new(Self {
            current: AtomicU64::new(current),
            dumps: AtomicU64::new(0),
            dump_attempts: AtomicU64::new(0),
            gate_enabled: AtomicBool::new(false),
            gate: Semaphore::new(0),
            hang_dumps: AtomicBool::new(false),
            load_response: Mutex::new(None),
            loads: Mutex::new(Vec::new()),
            subscription: Mutex::new(Some(ProgressSubscription {
                events: event_rx,
                errors: error_rx,
            })),
        });

        (
            client,
            ProgressFeed {
                events: event_tx,
                errors: error_tx,
            },
        )
    }

    /// Script the reply to `load_state`. Without this, any load call fails
    /// the test, which is how "no load expected" scenarios assert.
    pub fn respond_to_load(&self, accepted: bool) {
        *self.load_response.lock().unwrap() = Some(accepted);
    }

    /// Make every dump wait for an explicit [`release_dump`](Self::release_dump).
    pub fn gate_dumps(&self) {
        self.gate_enabled.store(true, Ordering::SeqCst);
    }

    /// Stop gating dumps; subsequent dumps complete immediately.
    pub fn ungate_dumps(&self) {
        self.gate_enabled.store(false, Ordering::SeqCst);
        self.gate.add_permits(1024);
    }

    /// Let exactly one gated dump proceed.
    pub fn release_dump(&self) {
        self.gate.add_permits(1);
    }

    /// Make every subsequent dump hang forever.
    pub fn hang_dumps(&self) {
        self.hang_dumps.store(true, Ordering::SeqCst);
    }

    /// Number of dumps that actually executed (gated dumps count once
    /// released).
    pub fn dump_count(&self) -> u64 {
        self.dumps.load(Ordering::SeqCst)
    }

    /// Number of dumps that have at least started, including ones currently
    /// held at the gate or hung. Lets tests observe "capture in flight".
    pub fn dump_attempts(&self) -> u64 {
        self.dump_attempts.load(Ordering::SeqCst)
    }

    pub fn load_count(&self) -> usize {
        self.loads.lock().unwrap().len()
    }

    pub fn loaded_bytes(&self) -> Vec<Vec<u8>> {
        self.loads.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChainClient for MockChainClient {
    async fn current_progress(&self) -> Result<BlockNumber> {
        Ok(self.current.load(Ordering::SeqCst))
    }

    async fn dump_state(&self) -> Result<Vec<u8>> {
        self.dump_attempts.fetch_add(1, Ordering::SeqCst);
        if self.hang_dumps.load(Ordering::SeqCst) {
            futures::future::pending::<()>().await;
        }
        if self.gate_enabled.load(Ordering::SeqCst) {
            let permit = self
                .gate
                .acquire()
                .await
                .map_err(|_| SnapguardError::Dump {
                    message: "gate closed".into(),
                })?;
            permit.forget();
        }

        let n = self.dumps.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(format!("dump-{n}").into_bytes())
    }

    async fn load_state(&self, bytes: &[u8]) -> Result<bool> {
        self.loads.lock().unwrap().push(bytes.to_vec());
        match *self.load_response.lock().unwrap() {
            Some(accepted) => Ok(accepted),
            None => Err(SnapguardError::Load {
                message: "unexpected load_state call".into(),
            }),
        }
    }

    async fn subscribe_progress(&self) -> Result<ProgressSubscription> {
        self.subscription
            .lock()
            .unwrap()
            .take()
            .ok_or(SnapguardError::Subscribe {
                message: "already subscribed".into(),
            })
    }
}

/// Config tuned for tests: no retries, tiny backoff, generous drain budget.
pub fn fast_config() -> SnapguardConfig {
    SnapguardConfig {
        retry_limit: 0,
        backoff_base_ms: 1,
        backoff_max_ms: 4,
        drain_timeout_ms: 5_000,
    }
}

/// Poll `cond` until it holds or a second passes.
pub async fn wait_until(mut cond: impl FnMut() -> bool, what: &str) {
    for _ in 0..200 {
        if cond() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("timed out waiting for {what}");
}
