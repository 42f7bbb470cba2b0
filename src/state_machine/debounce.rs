//! # Debounce Machine
//!
//! Pure transition function for the snapshot scheduler. Coalesces bursts of
//! block arrivals into at most one in-flight capture plus one pending
//! marker, so rapid progress never queues unbounded work while the newest
//! block number is never permanently lost.
//!
//! The machine performs no I/O. It returns an [`Effect`] describing what
//! the coordinator must do; the coordinator owns channels, tasks, and time.

use crate::chain::BlockNumber;
use crate::state_machine::events::SchedulerEvent;
use crate::state_machine::states::CaptureState;
use tracing::debug;

/// Side effect requested by a transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Nothing to do
    None,
    /// Submit a capture request for the given block to the worker
    SubmitCapture(BlockNumber),
    /// Report a non-fatal subscription error and carry on
    Report(String),
    /// Execute the shutdown drain described by the plan
    Drain(DrainPlan),
}

/// What the coordinator must do to honor the shutdown invariant: wait for
/// any in-flight capture, then force one final capture of the latest
/// observed block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DrainPlan {
    /// Whether a capture is in flight and its completion must be consumed
    /// before the final capture can be submitted
    pub wait_for_inflight: bool,
    /// Block the mandatory final capture must reflect
    pub final_block: BlockNumber,
}

/// Explicit, I/O-free model of the scheduler's decision state.
#[derive(Debug)]
pub struct DebounceMachine {
    state: CaptureState,
    pending: Option<BlockNumber>,
    latest_seen: BlockNumber,
}

impl DebounceMachine {
    /// Create a machine in `Idle` with the given starting progress number.
    pub fn new(latest_seen: BlockNumber) -> Self {
        Self {
            state: CaptureState::Idle,
            pending: None,
            latest_seen,
        }
    }

    pub fn state(&self) -> CaptureState {
        self.state
    }

    /// The coalesced follow-up block, if a capture is in flight and newer
    /// progress arrived meanwhile. Holds at most one value; a newer block
    /// always supersedes an older one.
    pub fn pending(&self) -> Option<BlockNumber> {
        self.pending
    }

    /// Most recent progress number observed.
    pub fn latest_seen(&self) -> BlockNumber {
        self.latest_seen
    }

    /// Apply one event and return the effect the coordinator must execute.
    pub fn handle(&mut self, event: SchedulerEvent) -> Effect {
        if self.state.is_terminal() {
            debug!(event = event.event_type(), "Event ignored in terminal state");
            return Effect::None;
        }

        match event {
            SchedulerEvent::Progress(block) => {
                self.latest_seen = block;
                match self.state {
                    CaptureState::Idle => {
                        self.state = CaptureState::Capturing;
                        Effect::SubmitCapture(block)
                    }
                    CaptureState::Capturing | CaptureState::CapturingWithPending => {
                        // Last writer wins: blocks are monotonic, so dropping
                        // the intermediate value loses nothing
                        self.pending = Some(block);
                        self.state = CaptureState::CapturingWithPending;
                        Effect::None
                    }
                    CaptureState::Stopped => unreachable!("terminal state handled above"),
                }
            }
            SchedulerEvent::CaptureCompleted(block) => match self.state {
                CaptureState::Capturing => {
                    debug!(block, "Capture completed, no follow-up pending");
                    self.state = CaptureState::Idle;
                    Effect::None
                }
                CaptureState::CapturingWithPending => {
                    let follow_up = self.pending.take().expect(
                        "CapturingWithPending always holds a pending block",
                    );
                    self.state = CaptureState::Capturing;
                    Effect::SubmitCapture(follow_up)
                }
                CaptureState::Idle => {
                    // No row in the transition table leads here; tolerate it
                    // rather than corrupt state
                    debug!(block, "Spurious capture completion while idle");
                    Effect::None
                }
                CaptureState::Stopped => unreachable!("terminal state handled above"),
            },
            SchedulerEvent::SubscriptionLost(message) => Effect::Report(message),
            SchedulerEvent::ShutdownRequested => Effect::Drain(DrainPlan {
                wait_for_inflight: self.state.is_capturing(),
                final_block: self.latest_seen,
            }),
        }
    }

    /// Enter the terminal state. Called by the coordinator once the drain
    /// plan has been fully executed.
    pub fn stop(&mut self) {
        self.state = CaptureState::Stopped;
        self.pending = None;
    }
}
