use serde::{Deserialize, Serialize};
use std::fmt;

/// Scheduler states for the snapshot debounce machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaptureState {
    /// No capture in flight, nothing pending
    Idle,
    /// Exactly one capture in flight, nothing pending
    Capturing,
    /// One capture in flight plus one coalesced follow-up pending
    CapturingWithPending,
    /// Terminal state, entered only after the shutdown drain completes
    Stopped,
}

impl CaptureState {
    /// Check if a capture is currently in flight
    pub fn is_capturing(&self) -> bool {
        matches!(self, Self::Capturing | Self::CapturingWithPending)
    }

    /// Check if this is the terminal state (no further transitions allowed)
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Stopped)
    }
}

impl fmt::Display for CaptureState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Capturing => write!(f, "capturing"),
            Self::CapturingWithPending => write!(f, "capturing_with_pending"),
            Self::Stopped => write!(f, "stopped"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_matches_serde_rename() {
        for state in [
            CaptureState::Idle,
            CaptureState::Capturing,
            CaptureState::CapturingWithPending,
            CaptureState::Stopped,
        ] {
            let json = serde_json::to_string(&state).unwrap();
            assert_eq!(json.trim_matches('"'), state.to_string());
        }
    }

    #[test]
    fn capturing_predicates() {
        assert!(!CaptureState::Idle.is_capturing());
        assert!(CaptureState::Capturing.is_capturing());
        assert!(CaptureState::CapturingWithPending.is_capturing());
        assert!(!CaptureState::Stopped.is_capturing());
        assert!(CaptureState::Stopped.is_terminal());
    }
}
