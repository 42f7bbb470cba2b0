use crate::chain::BlockNumber;
use serde::{Deserialize, Serialize};

/// Events consumed by the debounce machine
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum SchedulerEvent {
    /// A new block arrived on the progress subscription
    Progress(BlockNumber),
    /// The worker finished the capture for the given block
    CaptureCompleted(BlockNumber),
    /// The subscription reported a non-fatal delivery error
    SubscriptionLost(String),
    /// An external shutdown was requested
    ShutdownRequested,
}

impl SchedulerEvent {
    /// Get a string representation of the event type for logging
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::Progress(_) => "progress",
            Self::CaptureCompleted(_) => "capture_completed",
            Self::SubscriptionLost(_) => "subscription_lost",
            Self::ShutdownRequested => "shutdown_requested",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_with_snake_case_tags() {
        let json = serde_json::to_value(SchedulerEvent::Progress(42)).unwrap();
        assert_eq!(json["type"], "progress");
        assert_eq!(json["data"], 42);

        let json = serde_json::to_value(SchedulerEvent::ShutdownRequested).unwrap();
        assert_eq!(json["type"], "shutdown_requested");
    }

    #[test]
    fn event_type_matches_variant() {
        assert_eq!(SchedulerEvent::CaptureCompleted(1).event_type(), "capture_completed");
        assert_eq!(
            SchedulerEvent::SubscriptionLost("x".into()).event_type(),
            "subscription_lost"
        );
    }
}
