// State machine module for the snapshot debounce coordinator
//
// The scheduler's decision logic lives here as a pure transition function
// over explicit states, so the full transition table can be tested without
// a worker, a chain client, or any I/O.

pub mod debounce;
pub mod events;
pub mod states;

// Re-export main types for convenient access
pub use debounce::{DebounceMachine, DrainPlan, Effect};
pub use events::SchedulerEvent;
pub use states::CaptureState;
