//! Service layer
//!
//! The monitoring loop that ties sampling, the session log, performance
//! evaluation and notifications together.

pub mod monitor;

pub use monitor::{
    MonitorConfig, Phase, Runner, RunnerState, SessionSummary, Sleeper, ThreadSleeper, TickOutcome,
};
