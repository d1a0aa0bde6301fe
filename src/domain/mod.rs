//! Domain models for listenwatch
//!
//! Observations, downtime accounting and windowed performance. Everything
//! here is pure: no IO, no clocks beyond `Observation::now`.

pub mod downtime;
pub mod observation;
pub mod performance;

pub use downtime::DowntimeTracker;
pub use observation::{LatestAudience, Observation};
pub use performance::{PerformanceEvaluator, PerformanceReport};
