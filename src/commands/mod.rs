//! Command handlers
//!
//! Each command handler orchestrates the execution of a CLI command.

pub mod merge;
pub mod plot;
pub mod run;
pub mod snapshot;
pub mod stats;

pub use merge::run_merge;
pub use plot::run_plot;
pub use run::run_monitor;
pub use snapshot::run_snapshot;
pub use stats::run_stats;
