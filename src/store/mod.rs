//! Session log persistence
//!
//! A flat CSV file per monitoring session stands in for a database.

pub mod session_log;

pub use session_log::{SessionLog, HEADER, ID_FORMAT, TIMESTAMP_FORMAT};
