//! listenwatch - live-stream listener monitor library
//!
//! This library provides the core functionality for sampling an
//! Icecast-style status page, logging listener counts per session,
//! evaluating audience trends and emailing heartbeats and alerts.
//!
//! # Modules
//!
//! - [`cli`]: Command-line interface definitions
//! - [`commands`]: Command handlers
//! - [`config`]: Configuration system
//! - [`domain`]: Observations, downtime tracking and performance evaluation
//! - [`error`]: Error types
//! - [`notify`]: Email notifications
//! - [`plot`]: Session plots
//! - [`services`]: The monitoring loop
//! - [`source`]: Status page access
//! - [`store`]: Session log persistence

pub mod cli;
pub mod commands;
pub mod config;
pub mod domain;
pub mod error;
pub mod notify;
pub mod plot;
pub mod services;
pub mod source;
pub mod store;

#[cfg(any(test, feature = "mock"))]
pub mod mock;

pub use error::{AppError, Result};
