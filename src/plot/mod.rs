//! Session plots
//!
//! Rendered once at the end of a monitoring session, or on demand by the
//! `plot` and `merge` commands.

pub mod render;
pub mod smoothing;

pub use render::{render_plot, PlotOptions};
pub use smoothing::{rolling_median_centered, samples_per_minute};
