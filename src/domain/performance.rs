//! Windowed listener performance
//!
//! Compares the median listener count of the most recent window against
//! the window immediately before it.

use crate::domain::Observation;
use serde::Serialize;

/// Output of a performance evaluation
///
/// Any field may be NaN when the underlying window has no counts.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PerformanceReport {
    /// Mean of the recent window
    pub mean_recent: f64,
    /// Median of the recent window
    pub median_recent: f64,
    /// Median of the prior window
    pub median_prior: f64,
    /// Percent change of the recent median over the prior median
    pub pct_change: f64,
}

impl PerformanceReport {
    /// Whether the change is large enough to alert on
    pub fn exceeds(&self, min_percent_variation: f64) -> bool {
        !self.pct_change.is_nan() && self.pct_change.abs() >= min_percent_variation
    }
}

/// Evaluates two adjacent trailing windows of the `current` column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PerformanceEvaluator {
    window_minutes: u64,
    samples_per_minute: u64,
}

impl PerformanceEvaluator {
    pub fn new(window_minutes: u64, samples_per_minute: u64) -> Self {
        Self {
            window_minutes,
            samples_per_minute,
        }
    }

    /// Number of samples in each window
    pub fn samples_per_chunk(&self) -> usize {
        usize::try_from(self.window_minutes.saturating_mul(self.samples_per_minute))
            .unwrap_or(usize::MAX)
    }

    /// Whether `rows` is enough history for a meaningful comparison
    pub fn has_history(&self, rows: usize) -> bool {
        let chunk = self.samples_per_chunk();
        chunk > 0 && rows >= chunk.saturating_mul(2)
    }

    /// Evaluate the trailing windows of a log's observations
    pub fn evaluate(&self, observations: &[Observation]) -> PerformanceReport {
        let series: Vec<f64> = observations
            .iter()
            .map(|o| o.current().map_or(f64::NAN, f64::from))
            .collect();
        self.evaluate_series(&series)
    }

    /// Evaluate a raw `current` column where NaN marks a missing count
    ///
    /// Shorter series yield shorter (possibly empty) windows.
    pub fn evaluate_series(&self, series: &[f64]) -> PerformanceReport {
        let chunk = self.samples_per_chunk();
        let len = series.len();
        let recent_start = len.saturating_sub(chunk);
        let prior_start = recent_start.saturating_sub(chunk);

        let recent = &series[recent_start..];
        let prior = &series[prior_start..recent_start];

        let median_recent = median(recent);
        let median_prior = median(prior);

        PerformanceReport {
            mean_recent: mean(recent),
            median_recent,
            median_prior,
            pct_change: pct_change(median_prior, median_recent),
        }
    }
}

/// Arithmetic mean ignoring NaN entries
pub fn mean(values: &[f64]) -> f64 {
    let (sum, n) = values
        .iter()
        .filter(|v| !v.is_nan())
        .fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
    if n == 0 {
        f64::NAN
    } else {
        sum / n as f64
    }
}

/// Median ignoring NaN entries
pub fn median(values: &[f64]) -> f64 {
    let mut present: Vec<f64> = values.iter().copied().filter(|v| !v.is_nan()).collect();
    if present.is_empty() {
        return f64::NAN;
    }
    present.sort_by(f64::total_cmp);

    let mid = present.len() / 2;
    if present.len() % 2 == 0 {
        (present[mid - 1] + present[mid]) / 2.0
    } else {
        present[mid]
    }
}

/// Percent change from `prior` to `recent`
///
/// NaN when either side is NaN or `prior` is zero.
pub fn pct_change(prior: f64, recent: f64) -> f64 {
    if prior.is_nan() || recent.is_nan() || prior == 0.0 {
        f64::NAN
    } else {
        100.0 * (recent - prior) / prior
    }
}
