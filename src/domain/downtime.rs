//! Consecutive downtime tracking

use crate::domain::Observation;

/// Consecutive-failure accounting
///
/// The count resets on any on-air reading and grows by one on every
/// off-air or unreachable tick. The session ends once the count goes
/// strictly above the ceiling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DowntimeTracker;

impl DowntimeTracker {
    /// Number of consecutive down ticks tolerated
    ///
    /// `floor(minutes * 60 / interval)`, zero when the budget is shorter
    /// than one tick.
    pub fn ceiling_for(max_downtime_minutes: u64, tick_interval_seconds: u64) -> u32 {
        if tick_interval_seconds == 0 {
            return u32::MAX;
        }
        let ticks = max_downtime_minutes.saturating_mul(60) / tick_interval_seconds;
        u32::try_from(ticks).unwrap_or(u32::MAX)
    }

    /// Next downtime count given an observation and the prior count
    pub fn update(obs: &Observation, count: u32) -> u32 {
        if obs.is_down() {
            count.saturating_add(1)
        } else {
            0
        }
    }
}
