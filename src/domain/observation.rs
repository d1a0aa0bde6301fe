//! Listener observation domain type
//!
//! One observation is produced per tick. The constructors enforce the
//! field combinations that can actually occur, so an `Observation` is
//! always internally consistent.

use chrono::{Local, NaiveDateTime};
use serde::Serialize;
use std::fmt;

/// A single listener-count reading taken at one tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Observation {
    timestamp: NaiveDateTime,
    current: Option<u32>,
    peak: Option<u32>,
    on_air: bool,
    connection_error: bool,
}

impl Observation {
    /// Stream is live and both counts were read
    pub fn on_air(timestamp: NaiveDateTime, current: u32, peak: u32) -> Self {
        Self {
            timestamp,
            current: Some(current),
            peak: Some(peak),
            on_air: true,
            connection_error: false,
        }
    }

    /// Page was reachable but the stream is down
    pub fn off_air(timestamp: NaiveDateTime) -> Self {
        Self {
            timestamp,
            current: None,
            peak: None,
            on_air: false,
            connection_error: false,
        }
    }

    /// Page could not be fetched or parsed
    pub fn connection_error(timestamp: NaiveDateTime) -> Self {
        Self {
            timestamp,
            current: None,
            peak: None,
            on_air: false,
            connection_error: true,
        }
    }

    /// Rebuild an observation from persisted fields
    ///
    /// Returns `None` when the combination violates the observation
    /// invariants (on-air without counts, off-air with counts).
    pub fn from_parts(
        timestamp: NaiveDateTime,
        current: Option<u32>,
        peak: Option<u32>,
        on_air: bool,
        connection_error: bool,
    ) -> Option<Self> {
        match (on_air, connection_error, current, peak) {
            (true, false, Some(c), Some(p)) => Some(Self::on_air(timestamp, c, p)),
            (false, false, None, None) => Some(Self::off_air(timestamp)),
            (false, true, None, None) => Some(Self::connection_error(timestamp)),
            _ => None,
        }
    }

    /// Same reading stamped at `timestamp`
    pub fn at(self, timestamp: NaiveDateTime) -> Self {
        Self { timestamp, ..self }
    }

    /// Current wall-clock time in the local timezone
    pub fn now() -> NaiveDateTime {
        Local::now().naive_local()
    }

    #[inline]
    pub fn timestamp(&self) -> NaiveDateTime {
        self.timestamp
    }

    #[inline]
    pub fn current(&self) -> Option<u32> {
        self.current
    }

    #[inline]
    pub fn peak(&self) -> Option<u32> {
        self.peak
    }

    #[inline]
    pub fn is_on_air(&self) -> bool {
        self.on_air
    }

    #[inline]
    pub fn is_connection_error(&self) -> bool {
        self.connection_error
    }

    /// True for any tick that counts toward downtime
    pub fn is_down(&self) -> bool {
        !self.on_air || self.connection_error
    }
}

impl fmt::Display for Observation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ts = self.timestamp.format("%H:%M:%S");
        match (self.current, self.peak) {
            (Some(c), Some(p)) => write!(f, "{} on air: {} listeners (peak {})", ts, c, p),
            _ if self.connection_error => write!(f, "{} connection error", ts),
            _ => write!(f, "{} off air", ts),
        }
    }
}

/// Latest current/peak pair read back from a log
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct LatestAudience {
    pub current: Option<u32>,
    pub peak: Option<u32>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn ts() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2020, 11, 12)
            .unwrap()
            .and_hms_opt(21, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_on_air_has_counts() {
        let obs = Observation::on_air(ts(), 42, 60);
        assert!(obs.is_on_air());
        assert!(!obs.is_down());
        assert_eq!(obs.current(), Some(42));
        assert_eq!(obs.peak(), Some(60));
    }

    #[test]
    fn test_connection_error_is_off_air() {
        let obs = Observation::connection_error(ts());
        assert!(!obs.is_on_air());
        assert!(obs.is_connection_error());
        assert!(obs.is_down());
        assert_eq!(obs.current(), None);
    }

    #[test]
    fn test_from_parts_rejects_inconsistent_rows() {
        assert!(Observation::from_parts(ts(), Some(1), None, true, false).is_none());
        assert!(Observation::from_parts(ts(), Some(1), Some(2), false, false).is_none());
        assert!(Observation::from_parts(ts(), None, None, true, false).is_none());
        assert!(Observation::from_parts(ts(), Some(1), Some(2), true, true).is_none());
        assert_eq!(
            Observation::from_parts(ts(), None, None, false, true),
            Some(Observation::connection_error(ts()))
        );
    }

    #[test]
    fn test_display() {
        assert_eq!(
            Observation::on_air(ts(), 3, 9).to_string(),
            "21:00:00 on air: 3 listeners (peak 9)"
        );
        assert_eq!(Observation::off_air(ts()).to_string(), "21:00:00 off air");
    }
}
