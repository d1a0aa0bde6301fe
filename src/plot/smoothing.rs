//! Series smoothing helpers

use crate::domain::performance::median;
use chrono::NaiveDateTime;

/// Samples per minute implied by the median spacing of `timestamps`
///
/// Rounded to the nearest whole rate so that ticks stretched by fetch and
/// write time (30.3 s for a 30 s interval) still read as the nominal rate.
/// `None` when there are fewer than two timestamps or the spacing is
/// not positive. Spacing above one minute still yields one sample.
pub fn samples_per_minute(timestamps: &[NaiveDateTime]) -> Option<usize> {
    let gaps: Vec<f64> = timestamps
        .windows(2)
        .map(|w| (w[1] - w[0]).num_milliseconds() as f64 / 1000.0)
        .collect();

    let spacing = median(&gaps);
    if spacing.is_nan() || spacing <= 0.0 {
        return None;
    }
    Some(((60.0 / spacing).round() as usize).max(1))
}

/// Centered rolling median
///
/// A point gets a value only when its full window lies inside the series
/// and holds no missing values; everything else is NaN. For even windows
/// the extra sample sits after the center.
pub fn rolling_median_centered(values: &[f64], window: usize) -> Vec<f64> {
    if window <= 1 {
        return values.to_vec();
    }

    let after = window / 2;
    let before = window - 1 - after;

    (0..values.len())
        .map(|i| {
            if i < before || i + after >= values.len() {
                return f64::NAN;
            }
            let slice = &values[i - before..=i + after];
            if slice.iter().any(|v| v.is_nan()) {
                f64::NAN
            } else {
                median(slice)
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate};

    #[test]
    fn test_samples_per_minute_from_spacing() {
        let start = NaiveDate::from_ymd_opt(2020, 11, 12)
            .unwrap()
            .and_hms_opt(21, 0, 0)
            .unwrap();
        let every_15s: Vec<_> = (0..10).map(|i| start + Duration::seconds(15 * i)).collect();
        assert_eq!(samples_per_minute(&every_15s), Some(4));

        let every_2m: Vec<_> = (0..3).map(|i| start + Duration::minutes(2 * i)).collect();
        assert_eq!(samples_per_minute(&every_2m), Some(1));

        assert_eq!(samples_per_minute(&[start]), None);
        assert_eq!(samples_per_minute(&[start, start]), None);
    }

    #[test]
    fn test_samples_per_minute_tolerates_slow_ticks() {
        let start = NaiveDate::from_ymd_opt(2020, 11, 12)
            .unwrap()
            .and_hms_opt(21, 0, 0)
            .unwrap();
        let every_30_3s: Vec<_> = (0..20)
            .map(|i| start + Duration::milliseconds(30_300 * i))
            .collect();
        assert_eq!(samples_per_minute(&every_30_3s), Some(2));

        let every_14_8s: Vec<_> = (0..20)
            .map(|i| start + Duration::milliseconds(14_800 * i))
            .collect();
        assert_eq!(samples_per_minute(&every_14_8s), Some(4));
    }

    #[test]
    fn test_rolling_median_odd_window() {
        let out = rolling_median_centered(&[1.0, 9.0, 2.0, 8.0, 3.0], 3);
        assert!(out[0].is_nan());
        assert_eq!(&out[1..4], &[2.0, 8.0, 3.0]);
        assert!(out[4].is_nan());
    }

    #[test]
    fn test_rolling_median_even_window() {
        // window 4 covers [i-1, i+2]
        let out = rolling_median_centered(&[1.0, 2.0, 3.0, 4.0, 5.0], 4);
        assert!(out[0].is_nan());
        assert_eq!(out[1], 2.5);
        assert_eq!(out[2], 3.5);
        assert!(out[3].is_nan());
        assert!(out[4].is_nan());
    }

    #[test]
    fn test_rolling_median_gap_propagates() {
        let out = rolling_median_centered(&[1.0, f64::NAN, 3.0, 4.0, 5.0, 6.0], 3);
        assert!(out[1].is_nan());
        assert!(out[2].is_nan());
        assert_eq!(out[3], 4.0);
    }

    #[test]
    fn test_window_of_one_is_identity() {
        assert_eq!(rolling_median_centered(&[3.0, 1.0], 1), vec![3.0, 1.0]);
    }
}
