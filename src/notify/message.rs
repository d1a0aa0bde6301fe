//! Heartbeat and alert message composition

use crate::domain::{LatestAudience, PerformanceReport};

/// Render an optional count, `n/a` when absent
fn count(value: Option<u32>) -> String {
    value.map_or_else(|| "n/a".to_string(), |v| v.to_string())
}

/// Render a statistic, `n/a` when NaN
fn stat(value: f64) -> String {
    if value.is_nan() {
        "n/a".to_string()
    } else if value.fract() == 0.0 {
        format!("{:.0}", value)
    } else {
        format!("{:.1}", value)
    }
}

/// Percent change truncated toward zero, `n/a` when NaN
pub fn percent(value: f64) -> String {
    if value.is_nan() {
        "n/a".to_string()
    } else {
        format!("{}", value.trunc() as i64)
    }
}

/// Periodic status body
pub fn heartbeat_body(
    latest: &LatestAudience,
    performance: Option<(&PerformanceReport, u64)>,
) -> String {
    let mut body = format!(
        "current listeners: {},\npeak listeners: {}\n",
        count(latest.current),
        count(latest.peak)
    );

    if let Some((report, window_minutes)) = performance {
        body.push_str(&format!(
            "median over last {w} min: {},\npercent change over last {w} min: {}%\n",
            stat(report.median_recent),
            percent(report.pct_change),
            w = window_minutes
        ));
    }

    body
}

/// Threshold alert body
pub fn alert_body(latest: &LatestAudience, report: &PerformanceReport, window_minutes: u64) -> String {
    format!(
        "median number of listeners over last {w} min: {},\n\
         percent change over last {w} min: {}%\n\n\
         current listeners: {},\n\
         peak listeners so far: {}\n",
        stat(report.median_recent),
        percent(report.pct_change),
        count(latest.current),
        count(latest.peak),
        w = window_minutes
    )
}

/// Threshold alert subject
pub fn alert_subject(prefix: &str, report: &PerformanceReport) -> String {
    format!("{}: {}% variation in listeners!", prefix, percent(report.pct_change))
}

/// Default heartbeat subject
pub fn heartbeat_subject(prefix: &str) -> String {
    format!("{}: Periodic Update", prefix)
}
