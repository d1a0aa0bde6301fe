//! Stats command implementation
//!
//! Summarizes a saved session log.

use crate::cli::args::{OutputFormat, StatsArgs};
use crate::cli::output::{print_output, SessionStats};
use crate::config::ConfigBuilder;
use crate::domain::PerformanceEvaluator;
use crate::error::Result;
use crate::plot::samples_per_minute;
use crate::store::{SessionLog, TIMESTAMP_FORMAT};

/// Execute the stats command
pub fn run_stats(args: &StatsArgs, config_path: Option<&str>, format: OutputFormat) -> Result<()> {
    let config = ConfigBuilder::new().with_file(config_path)?.build()?;
    let window = args.window.unwrap_or(config.evaluation.window_minutes);
    let fallback_rate = config.monitor_config().samples_per_minute();

    let log = SessionLog::open(&args.log)?;
    let stats = collect_stats(&log, window, fallback_rate)?;
    print_output(&stats, format)?;

    Ok(())
}

/// Build the summary of `log`
///
/// The sampling rate is read from the log's own timestamps; `fallback_rate`
/// is used when there are too few rows to tell.
pub fn collect_stats(log: &SessionLog, window_minutes: u64, fallback_rate: u64) -> Result<SessionStats> {
    let observations = log.read_all()?;

    let timestamps: Vec<_> = observations.iter().map(|o| o.timestamp()).collect();
    let rate = samples_per_minute(&timestamps).map_or(fallback_rate, |r| r as u64);
    let evaluator = PerformanceEvaluator::new(window_minutes, rate);

    let performance = evaluator
        .has_history(observations.len())
        .then(|| evaluator.evaluate(&observations));

    let last = observations.last();
    Ok(SessionStats {
        id: log.id(),
        path: log.path().to_path_buf(),
        rows: observations.len(),
        first: timestamps.first().map(|t| t.format(TIMESTAMP_FORMAT).to_string()),
        last: timestamps.last().map(|t| t.format(TIMESTAMP_FORMAT).to_string()),
        on_air_rows: observations.iter().filter(|o| o.is_on_air()).count(),
        connection_errors: observations.iter().filter(|o| o.is_connection_error()).count(),
        current: last.and_then(|o| o.current()),
        peak: last.and_then(|o| o.peak()),
        window_minutes,
        performance,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Observation;
    use chrono::{Duration, NaiveDate, NaiveDateTime};
    use tempfile::TempDir;

    fn start() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 10, 17)
            .unwrap()
            .and_hms_opt(20, 0, 0)
            .unwrap()
    }

    fn write_log(dir: &TempDir, observations: &[Observation]) -> SessionLog {
        let log = SessionLog::create_new(dir.path()).unwrap();
        log.write_all(observations).unwrap();
        log
    }

    #[test]
    fn test_stats_evaluates_from_log_spacing() {
        let dir = TempDir::new().unwrap();
        // 30 s spacing: 2 samples/min, 1-minute windows of 2 samples
        let observations: Vec<_> = [100, 100, 150, 150]
            .iter()
            .enumerate()
            .map(|(i, c)| Observation::on_air(start() + Duration::seconds(30 * i as i64), *c, 150))
            .collect();
        let log = write_log(&dir, &observations);

        let stats = collect_stats(&log, 1, 60).unwrap();
        assert_eq!(stats.rows, 4);
        assert_eq!(stats.current, Some(150));
        assert_eq!(stats.peak, Some(150));
        let report = stats.performance.unwrap();
        assert_eq!(report.median_prior, 100.0);
        assert_eq!(report.pct_change, 50.0);
    }

    #[test]
    fn test_stats_matches_runner_rate_with_slow_ticks() {
        let dir = TempDir::new().unwrap();
        // 30 s interval plus fetch and write time
        let observations: Vec<_> = (0..20)
            .map(|i| {
                let current = if i < 10 { 100 } else { 150 };
                Observation::on_air(start() + Duration::milliseconds(30_300 * i), current, 150)
            })
            .collect();
        let log = write_log(&dir, &observations);

        let stats = collect_stats(&log, 5, 2).unwrap();
        let report = stats.performance.unwrap();
        assert_eq!(report.median_prior, 100.0);
        assert_eq!(report.median_recent, 150.0);
        assert_eq!(report.pct_change, 50.0);
    }

    #[test]
    fn test_stats_without_history() {
        let dir = TempDir::new().unwrap();
        let observations = vec![
            Observation::on_air(start(), 10, 10),
            Observation::connection_error(start() + Duration::seconds(30)),
            Observation::off_air(start() + Duration::seconds(60)),
        ];
        let log = write_log(&dir, &observations);

        let stats = collect_stats(&log, 5, 2).unwrap();
        assert!(stats.performance.is_none());
        assert_eq!(stats.on_air_rows, 1);
        assert_eq!(stats.connection_errors, 1);
        assert_eq!(stats.current, None);
    }

    #[test]
    fn test_stats_empty_log() {
        let dir = TempDir::new().unwrap();
        let log = write_log(&dir, &[]);

        let stats = collect_stats(&log, 5, 2).unwrap();
        assert_eq!(stats.rows, 0);
        assert!(stats.first.is_none());
        assert!(stats.performance.is_none());
    }
}
