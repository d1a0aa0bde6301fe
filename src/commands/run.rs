//! Run command implementation
//!
//! Starts a monitoring session against the live status page.

use crate::cli::args::{OutputFormat, RunArgs};
use crate::cli::output::{print_output, RunReport};
use crate::config::{Config, ConfigBuilder, NotifyConfig};
use crate::error::Result;
use crate::notify::message::heartbeat_subject;
use crate::notify::{Credentials, EmailNotifier, SmtpMailer};
use crate::services::{Runner, ThreadSleeper};
use crate::source::{HttpFetcher, Sampler};

use std::time::Duration;

/// Execute the run command
pub fn run_monitor(args: &RunArgs, config_path: Option<&str>, format: OutputFormat) -> Result<()> {
    let config = build_config(args, config_path)?;

    let fetcher = HttpFetcher::new(Duration::from_secs(config.source.timeout_seconds))?;
    let sampler = Sampler::new(fetcher, config.source.url.clone(), config.source.layout());

    let notifier = EmailNotifier::new(
        SmtpMailer::new(config.notify.smtp_host.clone(), config.notify.smtp_port),
        load_credentials(&config.notify),
        heartbeat_subject(&config.notify.subject_prefix),
    );
    if !notifier.has_credentials() {
        log::warn!("No sender credentials; notifications are disabled for this session");
    }

    let mut runner = Runner::start(config.monitor_config(), sampler, notifier, ThreadSleeper)?;
    let summary = runner.run()?;

    let report = RunReport {
        log: summary.log_path,
        ticks: summary.ticks,
        heartbeats_sent: summary.heartbeats_sent,
        alerts_sent: summary.alerts_sent,
        plot: summary.plot_path,
    };
    print_output(&report, format)?;

    Ok(())
}

/// Layer the run flags over the configuration file
fn build_config(args: &RunArgs, config_path: Option<&str>) -> Result<Config> {
    let config = ConfigBuilder::new()
        .with_file(config_path)?
        .with_url(args.url.clone())
        .with_log_directory(args.log_dir.clone())
        .with_interval(args.interval)
        .with_max_downtime(args.max_downtime)
        .with_heartbeat_interval(args.heartbeat_every)
        .with_eval_window(args.eval_window)
        .with_min_variation(args.min_variation)
        .with_credentials_file(args.credentials.clone())
        .with_heartbeat_recipients(args.heartbeat_to.clone())
        .with_alert_recipients(args.alert_to.clone())
        .with_no_plot(args.no_plot)
        .build()?;
    Ok(config)
}

/// Sender credentials, or `None` when absent or unreadable
fn load_credentials(notify: &NotifyConfig) -> Option<Credentials> {
    let path = notify.credentials_file.as_ref()?;
    match Credentials::load(path, &notify.credentials_separator) {
        Ok(credentials) => {
            log::info!("Sending notifications as {}", credentials.address());
            Some(credentials)
        }
        Err(e) => {
            log::warn!("Ignoring credentials file {}: {}", path.display(), e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{AppError, ConfigError};
    use tempfile::TempDir;

    fn config_file(dir: &TempDir, content: &str) -> String {
        let path = dir.path().join("listenwatch.toml");
        std::fs::write(&path, content).unwrap();
        path.display().to_string()
    }

    #[test]
    fn test_flags_override_file() {
        let dir = TempDir::new().unwrap();
        let path = config_file(
            &dir,
            "[general]\ntick_interval_seconds = 20\nmax_downtime_minutes = 3\n",
        );
        let args = RunArgs {
            interval: Some(10),
            alert_to: vec!["ops@example.com".to_string()],
            no_plot: true,
            ..RunArgs::default()
        };

        let config = build_config(&args, Some(&path)).unwrap();
        assert_eq!(config.general.tick_interval_seconds, 10);
        assert_eq!(config.general.max_downtime_minutes, 3);
        assert_eq!(config.notify.alert_recipients.addresses(), vec!["ops@example.com"]);
        assert!(!config.plot.enabled);
    }

    #[test]
    fn test_invalid_interval_rejected() {
        let dir = TempDir::new().unwrap();
        let path = config_file(&dir, "");
        let args = RunArgs {
            interval: Some(120),
            ..RunArgs::default()
        };
        let result = build_config(&args, Some(&path));
        assert!(matches!(
            result,
            Err(AppError::Config(ConfigError::InvalidValue { .. }))
        ));
    }

    #[test]
    fn test_load_credentials() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("creds");
        std::fs::write(&path, "monitor@example.com_secret_part\n").unwrap();

        let mut notify = NotifyConfig::default();
        assert!(load_credentials(&notify).is_none());

        notify.credentials_file = Some(path);
        let credentials = load_credentials(&notify).unwrap();
        assert_eq!(credentials.address(), "monitor@example.com");

        notify.credentials_file = Some(dir.path().join("missing"));
        assert!(load_credentials(&notify).is_none());
    }
}
