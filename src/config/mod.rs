//! Configuration system
//!
//! Handles TOML config file parsing and CLI argument merging.

pub mod builder;
pub mod file;

pub use builder::ConfigBuilder;
pub use file::ConfigFile;

use crate::error::ConfigError;
use crate::notify::credentials::DEFAULT_SEPARATOR;
use crate::notify::Recipients;
use crate::plot::PlotOptions;
use crate::services::MonitorConfig;
use crate::source::MarkerLayout;

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct Config {
    /// General settings
    pub general: GeneralConfig,
    /// Status page settings
    pub source: SourceConfig,
    /// Performance evaluation settings
    pub evaluation: EvaluationConfig,
    /// Email notification settings
    pub notify: NotifyConfig,
    /// End-of-session plot settings
    pub plot: PlotConfig,
}

/// General configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GeneralConfig {
    /// Directory for session logs and plots
    pub log_directory: PathBuf,
    /// Seconds between samples
    pub tick_interval_seconds: u64,
    /// Consecutive downtime that ends a session
    pub max_downtime_minutes: u64,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_directory: default_log_directory(),
            tick_interval_seconds: 30,
            max_downtime_minutes: 10,
        }
    }
}

fn default_log_directory() -> PathBuf {
    dirs::data_dir()
        .map(|d| d.join("listenwatch").join("sessions"))
        .unwrap_or_else(|| PathBuf::from("sessions"))
}

/// Status page configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SourceConfig {
    /// Status page URL
    pub url: String,
    /// CSS class of the statistic elements
    pub marker_class: String,
    /// Position of the current-listeners marker
    pub current_marker_index: usize,
    /// Position of the peak-listeners marker
    pub peak_marker_index: usize,
    /// Per-request timeout
    pub timeout_seconds: u64,
}

impl Default for SourceConfig {
    fn default() -> Self {
        let layout = MarkerLayout::default();
        Self {
            url: "http://radiolockdown.club:8000/".to_string(),
            marker_class: layout.class,
            current_marker_index: layout.current_index,
            peak_marker_index: layout.peak_index,
            timeout_seconds: 10,
        }
    }
}

impl SourceConfig {
    pub fn layout(&self) -> MarkerLayout {
        MarkerLayout {
            class: self.marker_class.clone(),
            current_index: self.current_marker_index,
            peak_index: self.peak_marker_index,
        }
    }
}

/// Performance evaluation configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EvaluationConfig {
    /// Length of each comparison window; 0 disables evaluation
    pub window_minutes: u64,
    /// Minimum absolute percent change for an alert
    pub min_percent_variation: f64,
}

impl Default for EvaluationConfig {
    fn default() -> Self {
        Self {
            window_minutes: 5,
            min_percent_variation: 10.0,
        }
    }
}

/// Email notification configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct NotifyConfig {
    /// Heartbeat cadence; 0 disables heartbeats
    pub heartbeat_interval_minutes: u64,
    pub heartbeat_recipients: Recipients,
    pub alert_recipients: Recipients,
    /// Single-line `<address><SEP><password>` file
    pub credentials_file: Option<PathBuf>,
    pub credentials_separator: String,
    pub subject_prefix: String,
    pub smtp_host: String,
    pub smtp_port: u16,
}

impl Default for NotifyConfig {
    fn default() -> Self {
        Self {
            heartbeat_interval_minutes: 10,
            heartbeat_recipients: Recipients::default(),
            alert_recipients: Recipients::default(),
            credentials_file: None,
            credentials_separator: DEFAULT_SEPARATOR.to_string(),
            subject_prefix: "Listener monitor".to_string(),
            smtp_host: "smtp.gmail.com".to_string(),
            smtp_port: 587,
        }
    }
}

/// Plot configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PlotConfig {
    /// Render a plot when the session ends
    pub enabled: bool,
    /// Rolling-median window; 0 draws the raw series
    pub smooth_minutes: u64,
    pub width: u32,
    pub height: u32,
}

impl Default for PlotConfig {
    fn default() -> Self {
        let options = PlotOptions::default();
        Self {
            enabled: true,
            smooth_minutes: options.smooth_minutes.unwrap_or(0),
            width: options.width,
            height: options.height,
        }
    }
}

impl PlotConfig {
    pub fn options(&self) -> PlotOptions {
        PlotOptions {
            smooth_minutes: Some(self.smooth_minutes).filter(|m| *m > 0),
            width: self.width,
            height: self.height,
        }
    }
}

impl Config {
    /// Reject values the monitor cannot work with
    pub fn validate(&self) -> Result<(), ConfigError> {
        let tick = self.general.tick_interval_seconds;
        if !(1..=60).contains(&tick) {
            return Err(ConfigError::invalid(
                "general.tick_interval_seconds",
                format!("{} is outside 1-60", tick),
            ));
        }

        if self.source.url.trim().is_empty() {
            return Err(ConfigError::invalid("source.url", "must not be empty"));
        }

        if self.source.marker_class.trim().is_empty() {
            return Err(ConfigError::invalid("source.marker_class", "must not be empty"));
        }

        if self.source.current_marker_index == self.source.peak_marker_index {
            return Err(ConfigError::invalid(
                "source.peak_marker_index",
                "must differ from current_marker_index",
            ));
        }

        if self.source.timeout_seconds == 0 {
            return Err(ConfigError::invalid("source.timeout_seconds", "must be positive"));
        }

        let threshold = self.evaluation.min_percent_variation;
        if !threshold.is_finite() || threshold < 0.0 {
            return Err(ConfigError::invalid(
                "evaluation.min_percent_variation",
                format!("{} is not a non-negative number", threshold),
            ));
        }

        if self.notify.credentials_separator.is_empty() {
            return Err(ConfigError::invalid("notify.credentials_separator", "must not be empty"));
        }

        if self.plot.enabled && (self.plot.width < 200 || self.plot.height < 120) {
            return Err(ConfigError::invalid("plot", "image must be at least 200x120"));
        }

        Ok(())
    }

    /// Settings for the monitoring loop
    pub fn monitor_config(&self) -> MonitorConfig {
        MonitorConfig {
            log_directory: self.general.log_directory.clone(),
            tick_interval_seconds: self.general.tick_interval_seconds,
            max_downtime_minutes: self.general.max_downtime_minutes,
            heartbeat_interval_minutes: self.notify.heartbeat_interval_minutes,
            eval_window_minutes: self.evaluation.window_minutes,
            min_percent_variation: self.evaluation.min_percent_variation,
            heartbeat_recipients: self.notify.heartbeat_recipients.clone(),
            alert_recipients: self.notify.alert_recipients.clone(),
            subject_prefix: self.notify.subject_prefix.clone(),
            plot: self.plot.enabled.then(|| self.plot.options()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.general.tick_interval_seconds, 30);
        assert_eq!(config.general.max_downtime_minutes, 10);
        assert_eq!(config.notify.heartbeat_interval_minutes, 10);
        assert_eq!(config.evaluation.window_minutes, 5);
        assert_eq!(config.evaluation.min_percent_variation, 10.0);
        assert!(config.notify.heartbeat_recipients.is_empty());
        assert!(config.notify.credentials_file.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: Config = toml::from_str(
            r#"
            [general]
            tick_interval_seconds = 15

            [notify]
            alert_recipients = ["a@example.com", "b@example.com"]
            heartbeat_recipients = "me@example.com"
            "#,
        )
        .unwrap();

        assert_eq!(config.general.tick_interval_seconds, 15);
        assert_eq!(config.general.max_downtime_minutes, 10);
        assert_eq!(config.notify.alert_recipients.addresses().len(), 2);
        assert_eq!(config.notify.heartbeat_recipients.addresses(), vec!["me@example.com"]);
        assert_eq!(config.source.marker_class, "streamstats");
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = Config::default();
        config.general.tick_interval_seconds = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.general.tick_interval_seconds = 90;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.evaluation.min_percent_variation = f64::NAN;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.source.peak_marker_index = config.source.current_marker_index;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_monitor_config_mapping() {
        let mut config = Config::default();
        config.general.tick_interval_seconds = 15;
        config.general.max_downtime_minutes = 4;
        config.plot.smooth_minutes = 0;

        let monitor = config.monitor_config();
        assert_eq!(monitor.downtime_ceiling(), 16);
        assert_eq!(monitor.samples_per_minute(), 4);
        assert_eq!(monitor.plot.and_then(|p| p.smooth_minutes), None);

        config.plot.enabled = false;
        assert!(config.monitor_config().plot.is_none());
    }
}
