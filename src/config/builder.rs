//! Configuration builder
//!
//! Merges configuration from files and CLI arguments.

use crate::config::{Config, ConfigFile};
use crate::error::ConfigError;

use std::path::PathBuf;

/// Builder for merging configuration sources
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Create a new builder with default configuration
    pub fn new() -> Self {
        Self {
            config: Config::default(),
        }
    }

    /// Load configuration from a file
    ///
    /// An explicit path must load; without one the default locations are
    /// tried and defaults are kept when none exists.
    pub fn with_file(mut self, path: Option<&str>) -> Result<Self, ConfigError> {
        let file_config = match path {
            Some(path) => Some(ConfigFile::load(path)?),
            None => ConfigFile::load_default(),
        };

        if let Some(cfg) = file_config {
            self.config = cfg;
        }

        Ok(self)
    }

    /// Override with CLI status page URL
    pub fn with_url(mut self, url: Option<String>) -> Self {
        if let Some(u) = url {
            self.config.source.url = u;
        }
        self
    }

    /// Override with CLI log directory
    pub fn with_log_directory(mut self, dir: Option<PathBuf>) -> Self {
        if let Some(d) = dir {
            self.config.general.log_directory = d;
        }
        self
    }

    /// Override with CLI tick interval
    pub fn with_interval(mut self, interval: Option<u64>) -> Self {
        if let Some(i) = interval {
            self.config.general.tick_interval_seconds = i;
        }
        self
    }

    /// Override with CLI downtime budget
    pub fn with_max_downtime(mut self, minutes: Option<u64>) -> Self {
        if let Some(m) = minutes {
            self.config.general.max_downtime_minutes = m;
        }
        self
    }

    /// Override with CLI heartbeat cadence
    pub fn with_heartbeat_interval(mut self, minutes: Option<u64>) -> Self {
        if let Some(m) = minutes {
            self.config.notify.heartbeat_interval_minutes = m;
        }
        self
    }

    /// Override with CLI evaluation window
    pub fn with_eval_window(mut self, minutes: Option<u64>) -> Self {
        if let Some(m) = minutes {
            self.config.evaluation.window_minutes = m;
        }
        self
    }

    /// Override with CLI alert threshold
    pub fn with_min_variation(mut self, percent: Option<f64>) -> Self {
        if let Some(p) = percent {
            self.config.evaluation.min_percent_variation = p;
        }
        self
    }

    /// Override with CLI credentials file
    pub fn with_credentials_file(mut self, path: Option<PathBuf>) -> Self {
        if let Some(p) = path {
            self.config.notify.credentials_file = Some(p);
        }
        self
    }

    /// Override with CLI heartbeat recipients
    pub fn with_heartbeat_recipients(mut self, recipients: Vec<String>) -> Self {
        if !recipients.is_empty() {
            self.config.notify.heartbeat_recipients = recipients.into();
        }
        self
    }

    /// Override with CLI alert recipients
    pub fn with_alert_recipients(mut self, recipients: Vec<String>) -> Self {
        if !recipients.is_empty() {
            self.config.notify.alert_recipients = recipients.into();
        }
        self
    }

    /// Disable the end-of-session plot
    pub fn with_no_plot(mut self, no_plot: bool) -> Self {
        if no_plot {
            self.config.plot.enabled = false;
        }
        self
    }

    /// Validate and return the final configuration
    pub fn build(self) -> Result<Config, ConfigError> {
        self.config.validate()?;
        Ok(self.config)
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults() {
        let config = ConfigBuilder::new().build().unwrap();
        assert_eq!(config.general.tick_interval_seconds, 30);
        assert!(config.plot.enabled);
    }

    #[test]
    fn test_builder_overrides() {
        let config = ConfigBuilder::new()
            .with_url(Some("http://example.org/".to_string()))
            .with_interval(Some(15))
            .with_max_downtime(Some(4))
            .with_heartbeat_interval(Some(5))
            .with_eval_window(Some(5))
            .with_min_variation(Some(20.0))
            .with_alert_recipients(vec!["a@example.com".to_string()])
            .with_heartbeat_recipients(vec![])
            .with_no_plot(true)
            .build()
            .unwrap();

        assert_eq!(config.source.url, "http://example.org/");
        assert_eq!(config.general.tick_interval_seconds, 15);
        assert_eq!(config.general.max_downtime_minutes, 4);
        assert_eq!(config.notify.heartbeat_interval_minutes, 5);
        assert_eq!(config.evaluation.min_percent_variation, 20.0);
        assert_eq!(config.notify.alert_recipients.addresses(), vec!["a@example.com"]);
        assert!(config.notify.heartbeat_recipients.is_empty());
        assert!(!config.plot.enabled);
    }

    #[test]
    fn test_builder_validates() {
        let result = ConfigBuilder::new().with_interval(Some(0)).build();
        assert!(matches!(result, Err(ConfigError::InvalidValue { .. })));
    }

    #[test]
    fn test_explicit_missing_file_fails() {
        let result = ConfigBuilder::new().with_file(Some("/nonexistent/listenwatch.toml"));
        assert!(matches!(result, Err(ConfigError::FileNotFound(_))));
    }
}
