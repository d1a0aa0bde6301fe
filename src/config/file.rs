//! Configuration file discovery
//!
//! A listenwatch config is a TOML file with `[general]`, `[source]`,
//! `[evaluation]`, `[notify]` and `[plot]` sections, each optional.

use crate::config::Config;
use crate::error::ConfigError;

use std::path::{Path, PathBuf};

/// Locates and parses listenwatch config files
pub struct ConfigFile;

impl ConfigFile {
    /// Parse one config file; missing sections keep their defaults
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path)
            .map_err(|_| ConfigError::FileNotFound(path.display().to_string()))?;

        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// First default location that holds a parseable config
    ///
    /// Files that exist but fail to parse are logged and skipped.
    pub fn load_default() -> Option<Config> {
        Self::default_paths()
            .into_iter()
            .filter(|path| path.is_file())
            .find_map(|path| match Self::load(&path) {
                Ok(config) => {
                    log::info!("Loaded config from {}", path.display());
                    Some(config)
                }
                Err(e) => {
                    log::warn!("Ignoring {}: {}", path.display(), e);
                    None
                }
            })
    }

    /// Search order: system, user, then the working directory
    pub fn default_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from("/etc/listenwatch/config.toml")];
        paths.extend(dirs::config_dir().map(|dir| dir.join("listenwatch").join("config.toml")));
        paths.extend(["listenwatch.toml", ".listenwatch.toml"].map(PathBuf::from));
        paths
    }
}
