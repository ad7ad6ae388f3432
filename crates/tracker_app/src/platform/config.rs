use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use log::LevelFilter;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracker_core::{TrackerSettings, DEFAULT_PAGE_SIZE};
use tracker_engine::{RunSettings, DEFAULT_BASE_URL};

use super::logging::{LogDestination, DEFAULT_LOG_FILE};

pub const DEFAULT_CONFIG_FILENAME: &str = "tracker.ron";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io { path: String, source: io::Error },
    #[error("failed to parse config {path}: {message}")]
    Parse { path: String, message: String },
}

/// Settings read from `tracker.ron`. Every field is optional in the file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    pub api_url: String,
    pub page_size: usize,
    pub notice_seconds: u64,
    pub connect_timeout_secs: u64,
    pub read_timeout_secs: Option<u64>,
    pub log_level: String,
    pub log_destination: LogDestination,
    pub log_file: PathBuf,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_BASE_URL.to_string(),
            page_size: DEFAULT_PAGE_SIZE,
            notice_seconds: 6,
            connect_timeout_secs: 10,
            read_timeout_secs: None,
            log_level: "info".to_string(),
            log_destination: LogDestination::File,
            log_file: PathBuf::from(DEFAULT_LOG_FILE),
        }
    }
}

impl TrackerConfig {
    pub fn level(&self) -> LevelFilter {
        tracker_logging::parse_level(&self.log_level).unwrap_or(LevelFilter::Info)
    }

    pub fn tracker_settings(&self) -> TrackerSettings {
        TrackerSettings {
            page_size: self.page_size.max(1),
            notice_delay: Duration::from_secs(self.notice_seconds),
        }
    }

    pub fn run_settings(&self) -> RunSettings {
        RunSettings {
            base_url: self.api_url.clone(),
            connect_timeout: Duration::from_secs(self.connect_timeout_secs),
            read_timeout: self.read_timeout_secs.map(Duration::from_secs),
        }
    }
}

/// Loads the config at `path`; a missing file yields the defaults.
pub fn load_config(path: &Path) -> Result<TrackerConfig, ConfigError> {
    let content = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            return Ok(TrackerConfig::default());
        }
        Err(source) => {
            return Err(ConfigError::Io {
                path: path.display().to_string(),
                source,
            });
        }
    };

    ron::from_str(&content).map_err(|err| ConfigError::Parse {
        path: path.display().to_string(),
        message: err.to_string(),
    })
}
