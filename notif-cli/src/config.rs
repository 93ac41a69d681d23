//! CLI configuration.
//!
//! Loaded from TOML, then overridden by command line flags:
//!
//! ```toml
//! deadline_secs = 30
//!
//! [slack]
//! webhook_url = "https://hooks.slack.com/services/..."
//! timeout_ms = 10000
//!
//! [retry]
//! max_retries = 3
//! initial_retry_delay_ms = 1000
//! max_retry_delay_ms = 10000
//!
//! [logging]
//! enabled = true
//! filter = "info"
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use notif::{RetryConfig, SlackConfig};
use serde::{Deserialize, Serialize};

use crate::cli::DeliveryArgs;
use crate::error::{CliError, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Deadline for one send including every retry, 0 disables it.
    pub deadline_secs: u64,
    pub slack: SlackConfig,
    pub retry: RetryConfig,
    pub logging: LoggingConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            deadline_secs: 30,
            slack: SlackConfig::default(),
            retry: RetryConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Wrap the backend in the logging decorator.
    pub enabled: bool,
    /// `EnvFilter` directive used when neither `--verbose` nor `--quiet` is set.
    pub filter: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            filter: None,
        }
    }
}

impl AppConfig {
    /// Load `path`, or the default location when it exists, or defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => match Self::default_path() {
                Some(path) if path.is_file() => Self::from_file(&path),
                _ => Ok(Self::default()),
            },
        }
    }

    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("notif").join("config.toml"))
    }

    fn from_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|source| CliError::ReadConfig {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&text).map_err(|source| CliError::ParseConfig {
            path: path.to_path_buf(),
            source,
        })
    }

    fn parse(text: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    /// Apply command line flags on top of the file values.
    pub fn apply_overrides(&mut self, delivery: &DeliveryArgs) {
        if let Some(url) = &delivery.webhook_url {
            self.slack.webhook_url = url.clone();
        }
        if let Some(secs) = delivery.timeout {
            self.slack.timeout_ms = secs.saturating_mul(1000);
        }
        if let Some(retries) = delivery.retries {
            self.retry.max_retries = retries;
        }
        if let Some(ms) = delivery.retry_delay_ms {
            self.retry.initial_retry_delay_ms = ms;
        }
        if let Some(ms) = delivery.max_retry_delay_ms {
            self.retry.max_retry_delay_ms = ms;
        }
        if let Some(secs) = delivery.deadline {
            self.deadline_secs = secs;
        }
        if delivery.no_logging {
            self.logging.enabled = false;
        }
    }
}
