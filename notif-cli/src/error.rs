use std::io;
use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, CliError>;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("failed to read config file {}: {source}", .path.display())]
    ReadConfig {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse config file {}: {source}", .path.display())]
    ParseConfig {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error(
        "missing webhook URL: pass --webhook-url, set NOTIF_WEBHOOK_URL or add webhook_url under [slack] in the config file"
    )]
    MissingWebhookUrl,

    #[error(transparent)]
    Notify(#[from] notif::Error),

    #[error("failed to render payload: {0}")]
    Render(#[from] serde_json::Error),

    #[error("failed to initialize logging: {0}")]
    Logging(String),
}
