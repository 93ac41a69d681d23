use std::path::PathBuf;

use clap::{Args as ClapArgs, Parser, Subcommand};
use notif::{Message, Priority};
use serde_json::Value;

#[derive(Parser, Debug)]
#[command(name = "notif", author, version, about = "Send structured notifications through a Slack webhook", long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file (defaults to <config dir>/notif/config.toml)
    #[arg(short, long, global = true, env = "NOTIF_CONFIG")]
    pub config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Only log errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Send a notification
    Send {
        #[command(flatten)]
        message: MessageArgs,

        #[command(flatten)]
        delivery: DeliveryArgs,
    },

    /// Print the webhook payload for a message without sending it
    Preview {
        #[command(flatten)]
        message: MessageArgs,

        /// Footer shown under the attachment
        #[arg(long)]
        footer: Option<String>,
    },
}

#[derive(ClapArgs, Debug)]
pub struct MessageArgs {
    /// Subject line
    #[arg(short, long)]
    pub title: String,

    /// Main content body
    #[arg(short = 'm', long, default_value = "")]
    pub content: String,

    /// Link for more details
    #[arg(short, long)]
    pub uri: Option<String>,

    /// low, normal, high, urgent, or a level from 0 to 3
    #[arg(short, long, default_value = "normal")]
    pub priority: Priority,

    /// Extra field, repeatable. JSON values are kept typed, anything else is a string
    #[arg(short, long = "field", value_name = "KEY=VALUE", value_parser = parse_field)]
    pub fields: Vec<(String, Value)>,
}

impl MessageArgs {
    pub fn to_message(&self) -> Message {
        let mut message = Message::new(&self.title, &self.content).with_priority(self.priority);
        if let Some(uri) = &self.uri {
            message = message.with_uri(uri);
        }
        for (key, value) in &self.fields {
            message = message.with_extra(key, value.clone());
        }
        message
    }
}

#[derive(ClapArgs, Debug, Default)]
pub struct DeliveryArgs {
    /// Slack incoming webhook URL
    #[arg(short, long, env = "NOTIF_WEBHOOK_URL")]
    pub webhook_url: Option<String>,

    /// Per-request HTTP timeout
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Retries after the first attempt
    #[arg(short, long)]
    pub retries: Option<u32>,

    /// Delay before the first retry
    #[arg(long, value_name = "MS")]
    pub retry_delay_ms: Option<u64>,

    /// Upper bound for the retry delay
    #[arg(long, value_name = "MS")]
    pub max_retry_delay_ms: Option<u64>,

    /// Overall deadline for the send including retries, 0 for none
    #[arg(long, value_name = "SECS")]
    pub deadline: Option<u64>,

    /// Do not log individual delivery attempts
    #[arg(long)]
    pub no_logging: bool,
}

fn parse_field(s: &str) -> Result<(String, Value), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("invalid field '{s}', expected KEY=VALUE"))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("invalid field '{s}', key is empty"));
    }
    let value = serde_json::from_str(value).unwrap_or_else(|_| Value::String(value.to_string()));
    Ok((key.to_string(), value))
}
