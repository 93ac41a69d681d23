mod cli;
mod config;
mod error;

use std::process;
use std::time::Duration;

use clap::Parser;
use notif::{
    Context, LoggingNotifier, Message, Notifier, RetryNotifier, SlackNotifier, SlackPayload,
};
use tracing::{Level, debug, error, info};
use tracing_subscriber::{filter::EnvFilter, fmt, prelude::*};

use crate::{
    cli::{Args, Commands},
    config::AppConfig,
    error::{CliError, Result},
};

#[tokio::main]
async fn main() {
    let args = Args::parse();

    if let Err(e) = run(args).await {
        error!("Application error: {}", e);
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

async fn run(args: Args) -> Result<()> {
    let mut config = AppConfig::load(args.config.as_deref())?;
    init_logging(args.verbose, args.quiet, config.logging.filter.as_deref())?;

    match args.command {
        Commands::Send { message, delivery } => {
            config.apply_overrides(&delivery);
            debug!(?config, "Loaded configuration");
            send(&config, &message.to_message()).await
        }
        Commands::Preview { message, footer } => {
            let footer = footer.or_else(|| config.slack.footer.clone());
            let payload = SlackPayload::from_message(&message.to_message(), footer.as_deref());
            println!("{}", serde_json::to_string_pretty(&payload)?);
            Ok(())
        }
    }
}

async fn send(config: &AppConfig, message: &Message) -> Result<()> {
    if config.slack.webhook_url.trim().is_empty() {
        return Err(CliError::MissingWebhookUrl);
    }

    let slack = SlackNotifier::new(config.slack.clone())?;

    // Logging wraps the backend directly so its records name "Slack".
    let base: Box<dyn Notifier> = if config.logging.enabled {
        Box::new(LoggingNotifier::new(slack))
    } else {
        Box::new(slack)
    };
    let notifier = RetryNotifier::new(base, config.retry.clone());

    let ctx = if config.deadline_secs > 0 {
        Context::background().with_timeout(Duration::from_secs(config.deadline_secs))
    } else {
        Context::background()
    };

    let mut delivery = notifier.send(&ctx, message);
    let result = tokio::select! {
        result = &mut delivery => result,
        _ = tokio::signal::ctrl_c() => {
            info!("Interrupted, cancelling notification");
            ctx.cancel();
            delivery.await
        }
    };
    result?;

    println!("Notification sent successfully");
    Ok(())
}

fn init_logging(verbose: bool, quiet: bool, configured: Option<&str>) -> Result<()> {
    let filter = if quiet {
        EnvFilter::new("error")
    } else if verbose {
        EnvFilter::new("debug")
    } else if let Some(directive) = configured {
        EnvFilter::try_new(directive).map_err(|e| CliError::Logging(e.to_string()))?
    } else {
        EnvFilter::from_default_env().add_directive(Level::INFO.into())
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .try_init()
        .map_err(|e| CliError::Logging(e.to_string()))
}
