//! notif: pluggable notification delivery.
//!
//! This crate provides a uniform [`Notifier`] capability for sending
//! structured messages, one webhook backend, and decorators that add
//! cross-cutting behavior by wrapping another notifier.
//!
//! ## Core Types
//!
//! - [`Message`] - Normalized notification payload
//! - [`Priority`] - Urgency level, mapped to backend presentation
//! - [`Notifier`] - Trait implemented by backends and decorators
//! - [`Context`] - Call-scoped cancellation and deadline
//!
//! ## Backends
//!
//! - [`SlackNotifier`] - Slack incoming webhook
//!
//! ## Decorators
//!
//! - [`LoggingNotifier`] - Logs each send with outcome and duration
//! - [`RetryNotifier`] - Retries failed sends with exponential backoff
//!
//! # Example
//!
//! ```ignore
//! use notif::{Context, LoggingNotifier, Message, Notifier, Priority, RetryConfig,
//!             RetryNotifier, SlackConfig, SlackNotifier};
//!
//! let slack = SlackNotifier::new(SlackConfig::new("https://hooks.slack.com/services/..."))?;
//! let notifier = RetryNotifier::new(LoggingNotifier::new(slack), RetryConfig::default());
//!
//! let msg = Message::new("Critical Alert", "Production server is down")
//!     .with_priority(Priority::Urgent)
//!     .with_extra("Server", "prod-api-01");
//!
//! let ctx = Context::background().with_timeout(std::time::Duration::from_secs(30));
//! notifier.send(&ctx, &msg).await?;
//! ```

pub mod context;
pub mod decorator;
pub mod error;
pub mod http_client;
pub mod message;
pub mod notifier;
pub mod slack;

pub use context::Context;
pub use decorator::{Backoff, LoggingNotifier, RetryConfig, RetryNotifier};
pub use error::{Error, Result, TransportKind};
pub use message::{Message, ParsePriorityError, Priority};
pub use notifier::Notifier;
pub use slack::{SlackConfig, SlackNotifier, SlackPayload};
