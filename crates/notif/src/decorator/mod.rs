//! Decorators that add behavior around any [`crate::Notifier`].
//!
//! Each decorator wraps exactly one notifier and is itself a notifier, so
//! they stack:
//!
//! ```ignore
//! let slack = SlackNotifier::new(SlackConfig::new(url))?;
//! // Logging sits directly on the backend so it logs "Slack", not "Retry".
//! let notifier = RetryNotifier::new(LoggingNotifier::new(slack), RetryConfig::default());
//! notifier.send(&Context::background(), &msg).await?;
//! ```

mod logging;
mod retry;

pub use logging::{LOGGING_NAME, LoggingNotifier};
pub use retry::{Backoff, RETRY_NAME, RetryConfig, RetryNotifier};
