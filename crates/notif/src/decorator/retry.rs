//! Retry decorator with bounded exponential backoff.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::time::sleep;
use tracing::debug;

use crate::context::Context;
use crate::message::Message;
use crate::notifier::Notifier;
use crate::{Error, Result};

pub const RETRY_NAME: &str = "Retry";

/// Retry settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Retries after the first attempt; 0 means a single attempt.
    pub max_retries: u32,
    /// Delay before the first retry in milliseconds.
    pub initial_retry_delay_ms: u64,
    /// Upper bound for any delay in milliseconds.
    pub max_retry_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_retry_delay_ms: 1000,
            max_retry_delay_ms: 10_000,
        }
    }
}

impl RetryConfig {
    pub fn new(max_retries: u32, initial_delay: Duration, max_delay: Duration) -> Self {
        Self {
            max_retries,
            initial_retry_delay_ms: millis(initial_delay),
            max_retry_delay_ms: millis(max_delay),
        }
    }

    pub fn initial_retry_delay(&self) -> Duration {
        Duration::from_millis(self.initial_retry_delay_ms)
    }

    pub fn max_retry_delay(&self) -> Duration {
        Duration::from_millis(self.max_retry_delay_ms)
    }

    /// The delays slept before retries 1, 2, 3, ...
    pub fn backoff(&self) -> Backoff {
        Backoff::new(self.initial_retry_delay(), self.max_retry_delay())
    }
}

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

/// Exponential backoff sequence: `initial`, doubling, capped at `max`.
///
/// An `initial` above `max` is clamped, so the first delay is already `max`.
/// The iterator never ends.
#[derive(Debug, Clone)]
pub struct Backoff {
    next: Duration,
    max: Duration,
}

impl Backoff {
    pub fn new(initial: Duration, max: Duration) -> Self {
        Self {
            next: initial.min(max),
            max,
        }
    }
}

impl Iterator for Backoff {
    type Item = Duration;

    fn next(&mut self) -> Option<Duration> {
        let current = self.next;
        self.next = current.saturating_mul(2).min(self.max);
        Some(current)
    }
}

/// Re-sends through the wrapped notifier until it succeeds or the retries
/// run out.
///
/// Attempt 0 runs immediately. After a failed attempt `n < max_retries` the
/// decorator sleeps for the next [`Backoff`] delay and tries again. The sleep
/// races the context: cancellation returns the cancellation error without
/// another attempt. Once every attempt has failed the last error is wrapped
/// in [`Error::RetriesExhausted`].
///
/// Every non-cancellation error is retried the same way, whatever its kind.
/// Holds no per-call state, so concurrent sends are independent.
#[derive(Debug)]
pub struct RetryNotifier<N> {
    inner: N,
    config: RetryConfig,
}

impl<N: Notifier> RetryNotifier<N> {
    pub fn new(inner: N, config: RetryConfig) -> Self {
        Self { inner, config }
    }

    pub fn inner(&self) -> &N {
        &self.inner
    }

    pub fn config(&self) -> &RetryConfig {
        &self.config
    }
}

#[async_trait]
impl<N: Notifier> Notifier for RetryNotifier<N> {
    async fn send(&self, ctx: &Context, msg: &Message) -> Result<()> {
        let max_retries = self.config.max_retries;
        let mut delays = self.config.backoff();
        let mut attempt: u32 = 0;

        loop {
            let err = match self.inner.send(ctx, msg).await {
                Ok(()) => {
                    if attempt > 0 {
                        debug!(notifier = %self.inner.name(), attempt, "Notification delivered after retry");
                    }
                    return Ok(());
                }
                Err(err) => err,
            };

            if err.is_cancellation() {
                return Err(err);
            }
            if let Some(cancelled) = ctx.err() {
                return Err(cancelled);
            }
            if attempt >= max_retries {
                return Err(Error::RetriesExhausted {
                    retries: max_retries,
                    source: Box::new(err),
                });
            }

            let delay = delays.next().unwrap_or_else(|| self.config.max_retry_delay());
            debug!(
                notifier = %self.inner.name(),
                attempt,
                max_retries,
                ?delay,
                error = %err,
                "Notification attempt failed, retrying"
            );

            tokio::select! {
                biased;
                cancelled = ctx.done() => return Err(cancelled),
                _ = sleep(delay) => {}
            }
            attempt += 1;
        }
    }

    fn name(&self) -> &str {
        RETRY_NAME
    }
}
