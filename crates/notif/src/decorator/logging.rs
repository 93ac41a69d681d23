//! Logging decorator.

use std::time::Instant;

use async_trait::async_trait;
use tracing::{Dispatch, info, warn};

use crate::Result;
use crate::context::Context;
use crate::message::Message;
use crate::notifier::Notifier;

pub const LOGGING_NAME: &str = "Logging";

/// Logs every send of the wrapped notifier with its outcome and duration.
///
/// The wrapped notifier's `name()` is what gets logged, so this decorator
/// belongs directly on top of the backend. The result of the wrapped call is
/// returned untouched.
///
/// Records go to the injected [`Dispatch`] when one is given, otherwise to
/// whatever `tracing` dispatcher is current for the calling task (usually the
/// global subscriber installed by the application).
#[derive(Debug)]
pub struct LoggingNotifier<N> {
    inner: N,
    dispatch: Option<Dispatch>,
}

impl<N: Notifier> LoggingNotifier<N> {
    pub fn new(inner: N) -> Self {
        Self {
            inner,
            dispatch: None,
        }
    }

    /// Log to `dispatch` instead of the current dispatcher.
    pub fn with_dispatch(inner: N, dispatch: Dispatch) -> Self {
        Self {
            inner,
            dispatch: Some(dispatch),
        }
    }

    pub fn inner(&self) -> &N {
        &self.inner
    }

    pub fn into_inner(self) -> N {
        self.inner
    }

    fn emit(&self, record: impl FnOnce()) {
        match &self.dispatch {
            Some(dispatch) => tracing::dispatcher::with_default(dispatch, record),
            None => record(),
        }
    }
}

#[async_trait]
impl<N: Notifier> Notifier for LoggingNotifier<N> {
    async fn send(&self, ctx: &Context, msg: &Message) -> Result<()> {
        let notifier = self.inner.name();
        self.emit(|| {
            info!(
                notifier = %notifier,
                title = %msg.title,
                priority = %msg.priority,
                "Sending notification"
            )
        });

        let start = Instant::now();
        let result = self.inner.send(ctx, msg).await;
        let elapsed = start.elapsed();

        match &result {
            Ok(()) => self.emit(|| {
                info!(
                    notifier = %notifier,
                    ?elapsed,
                    "Notification sent successfully"
                )
            }),
            Err(e) => self.emit(|| {
                warn!(
                    notifier = %notifier,
                    ?elapsed,
                    error = %e,
                    "Notification failed"
                )
            }),
        }

        result
    }

    fn name(&self) -> &str {
        LOGGING_NAME
    }
}
