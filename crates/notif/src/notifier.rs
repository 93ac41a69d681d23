//! The notifier capability shared by backends and decorators.

use std::sync::Arc;

use async_trait::async_trait;

use crate::Result;
use crate::context::Context;
use crate::message::Message;

/// Anything that can deliver a [`Message`].
///
/// Backends perform the delivery, decorators wrap exactly one other notifier
/// and add behavior around it. `name` returns the implementor's own identity,
/// never a walk of the chain: a decorator that logs the name of what it wraps
/// should therefore sit directly on top of the backend.
///
/// Implementations must honor `ctx`: once it is cancelled or its deadline
/// passes, `send` returns [`crate::Error::Cancelled`] or
/// [`crate::Error::DeadlineExceeded`] promptly.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Deliver one message.
    async fn send(&self, ctx: &Context, msg: &Message) -> Result<()>;

    /// Short identifier used in logs. Must not perform I/O.
    fn name(&self) -> &str;
}

#[async_trait]
impl<N: Notifier + ?Sized> Notifier for Box<N> {
    async fn send(&self, ctx: &Context, msg: &Message) -> Result<()> {
        (**self).send(ctx, msg).await
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

#[async_trait]
impl<N: Notifier + ?Sized> Notifier for Arc<N> {
    async fn send(&self, ctx: &Context, msg: &Message) -> Result<()> {
        (**self).send(ctx, msg).await
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

#[async_trait]
impl<N: Notifier + ?Sized> Notifier for &N {
    async fn send(&self, ctx: &Context, msg: &Message) -> Result<()> {
        (**self).send(ctx, msg).await
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}
