//! # Subscriber providers.
//!
//! A provider is a one-shot factory `(context, bus) -> subscriber`. `build`
//! invokes every provider once, in input order. The context is the bus's
//! cancellation token: it is cancelled when shutdown starts.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::core::ApplicationBus;

use super::subscriber::Subscriber;

/// One-shot subscriber factory.
pub trait Provide {
    /// Constructs the subscriber.
    fn provide(self: Box<Self>, ctx: CancellationToken, bus: ApplicationBus) -> Arc<dyn Subscriber>;
}

impl<F, S> Provide for F
where
    F: FnOnce(CancellationToken, ApplicationBus) -> Arc<S>,
    S: Subscriber,
{
    fn provide(self: Box<Self>, ctx: CancellationToken, bus: ApplicationBus) -> Arc<dyn Subscriber> {
        (*self)(ctx, bus)
    }
}

/// Boxed provider accepted by `ApplicationBus::build`.
pub type Provider = Box<dyn Provide + Send>;

/// Boxes a factory closure into a [`Provider`].
///
/// ```rust
/// use std::sync::Arc;
/// use dibus::{provider, Provider, Subscriber, SubscriberOptions};
///
/// struct Noop;
///
/// impl Subscriber for Noop {
///     fn build_options(&self) -> SubscriberOptions { SubscriberOptions::new() }
/// }
///
/// let providers: Vec<Provider> = vec![provider(|_ctx, _bus| Arc::new(Noop))];
/// assert_eq!(providers.len(), 1);
/// ```
pub fn provider<F, S>(factory: F) -> Provider
where
    F: FnOnce(CancellationToken, ApplicationBus) -> Arc<S> + Send + 'static,
    S: Subscriber,
{
    Box::new(factory)
}
