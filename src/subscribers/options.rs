//! # Build-time subscriber options.
//!
//! [`SubscriberOptions`] is a read-only value object. The bus reads it once per
//! subscriber during `build`:
//!
//! - `order`: ascending initialization order (lower runs earlier, ties keep
//!   provider order);
//! - `stopped_signal`: a token the subscriber cancels when it has wound down;
//!   the bus waits for it during shutdown, up to the configured grace;
//! - supported events: the names routed to this subscriber.

use std::any::TypeId;

use tokio_util::sync::CancellationToken;

use crate::events::{Event, EventName};

/// Options returned by [`Subscriber::build_options`](crate::Subscriber::build_options).
#[derive(Debug, Clone, Default)]
pub struct SubscriberOptions {
    order: i64,
    stopped_signal: Option<CancellationToken>,
    supported: Vec<(EventName, TypeId)>,
}

impl SubscriberOptions {
    /// Order 0, no completion signal, no events.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the initialization order.
    pub fn with_order(mut self, order: i64) -> Self {
        self.order = order;
        self
    }

    /// Sets the token the subscriber cancels once it has stopped.
    pub fn with_stopped_signal(mut self, stopped: CancellationToken) -> Self {
        self.stopped_signal = Some(stopped);
        self
    }

    /// Routes events of type `E` to the subscriber.
    pub fn supports<E: Event>(mut self) -> Self {
        self.supported.push((E::NAME, TypeId::of::<E>()));
        self
    }

    #[inline]
    pub fn order(&self) -> i64 {
        self.order
    }

    #[inline]
    pub fn stopped_signal(&self) -> Option<&CancellationToken> {
        self.stopped_signal.as_ref()
    }

    /// Names of the supported events, in declaration order.
    pub fn supported_events(&self) -> impl Iterator<Item = EventName> + '_ {
        self.supported.iter().map(|(name, _)| *name)
    }

    pub(crate) fn into_parts(self) -> (i64, Option<CancellationToken>, Vec<(EventName, TypeId)>) {
        (self.order, self.stopped_signal, self.supported)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{BusInitialized, BusStop};

    #[test]
    fn test_builder_collects_events_in_order() {
        let opts = SubscriberOptions::new()
            .with_order(-5)
            .supports::<BusInitialized>()
            .supports::<BusStop>();

        assert_eq!(opts.order(), -5);
        assert!(opts.stopped_signal().is_none());
        let names: Vec<EventName> = opts.supported_events().collect();
        assert_eq!(names, vec![BusInitialized::NAME, BusStop::NAME]);
    }

    #[test]
    fn test_stopped_signal_is_shared() {
        let token = CancellationToken::new();
        let opts = SubscriberOptions::new().with_stopped_signal(token.clone());
        token.cancel();
        assert!(opts.stopped_signal().is_some_and(|t| t.is_cancelled()));
    }
}
