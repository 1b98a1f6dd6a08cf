//! # Subscriber trait.
//!
//! Provides [`Subscriber`] the extension point for plugging query/command handlers
//! into the bus.
//!
//! ## Rules
//! - `process_query` answers a query; only the first subscriber registered for a
//!   query name is ever asked.
//! - `process_command` performs a side effect; every subscriber registered for the
//!   command name is asked in order until one calls `stop_propagation`.
//! - `build_options` is read exactly once, during `build`.
//! - Handlers run on the caller's task. There is no per-call timeout; keep them
//!   bounded and cooperate with the bus context for shutdown.
//!
//! ## Example
//! ```rust
//! use async_trait::async_trait;
//! use dibus::{
//!     answer, event_name, AnyQuery, Event, EventName, Payload, Query, QueryState,
//!     Subscriber, SubscriberOptions,
//! };
//!
//! #[derive(Default)]
//! struct Version {
//!     state: QueryState,
//! }
//!
//! impl Event for Version {
//!     const NAME: EventName = event_name!(Version);
//! }
//!
//! impl Query for Version {
//!     fn query_state(&self) -> &QueryState { &self.state }
//!     fn query_state_mut(&mut self) -> &mut QueryState { &mut self.state }
//! }
//!
//! struct Build;
//!
//! #[async_trait]
//! impl Subscriber for Build {
//!     async fn process_query(&self, query: &mut dyn AnyQuery) -> Option<Payload> {
//!         if query.is::<Version>() {
//!             return answer("1.0.0");
//!         }
//!         None
//!     }
//!
//!     fn build_options(&self) -> SubscriberOptions {
//!         SubscriberOptions::new().supports::<Version>()
//!     }
//!
//!     fn name(&self) -> &'static str { "build-info" }
//! }
//! ```

use async_trait::async_trait;

use crate::events::{AnyCommand, AnyQuery, Payload};

use super::options::SubscriberOptions;

/// Query/command handler registered on the bus.
///
/// ### Implementation requirements
/// - Use interior mutability for state; handlers take `&self`.
/// - Return `None` from `process_query` only when there is genuinely no answer.
/// - Keep `build_options` side-effect free.
#[async_trait]
pub trait Subscriber: Send + Sync + 'static {
    /// Answers a query routed to this subscriber.
    ///
    /// Default: no answer.
    async fn process_query(&self, _query: &mut dyn AnyQuery) -> Option<Payload> {
        None
    }

    /// Handles a command routed to this subscriber.
    ///
    /// Default: ignore.
    async fn process_command(&self, _command: &mut dyn AnyCommand) {}

    /// Declares order, completion signal and supported events.
    fn build_options(&self) -> SubscriberOptions;

    /// Returns the subscriber name used in logs and shutdown reports.
    ///
    /// The default uses `type_name::<Self>()`, which can be verbose - override it when possible.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}
