//! # dibus
//!
//! **dibus** is an in-process message bus that routes read-only **queries** and
//! side-effecting **commands** from callers to registered **subscribers**, and
//! coordinates the subscribers' initialization order and graceful shutdown.
//!
//! It is not a broker: no network transport, no persistence, no replay.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!     ┌──────────────┐   ┌──────────────┐   ┌──────────────┐
//!     │  Provider #1 │   │  Provider #2 │   │  Provider #3 │
//!     │ (ctx, bus)   │   │ (ctx, bus)   │   │ (ctx, bus)   │
//!     └──────┬───────┘   └──────┬───────┘   └──────┬───────┘
//!            ▼                  ▼                  ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  ApplicationBus::build                                            │
//! │  - self-handler for BusStop                                       │
//! │  - build_options() read once per subscriber                       │
//! │  - stable sort by order, register supported events                │
//! │  - freeze routing table, dispatch BusInitialized (ascending)      │
//! └─────────────────────────────────┬─────────────────────────────────┘
//!                                   ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  Routing table (read-only): EventName ──► [Subscriber, ...]       │
//! └──────┬──────────────────────────┬─────────────────────────┬───────┘
//!        ▼                          ▼                         ▼
//!   exec_query                 exec_command             exec_multi_query
//!   first match wins           in order, until          one task per query,
//!   marks executed             stop_propagation         results in input order
//! ```
//!
//! ### Lifecycle
//! ```text
//! run() ──► Running
//!   ├─ OS signal (SIGINT/SIGTERM/SIGQUIT/Ctrl-C) ──┐
//!   ├─ BusStop command (self-handler) ─────────────┼──► shutdown (exactly once)
//!   └─ parent context cancelled ───────────────────┘        │
//!                                                           ├─► ctx.cancel()
//!                                                           ├─► wait stopped signals ≤ grace
//!                                                           └─► run() returns ShutdownReport
//! ```
//!
//! ## Features
//! | Area              | Description                                                  | Key types / traits                          |
//! |-------------------|--------------------------------------------------------------|---------------------------------------------|
//! | **Events**        | Compile-time event identity, query/command contracts.        | [`Event`], [`Query`], [`Command`]           |
//! | **Subscribers**   | Handlers with build-time order, events and stopped signal.   | [`Subscriber`], [`SubscriberOptions`]       |
//! | **Dispatch**      | Single, typed and batched queries; ordered commands.         | [`ApplicationBus`], [`QueryResult`]         |
//! | **Lifecycle**     | Run until a trigger, bounded graceful shutdown.              | [`BusState`], [`ShutdownReport`]            |
//! | **Errors**        | Typed errors for extraction, build and run.                  | [`QueryError`], [`BuildError`], [`RuntimeError`] |
//! | **Configuration** | Centralize runtime settings.                                 | [`BusConfig`]                               |
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use std::sync::atomic::{AtomicI64, Ordering};
//! use std::time::Duration;
//!
//! use async_trait::async_trait;
//! use dibus::{
//!     answer, event_name, provider, AnyCommand, AnyQuery, ApplicationBus, BusConfig,
//!     Command, CommandState, Event, EventName, Payload, Query, QueryState, Subscriber,
//!     SubscriberOptions,
//! };
//!
//! #[derive(Default)]
//! struct GetCounter { state: QueryState }
//! impl Event for GetCounter { const NAME: EventName = event_name!(GetCounter); }
//! impl Query for GetCounter {
//!     fn query_state(&self) -> &QueryState { &self.state }
//!     fn query_state_mut(&mut self) -> &mut QueryState { &mut self.state }
//! }
//!
//! #[derive(Default)]
//! struct Add { state: CommandState, by: i64 }
//! impl Event for Add { const NAME: EventName = event_name!(Add); }
//! impl Command for Add {
//!     fn command_state(&self) -> &CommandState { &self.state }
//!     fn command_state_mut(&mut self) -> &mut CommandState { &mut self.state }
//! }
//!
//! struct Counter(AtomicI64);
//!
//! #[async_trait]
//! impl Subscriber for Counter {
//!     async fn process_query(&self, _q: &mut dyn AnyQuery) -> Option<Payload> {
//!         answer(self.0.load(Ordering::SeqCst))
//!     }
//!     async fn process_command(&self, c: &mut dyn AnyCommand) {
//!         if let Some(add) = c.downcast_ref::<Add>() {
//!             self.0.fetch_add(add.by, Ordering::SeqCst);
//!         }
//!     }
//!     fn build_options(&self) -> SubscriberOptions {
//!         SubscriberOptions::new().supports::<GetCounter>().supports::<Add>()
//!     }
//! }
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let bus = ApplicationBus::new(BusConfig::with_grace(Duration::from_secs(5)));
//!     bus.build(vec![provider(|_ctx, _bus| Arc::new(Counter(AtomicI64::new(0))))]).await?;
//!
//!     bus.exec_command(&mut Add { by: 2, ..Default::default() }).await;
//!     let value = bus.exec_query_as::<i64, _>(&mut GetCounter::default()).await?;
//!     assert_eq!(value, 2);
//!
//!     // The stop command drives the same shutdown as an OS signal.
//!     bus.stop().await;
//!     let report = bus.run().await?;
//!     assert!(report.is_clean());
//!     Ok(())
//! }
//! ```
mod core;
mod error;
mod events;
mod subscribers;

// ---- Public re-exports ----

pub use crate::core::{ApplicationBus, BusConfig, BusState, ShutdownOutcome, ShutdownReport};
pub use error::{BuildError, QueryError, RuntimeError};
pub use events::{
    answer, AnyCommand, AnyQuery, BusInitialized, BusStop, Command, CommandState, Event,
    EventName, Payload, Query, QueryResult, QueryState,
};
pub use subscribers::{provider, Provide, Provider, Subscriber, SubscriberOptions};
