//! Events: identity, query/command contracts and results.
//!
//! ## Contents
//! - [`EventName`], [`event_name!`](crate::event_name) compile-time routing keys
//! - [`Event`], [`Query`], [`Command`] typed contracts for concrete events
//! - [`AnyQuery`], [`AnyCommand`] object-safe views used by the dispatcher
//! - [`QueryResult`], [`Payload`] answers produced by query handlers
//! - [`BusStop`], [`BusInitialized`] internal well-known commands

mod builtin;
mod event;
mod name;
mod result;

pub use builtin::{BusInitialized, BusStop};
pub use event::{AnyCommand, AnyQuery, Command, CommandState, Event, Query, QueryState};
pub use name::EventName;
pub use result::{answer, Payload, QueryResult};
