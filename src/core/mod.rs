//! Runtime core: routing, dispatch and lifecycle.
//!
//! The public API from this module is [`ApplicationBus`] plus its configuration
//! and shutdown report types.
//!
//! Internal modules:
//! - [`bus`]: build phase, query/command dispatch, run loop;
//! - [`registry`]: routing table, frozen after build;
//! - [`lifecycle`]: run gate and one-shot bounded shutdown;
//! - [`shutdown`]: cross-platform OS signal handling;
//! - [`config`]: runtime settings.

mod bus;
mod config;
mod lifecycle;
mod registry;
mod shutdown;

pub use bus::ApplicationBus;
pub use config::BusConfig;
pub use lifecycle::{BusState, ShutdownOutcome, ShutdownReport};
