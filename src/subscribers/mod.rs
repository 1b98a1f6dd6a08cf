//! # Subscribers: the handlers behind every route.
//!
//! ## Architecture
//! ```text
//! Vec<Provider> ──► build() ──► provider(ctx, bus) ──► Arc<dyn Subscriber>
//!                                                          │
//!                                    build_options() ◄─────┘ (read once)
//!                                          │
//!                     ┌────────────────────┼─────────────────────┐
//!                     ▼                    ▼                     ▼
//!              supported events      order (ascending)     stopped signal
//!              → routing table       → init dispatch       → shutdown await-list
//! ```

mod options;
mod provider;
mod subscriber;

pub use options::SubscriberOptions;
pub use provider::{provider, Provide, Provider};
pub use subscriber::Subscriber;
