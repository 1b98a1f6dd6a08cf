//! # Queries and commands.
//!
//! Two kinds of [`Event`] travel through the bus:
//! - **Query**: read intent, answered by the *first* matching subscriber only.
//! - **Command**: write intent, delivered to every matching subscriber in
//!   registration order until one of them stops propagation.
//!
//! Concrete events are plain structs that embed a [`QueryState`] or
//! [`CommandState`] and declare a compile-time [`EventName`]:
//!
//! ```rust
//! use dibus::{event_name, AnyQuery, Event, EventName, Query, QueryState};
//!
//! #[derive(Default)]
//! struct Balance {
//!     state: QueryState,
//!     account: u64,
//! }
//!
//! impl Event for Balance {
//!     const NAME: EventName = event_name!(Balance);
//! }
//!
//! impl Query for Balance {
//!     fn query_state(&self) -> &QueryState { &self.state }
//!     fn query_state_mut(&mut self) -> &mut QueryState { &mut self.state }
//! }
//!
//! let q = Balance::default();
//! assert!(!q.is_executed());
//! assert_eq!(q.name(), Balance::NAME);
//! ```
//!
//! Subscribers receive type-erased [`AnyQuery`] / [`AnyCommand`] references and
//! recover the concrete type with `downcast_ref` / `downcast_mut`.

use std::any::Any;

use super::name::EventName;

/// A named message type.
///
/// The name is a property of the type, not of the value.
pub trait Event: Any + Send + Sync {
    /// Routing key of this type.
    const NAME: EventName;
}

/// Execution flag carried by every query.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct QueryState {
    executed: bool,
}

impl QueryState {
    /// Returns `true` once a subscriber has processed the query.
    #[inline]
    pub fn is_executed(&self) -> bool {
        self.executed
    }
}

/// Propagation flag carried by every command.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CommandState {
    stop_propagation: bool,
}

impl CommandState {
    /// Returns `true` once a subscriber has stopped propagation.
    #[inline]
    pub fn is_stop_propagation(&self) -> bool {
        self.stop_propagation
    }
}

/// Read-intent event.
pub trait Query: Event {
    fn query_state(&self) -> &QueryState;
    fn query_state_mut(&mut self) -> &mut QueryState;
}

/// Write-intent event.
pub trait Command: Event {
    fn command_state(&self) -> &CommandState;
    fn command_state_mut(&mut self) -> &mut CommandState;
}

/// Object-safe view of a [`Query`], used on the dispatch path.
///
/// Implemented for every `Q: Query`; do not implement it by hand.
pub trait AnyQuery: Send + Sync + 'static {
    /// Routing key of the concrete query type.
    fn name(&self) -> EventName;
    /// Marks the query as processed.
    fn set_executed(&mut self);
    /// Returns `true` once a subscriber has processed the query.
    fn is_executed(&self) -> bool;
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<Q: Query> AnyQuery for Q {
    fn name(&self) -> EventName {
        Q::NAME
    }

    fn set_executed(&mut self) {
        self.query_state_mut().executed = true;
    }

    fn is_executed(&self) -> bool {
        self.query_state().executed
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

impl dyn AnyQuery {
    /// Returns `true` if the erased query is a `T`.
    pub fn is<T: Query>(&self) -> bool {
        self.as_any().is::<T>()
    }

    pub fn downcast_ref<T: Query>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }

    pub fn downcast_mut<T: Query>(&mut self) -> Option<&mut T> {
        self.as_any_mut().downcast_mut::<T>()
    }
}

/// Object-safe view of a [`Command`], used on the dispatch path.
///
/// Implemented for every `C: Command`; do not implement it by hand.
pub trait AnyCommand: Send + Sync + 'static {
    /// Routing key of the concrete command type.
    fn name(&self) -> EventName;
    /// Prevents subscribers registered later from seeing this command.
    fn stop_propagation(&mut self);
    /// Returns `true` once propagation was stopped.
    fn is_stop_propagation(&self) -> bool;
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<C: Command> AnyCommand for C {
    fn name(&self) -> EventName {
        C::NAME
    }

    fn stop_propagation(&mut self) {
        self.command_state_mut().stop_propagation = true;
    }

    fn is_stop_propagation(&self) -> bool {
        self.command_state().stop_propagation
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

impl dyn AnyCommand {
    /// Returns `true` if the erased command is a `T`.
    pub fn is<T: Command>(&self) -> bool {
        self.as_any().is::<T>()
    }

    pub fn downcast_ref<T: Command>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }

    pub fn downcast_mut<T: Command>(&mut self) -> Option<&mut T> {
        self.as_any_mut().downcast_mut::<T>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event_name;

    #[derive(Default)]
    struct Ping {
        state: QueryState,
    }

    impl Event for Ping {
        const NAME: EventName = event_name!(Ping);
    }

    impl Query for Ping {
        fn query_state(&self) -> &QueryState {
            &self.state
        }
        fn query_state_mut(&mut self) -> &mut QueryState {
            &mut self.state
        }
    }

    #[derive(Default)]
    struct Reset {
        state: CommandState,
        hard: bool,
    }

    impl Event for Reset {
        const NAME: EventName = event_name!(Reset);
    }

    impl Command for Reset {
        fn command_state(&self) -> &CommandState {
            &self.state
        }
        fn command_state_mut(&mut self) -> &mut CommandState {
            &mut self.state
        }
    }

    #[test]
    fn test_query_flag_through_erased_view() {
        let mut ping = Ping::default();
        let erased: &mut dyn AnyQuery = &mut ping;
        assert_eq!(erased.name(), Ping::NAME);
        assert!(!erased.is_executed());
        erased.set_executed();
        assert!(ping.is_executed());
        assert!(ping.query_state().is_executed());
    }

    #[test]
    fn test_command_downcast_and_stop() {
        let mut reset = Reset::default();
        let erased: &mut dyn AnyCommand = &mut reset;
        assert!(erased.is::<Reset>());
        if let Some(r) = erased.downcast_mut::<Reset>() {
            r.hard = true;
        }
        erased.stop_propagation();
        assert!(reset.hard);
        assert!(reset.command_state().is_stop_propagation());
    }

    #[test]
    fn test_distinct_types_have_distinct_names() {
        assert_ne!(Ping::NAME, Reset::NAME);
        assert!(Ping::NAME.is_qualified());
        assert!(Reset::NAME.is_qualified());
    }
}
