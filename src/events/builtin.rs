//! # Well-known internal commands.
//!
//! - [`BusStop`]: routed to the bus's own handler; starts graceful shutdown.
//! - [`BusInitialized`]: dispatched once at the end of `build`, after the routing
//!   table is frozen. Subscribers are visited in ascending `order`, so a handler
//!   may resolve peers with ordinary queries.

use crate::event_name;

use super::event::{Command, CommandState, Event};
use super::name::EventName;

/// Asks the bus to shut down.
#[derive(Debug, Default)]
pub struct BusStop {
    state: CommandState,
}

impl Event for BusStop {
    const NAME: EventName = event_name!(BusStop);
}

impl Command for BusStop {
    fn command_state(&self) -> &CommandState {
        &self.state
    }

    fn command_state_mut(&mut self) -> &mut CommandState {
        &mut self.state
    }
}

/// Announces that every subscriber is constructed and routable.
#[derive(Debug, Default)]
pub struct BusInitialized {
    state: CommandState,
}

impl Event for BusInitialized {
    const NAME: EventName = event_name!(BusInitialized);
}

impl Command for BusInitialized {
    fn command_state(&self) -> &CommandState {
        &self.state
    }

    fn command_state_mut(&mut self) -> &mut CommandState {
        &mut self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_names_follow_convention() {
        for name in [BusStop::NAME, BusInitialized::NAME] {
            assert!(name.is_qualified(), "{name} is not qualified");
            assert_eq!(name.namespace(), "dibus::events::builtin");
        }
        assert_ne!(BusStop::NAME, BusInitialized::NAME);
    }
}
