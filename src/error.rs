//! Error types used by the bus.
//!
//! - [`QueryError`]: typed extraction of a query answer failed.
//! - [`BuildError`]: the subscriber set could not be turned into a routing table.
//! - [`RuntimeError`]: the run loop could not be entered (or `build_and_run` failed to build).
//!
//! Each enum provides `as_label` for logs/metrics. Grace exceeded during shutdown
//! is not an error; see [`ShutdownOutcome`](crate::ShutdownOutcome).

use thiserror::Error;

use crate::events::EventName;

/// # Errors produced by typed query extraction.
///
/// Routing itself never fails: an unmatched query is reported here only when the
/// caller asks for a typed answer.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueryError {
    /// No subscriber is registered for the query.
    #[error("no subscriber registered for query {event}")]
    NoHandler {
        /// Query name.
        event: EventName,
    },

    /// A subscriber processed the query but produced no answer.
    #[error("subscriber produced no result for query {event}")]
    NoResult {
        /// Query name.
        event: EventName,
    },

    /// A subscriber answered with a payload of another type.
    #[error("result of query {event} is not a {expected}")]
    TypeMismatch {
        /// Query name.
        event: EventName,
        /// Type the caller asked for.
        expected: &'static str,
    },
}

impl QueryError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use dibus::{EventName, QueryError};
    ///
    /// let err = QueryError::NoHandler { event: EventName::new("app::Balance") };
    /// assert_eq!(err.as_label(), "query_no_handler");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            QueryError::NoHandler { .. } => "query_no_handler",
            QueryError::NoResult { .. } => "query_no_result",
            QueryError::TypeMismatch { .. } => "query_type_mismatch",
        }
    }

    /// Returns the name of the query that failed.
    pub fn event(&self) -> EventName {
        match self {
            QueryError::NoHandler { event }
            | QueryError::NoResult { event }
            | QueryError::TypeMismatch { event, .. } => *event,
        }
    }
}

/// # Errors produced by `ApplicationBus::build`.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BuildError {
    /// `build` was already called on this bus.
    #[error("bus is already built")]
    AlreadyBuilt,

    /// Two distinct event types declared the same name.
    #[error("event name {event} is declared by two distinct types (subscriber {subscriber})")]
    NameCollision {
        /// Colliding name.
        event: EventName,
        /// Subscriber whose declaration collided.
        subscriber: &'static str,
    },
}

impl BuildError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            BuildError::AlreadyBuilt => "build_already_built",
            BuildError::NameCollision { .. } => "build_name_collision",
        }
    }
}

/// # Errors produced by the run loop.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RuntimeError {
    /// Another `run` call is already waiting for termination.
    #[error("bus is already running")]
    AlreadyRunning,

    /// `build_and_run` failed while building.
    #[error("build failed: {0}")]
    Build(#[from] BuildError),
}

impl RuntimeError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            RuntimeError::AlreadyRunning => "runtime_already_running",
            RuntimeError::Build(_) => "runtime_build_failed",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_error_messages() {
        let event = EventName::new("app::Balance");
        let err = QueryError::TypeMismatch {
            event,
            expected: "i32",
        };
        assert_eq!(err.to_string(), "result of query app::Balance is not a i32");
        assert_eq!(err.event(), event);
        assert_eq!(
            QueryError::NoResult { event }.to_string(),
            "subscriber produced no result for query app::Balance"
        );
    }

    #[test]
    fn test_labels_are_stable() {
        assert_eq!(BuildError::AlreadyBuilt.as_label(), "build_already_built");
        assert_eq!(
            RuntimeError::AlreadyRunning.as_label(),
            "runtime_already_running"
        );
    }
}
