//! # Query results.
//!
//! A subscriber answers a query with an untyped [`Payload`] (or nothing).
//! The bus wraps that answer in a [`QueryResult`] which keeps three outcomes apart:
//!
//! | Variant                  | Meaning                                         |
//! |--------------------------|-------------------------------------------------|
//! | [`QueryResult::Unrouted`]| no subscriber is registered for the query name  |
//! | [`QueryResult::Empty`]   | a subscriber matched but produced no payload    |
//! | [`QueryResult::Value`]   | a subscriber matched and produced a payload     |
//!
//! [`QueryResult::extract`] turns these into typed `Result`s.

use std::any::{type_name, Any};

use super::name::EventName;
use crate::error::QueryError;

/// Untyped answer produced by a query handler.
pub type Payload = Box<dyn Any + Send>;

/// Wraps a value as a handler answer.
///
/// Shorthand for `Some(Box::new(value))`.
#[inline]
pub fn answer<T: Any + Send>(value: T) -> Option<Payload> {
    Some(Box::new(value))
}

/// Outcome of routing a single query.
#[derive(Debug)]
pub enum QueryResult {
    /// No subscriber is registered for the query name.
    Unrouted,
    /// The first subscriber processed the query and returned nothing.
    Empty,
    /// The first subscriber processed the query and returned a payload.
    Value(Payload),
}

impl QueryResult {
    /// Returns `true` if a subscriber processed the query.
    #[inline]
    pub fn is_routed(&self) -> bool {
        !matches!(self, QueryResult::Unrouted)
    }

    /// Returns the payload, if any.
    pub fn into_payload(self) -> Option<Payload> {
        match self {
            QueryResult::Value(payload) => Some(payload),
            QueryResult::Unrouted | QueryResult::Empty => None,
        }
    }

    /// Borrows the payload as `T` without consuming the result.
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        match self {
            QueryResult::Value(payload) => payload.downcast_ref::<T>(),
            QueryResult::Unrouted | QueryResult::Empty => None,
        }
    }

    /// Extracts the payload as `T`.
    ///
    /// `event` is only used to label the error.
    pub fn extract<T: Any>(self, event: EventName) -> Result<T, QueryError> {
        match self {
            QueryResult::Unrouted => Err(QueryError::NoHandler { event }),
            QueryResult::Empty => Err(QueryError::NoResult { event }),
            QueryResult::Value(payload) => match payload.downcast::<T>() {
                Ok(value) => Ok(*value),
                Err(_) => Err(QueryError::TypeMismatch {
                    event,
                    expected: type_name::<T>(),
                }),
            },
        }
    }
}

impl From<Option<Payload>> for QueryResult {
    fn from(answer: Option<Payload>) -> Self {
        match answer {
            Some(payload) => QueryResult::Value(payload),
            None => QueryResult::Empty,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NAME: EventName = EventName::new("tests::Probe");

    #[test]
    fn test_extract_matching_type() {
        let result = QueryResult::from(answer(10_i32));
        assert_eq!(result.extract::<i32>(NAME).unwrap(), 10);
    }

    #[test]
    fn test_extract_mismatched_type() {
        let result = QueryResult::from(answer(10_i32));
        let err = result.extract::<String>(NAME).unwrap_err();
        assert_eq!(err.as_label(), "query_type_mismatch");
    }

    #[test]
    fn test_unrouted_and_empty_are_distinct() {
        let err = QueryResult::Unrouted.extract::<i32>(NAME).unwrap_err();
        assert_eq!(err.as_label(), "query_no_handler");

        let err = QueryResult::from(None).extract::<i32>(NAME).unwrap_err();
        assert_eq!(err.as_label(), "query_no_result");

        assert!(!QueryResult::Unrouted.is_routed());
        assert!(QueryResult::Empty.is_routed());
    }

    #[test]
    fn test_downcast_ref_keeps_result() {
        let result = QueryResult::from(answer("hello"));
        assert_eq!(result.downcast_ref::<&str>(), Some(&"hello"));
        assert!(result.into_payload().is_some());
    }
}
