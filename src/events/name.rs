//! # Event identity.
//!
//! Every routable event carries a compile-time [`EventName`]. The name is the
//! routing key: two events share a route iff their names are equal strings.
//!
//! ## Naming convention
//! ```text
//! <module path>::<TypeName>
//!   e.g. "my_app::orders::PlaceOrder"
//! ```
//! [`event_name!`](crate::event_name) builds exactly this string from
//! `module_path!()` and the type identifier, so names are stable for a given
//! type and distinct across types declared in different modules.

use std::fmt;

/// Stable routing key of a concrete event type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EventName(&'static str);

impl EventName {
    /// Wraps a static name. Prefer [`event_name!`](crate::event_name).
    #[inline]
    pub const fn new(name: &'static str) -> Self {
        Self(name)
    }

    /// Returns the full name.
    #[inline]
    pub const fn as_str(&self) -> &'static str {
        self.0
    }

    /// Returns the namespace part (everything before the last `::`).
    ///
    /// Empty for unqualified names.
    pub fn namespace(&self) -> &'static str {
        match self.0.rfind("::") {
            Some(idx) => &self.0[..idx],
            None => "",
        }
    }

    /// Returns the type part (everything after the last `::`).
    pub fn type_name(&self) -> &'static str {
        match self.0.rfind("::") {
            Some(idx) => &self.0[idx + 2..],
            None => self.0,
        }
    }

    /// Checks the `namespace::Type` convention.
    ///
    /// - at least one namespace segment
    /// - no empty segments
    /// - the type segment starts with an uppercase ASCII letter
    pub fn is_qualified(&self) -> bool {
        let segments: Vec<&str> = self.0.split("::").collect();
        if segments.len() < 2 || segments.iter().any(|s| s.is_empty()) {
            return false;
        }
        self.type_name()
            .chars()
            .next()
            .is_some_and(|c| c.is_ascii_uppercase())
    }
}

impl fmt::Display for EventName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

impl AsRef<str> for EventName {
    fn as_ref(&self) -> &str {
        self.0
    }
}

/// Builds the [`EventName`] of a type declared in the current module.
///
/// ```rust
/// use dibus::{event_name, EventName};
///
/// struct PlaceOrder;
/// const NAME: EventName = event_name!(PlaceOrder);
/// assert!(NAME.as_str().ends_with("::PlaceOrder"));
/// assert!(NAME.is_qualified());
/// ```
#[macro_export]
macro_rules! event_name {
    ($ty:ident) => {
        $crate::EventName::new(concat!(module_path!(), "::", stringify!($ty)))
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Sample;

    #[test]
    fn test_macro_uses_module_path_and_type() {
        let _ = Sample;
        let name = event_name!(Sample);
        assert_eq!(name.as_str(), "dibus::events::name::tests::Sample");
        assert_eq!(name.namespace(), "dibus::events::name::tests");
        assert_eq!(name.type_name(), "Sample");
    }

    #[test]
    fn test_qualified_names() {
        assert!(EventName::new("app::PlaceOrder").is_qualified());
        assert!(EventName::new("app::orders::PlaceOrder").is_qualified());
    }

    #[test]
    fn test_unqualified_names_rejected() {
        assert!(!EventName::new("PlaceOrder").is_qualified());
        assert!(!EventName::new("app::").is_qualified());
        assert!(!EventName::new("::PlaceOrder").is_qualified());
        assert!(!EventName::new("app::::PlaceOrder").is_qualified());
        assert!(!EventName::new("app::place_order").is_qualified());
        assert!(!EventName::new("").is_qualified());
    }

    #[test]
    fn test_unqualified_parts() {
        let name = EventName::new("Bare");
        assert_eq!(name.namespace(), "");
        assert_eq!(name.type_name(), "Bare");
        assert_eq!(name.to_string(), "Bare");
    }
}
