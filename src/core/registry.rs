//! # Routing table: event name → ordered subscribers.
//!
//! The table is filled once by `build` through [`RegistryBuilder`] and then frozen
//! into a [`Registry`], which has no mutating API. Dispatch reads it without locks.
//!
//! ## Rules
//! - a name maps to zero or more subscribers, in registration order
//! - duplicate registrations for one name are allowed
//! - one name may only ever be declared by one concrete type

use std::any::TypeId;
use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use crate::error::BuildError;
use crate::events::EventName;
use crate::subscribers::Subscriber;

/// Mutable table used during `build`.
#[derive(Default)]
pub(crate) struct RegistryBuilder {
    routes: HashMap<EventName, Vec<Arc<dyn Subscriber>>>,
    owners: HashMap<EventName, TypeId>,
}

impl RegistryBuilder {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Appends `sub` to the route of `name`.
    ///
    /// Fails if `name` was already declared by a type other than `type_id`.
    pub(crate) fn register(
        &mut self,
        name: EventName,
        type_id: TypeId,
        sub: &Arc<dyn Subscriber>,
    ) -> Result<(), BuildError> {
        let owner = *self.owners.entry(name).or_insert(type_id);
        if owner != type_id {
            return Err(BuildError::NameCollision {
                event: name,
                subscriber: sub.name(),
            });
        }

        let route = self.routes.entry(name).or_default();
        route.push(Arc::clone(sub));
        debug!(event = %name, subscriber = sub.name(), position = route.len(), "route registered");
        Ok(())
    }

    /// Freezes the table.
    pub(crate) fn freeze(self) -> Registry {
        Registry {
            routes: self.routes,
        }
    }
}

/// Frozen routing table.
pub(crate) struct Registry {
    routes: HashMap<EventName, Vec<Arc<dyn Subscriber>>>,
}

impl Registry {
    /// Subscribers registered for `name`, in registration order.
    pub(crate) fn lookup(&self, name: EventName) -> &[Arc<dyn Subscriber>] {
        self.routes.get(&name).map(Vec::as_slice).unwrap_or_default()
    }

    /// First subscriber registered for `name`.
    pub(crate) fn first(&self, name: EventName) -> Option<&Arc<dyn Subscriber>> {
        self.lookup(name).first()
    }

    /// Number of distinct routed names.
    pub(crate) fn len(&self) -> usize {
        self.routes.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::subscribers::SubscriberOptions;

    struct Named(&'static str);

    impl Subscriber for Named {
        fn build_options(&self) -> SubscriberOptions {
            SubscriberOptions::new()
        }

        fn name(&self) -> &'static str {
            self.0
        }
    }

    struct A;
    struct B;

    fn sub(name: &'static str) -> Arc<dyn Subscriber> {
        Arc::new(Named(name))
    }

    #[test]
    fn test_duplicates_keep_registration_order() {
        let name = EventName::new("tests::A");
        let mut builder = RegistryBuilder::new();
        builder.register(name, TypeId::of::<A>(), &sub("first")).unwrap();
        builder.register(name, TypeId::of::<A>(), &sub("second")).unwrap();

        let registry = builder.freeze();
        let names: Vec<&str> = registry.lookup(name).iter().map(|s| s.name()).collect();
        assert_eq!(names, vec!["first", "second"]);
        assert_eq!(registry.first(name).map(|s| s.name()), Some("first"));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_missing_route_is_empty() {
        let registry = RegistryBuilder::new().freeze();
        assert!(registry.lookup(EventName::new("tests::Missing")).is_empty());
        assert!(registry.first(EventName::new("tests::Missing")).is_none());
    }

    #[test]
    fn test_name_collision_rejected() {
        let name = EventName::new("tests::Shared");
        let mut builder = RegistryBuilder::new();
        builder.register(name, TypeId::of::<A>(), &sub("a")).unwrap();

        let err = builder
            .register(name, TypeId::of::<B>(), &sub("b"))
            .unwrap_err();
        assert_eq!(
            err,
            BuildError::NameCollision {
                event: name,
                subscriber: "b"
            }
        );
    }
}
