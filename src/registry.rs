//! Binding registry: capability, name and pre-built instance tables.

use std::any::TypeId;
use std::collections::HashSet;
use std::sync::Arc;

use dashmap::DashMap;

use crate::descriptor::{AnyArc, ComponentDescriptor};
use crate::error::{DiError, DiResult};
use crate::key::Key;

/// Instance registered or cached under an alias.
///
/// `origin` is set when the instance was built from a descriptor, so a lookup
/// by capability can convert the concrete instance into capability form.
#[derive(Clone)]
pub(crate) struct NamedBean {
    pub(crate) value: AnyArc,
    pub(crate) origin: Option<Arc<ComponentDescriptor>>,
}

/// Outcome of an alias lookup.
pub(crate) enum NamedLookup {
    Instance(NamedBean),
    Descriptor(Arc<ComponentDescriptor>),
    Missing,
}

/// Registry of every binding the container resolves through.
///
/// Concurrent maps keep reads lock-free for resolving threads. Every
/// registration is last-writer-wins.
pub(crate) struct Registry {
    /// Components by their own identity
    descriptors: DashMap<TypeId, Arc<ComponentDescriptor>>,
    /// Capability (or self) key to implementing component
    bindings: DashMap<Key, Arc<ComponentDescriptor>>,
    named_bindings: DashMap<String, Arc<ComponentDescriptor>>,
    named_beans: DashMap<String, NamedBean>,
    /// Pre-built instances from configuration factories
    typed_beans: DashMap<Key, AnyArc>,
}

impl Registry {
    pub(crate) fn new() -> Self {
        Self {
            descriptors: DashMap::new(),
            bindings: DashMap::new(),
            named_bindings: DashMap::new(),
            named_beans: DashMap::new(),
            typed_beans: DashMap::new(),
        }
    }

    /// Binds the component to itself, to every capability it declares, and
    /// to its alias if it has one.
    pub(crate) fn register_component(&self, descriptor: Arc<ComponentDescriptor>) {
        self.descriptors.insert(descriptor.type_id(), descriptor.clone());
        self.bindings.insert(descriptor.key(), descriptor.clone());
        for capability in descriptor.capabilities() {
            self.bindings.insert(capability, descriptor.clone());
        }
        if let Some(name) = descriptor.name() {
            self.named_bindings.insert(name.to_string(), descriptor.clone());
        }
    }

    pub(crate) fn register_type(&self, key: Key, descriptor: Arc<ComponentDescriptor>) {
        self.bindings.insert(key, descriptor);
    }

    pub(crate) fn register_named(&self, name: impl Into<String>, descriptor: Arc<ComponentDescriptor>) {
        self.named_bindings.insert(name.into(), descriptor);
    }

    pub(crate) fn register_named_instance(&self, name: impl Into<String>, value: AnyArc) {
        self.named_beans.insert(name.into(), NamedBean { value, origin: None });
    }

    /// Caches a shared instance under its alias unless one is already there.
    /// Returns the cached bean.
    pub(crate) fn cache_named(&self, name: &str, bean: NamedBean) -> NamedBean {
        self.named_beans
            .entry(name.to_string())
            .or_insert(bean)
            .value()
            .clone()
    }

    pub(crate) fn register_typed_instance(&self, key: Key, value: AnyArc) {
        self.typed_beans.insert(key, value);
    }

    pub(crate) fn descriptor(&self, type_id: TypeId) -> Option<Arc<ComponentDescriptor>> {
        self.descriptors.get(&type_id).map(|d| d.value().clone())
    }

    pub(crate) fn typed_instance(&self, key: &Key) -> Option<AnyArc> {
        self.typed_beans.get(key).map(|b| b.value().clone())
    }

    /// Component bound to `key`.
    pub(crate) fn lookup_by_capability(&self, key: &Key) -> DiResult<Arc<ComponentDescriptor>> {
        self.bindings
            .get(key)
            .map(|d| d.value().clone())
            .ok_or_else(|| DiError::NotFound(key.display_name().to_string()))
    }

    /// Named instances shadow named bindings.
    pub(crate) fn lookup_by_name(&self, name: &str) -> NamedLookup {
        if let Some(bean) = self.named_beans.get(name) {
            return NamedLookup::Instance(bean.value().clone());
        }
        match self.named_bindings.get(name) {
            Some(descriptor) => NamedLookup::Descriptor(descriptor.value().clone()),
            None => NamedLookup::Missing,
        }
    }

    pub(crate) fn binding_count(&self) -> usize {
        self.bindings.len()
    }

    pub(crate) fn typed_instance_count(&self) -> usize {
        self.typed_beans.len()
    }

    /// Distinct aliases across named bindings and named instances.
    pub(crate) fn name_count(&self) -> usize {
        let mut names: HashSet<String> = self.named_bindings.iter().map(|e| e.key().clone()).collect();
        names.extend(self.named_beans.iter().map(|e| e.key().clone()));
        names.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scope::Scope;

    trait Greeter: Send + Sync {}

    #[derive(Default)]
    struct Hello;
    impl Greeter for Hello {}

    #[derive(Default)]
    struct Bonjour;
    impl Greeter for Bonjour {}

    fn hello() -> Arc<ComponentDescriptor> {
        Arc::new(
            ComponentDescriptor::builder::<Hello>()
                .named("hello")
                .provides::<dyn Greeter>(|h| h as Arc<dyn Greeter>)
                .default_constructor()
                .build(),
        )
    }

    #[test]
    fn component_is_bound_to_self_capability_and_name() {
        let registry = Registry::new();
        registry.register_component(hello());

        assert!(registry.lookup_by_capability(&Key::of::<Hello>()).is_ok());
        assert!(registry.lookup_by_capability(&Key::capability::<dyn Greeter>()).is_ok());
        assert!(matches!(registry.lookup_by_name("hello"), NamedLookup::Descriptor(_)));
        assert_eq!(registry.binding_count(), 2);
        assert_eq!(registry.name_count(), 1);
    }

    #[test]
    fn last_capability_registration_wins() {
        let registry = Registry::new();
        registry.register_component(hello());
        let bonjour = Arc::new(
            ComponentDescriptor::builder::<Bonjour>()
                .scope(Scope::Prototype)
                .provides::<dyn Greeter>(|b| b as Arc<dyn Greeter>)
                .build(),
        );
        registry.register_component(bonjour);

        let bound = registry.lookup_by_capability(&Key::capability::<dyn Greeter>()).unwrap();
        assert_eq!(bound.type_id(), TypeId::of::<Bonjour>());
    }

    #[test]
    fn explicit_type_binding_replaces_component_binding() {
        let registry = Registry::new();
        registry.register_component(hello());
        let bonjour = Arc::new(ComponentDescriptor::builder::<Bonjour>().build());
        registry.register_type(Key::capability::<dyn Greeter>(), bonjour);

        let bound = registry.lookup_by_capability(&Key::capability::<dyn Greeter>()).unwrap();
        assert_eq!(bound.type_id(), TypeId::of::<Bonjour>());
        // the component's own identity is untouched
        assert!(registry.descriptor(TypeId::of::<Hello>()).is_some());
    }

    #[test]
    fn missing_capability_is_not_found() {
        let registry = Registry::new();
        match registry.lookup_by_capability(&Key::capability::<dyn Greeter>()) {
            Err(DiError::NotFound(name)) => assert!(name.contains("Greeter")),
            _ => panic!("expected NotFound"),
        }
        assert!(matches!(registry.lookup_by_name("nobody"), NamedLookup::Missing));
    }

    #[test]
    fn named_instance_shadows_named_binding() {
        let registry = Registry::new();
        registry.register_named("hello", hello());
        registry.register_named_instance("hello", Arc::new(5u32));

        match registry.lookup_by_name("hello") {
            NamedLookup::Instance(bean) => {
                assert_eq!(*bean.value.downcast::<u32>().unwrap(), 5);
                assert!(bean.origin.is_none());
            }
            _ => panic!("expected instance"),
        }
    }

    #[test]
    fn cache_named_keeps_first_instance() {
        let registry = Registry::new();
        let first = registry.cache_named("n", NamedBean { value: Arc::new(1u8), origin: None });
        let second = registry.cache_named("n", NamedBean { value: Arc::new(2u8), origin: None });
        assert!(Arc::ptr_eq(&first.value, &second.value));
    }
}
