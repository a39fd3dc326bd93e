//! Resolution keys for the dependency injection container.

use std::any::TypeId;

/// Key identifying what a caller asks the container for.
///
/// A key is either a concrete component type or a capability (a trait object
/// type such as `dyn Greeter`). Both carry the `TypeId` used for lookup and the
/// canonical type name used for diagnostics and discovery filters.
///
/// # Examples
///
/// ```rust
/// use aeolus_di::Key;
///
/// trait Greeter: Send + Sync {}
/// struct Service;
///
/// let concrete = Key::of::<Service>();
/// let capability = Key::capability::<dyn Greeter>();
///
/// assert!(!concrete.is_capability());
/// assert!(capability.is_capability());
/// assert!(concrete.display_name().ends_with("Service"));
/// assert!(capability.display_name().contains("Greeter"));
/// assert_ne!(concrete, capability);
/// ```
#[derive(Debug, Clone, Copy)]
pub enum Key {
    /// Concrete component type with TypeId and name for diagnostics
    Type(TypeId, &'static str),
    /// Capability (trait object) a component may satisfy
    Capability(TypeId, &'static str),
}

impl Key {
    /// Key for a concrete type.
    #[inline(always)]
    pub fn of<T: 'static>() -> Key {
        Key::Type(TypeId::of::<T>(), std::any::type_name::<T>())
    }

    /// Key for a capability, usually `dyn Trait`.
    #[inline(always)]
    pub fn capability<I: ?Sized + 'static>() -> Key {
        Key::Capability(TypeId::of::<I>(), std::any::type_name::<I>())
    }

    /// Get the type or trait name for display
    pub fn display_name(&self) -> &'static str {
        match self {
            Key::Type(_, name) | Key::Capability(_, name) => name,
        }
    }

    /// The `TypeId` behind the key.
    pub fn type_id(&self) -> TypeId {
        match self {
            Key::Type(id, _) | Key::Capability(id, _) => *id,
        }
    }

    /// Whether this key names a capability rather than a concrete type.
    pub fn is_capability(&self) -> bool {
        matches!(self, Key::Capability(_, _))
    }
}

// TypeId-only comparison; the name is for diagnostics
impl PartialEq for Key {
    #[inline(always)]
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Key::Type(a, _), Key::Type(b, _)) => a == b,
            (Key::Capability(a, _), Key::Capability(b, _)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Key {}

impl std::hash::Hash for Key {
    #[inline(always)]
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        match self {
            Key::Type(id, _) => {
                0u8.hash(state); // Discriminant
                id.hash(state);
            }
            Key::Capability(id, _) => {
                1u8.hash(state);
                id.hash(state);
            }
        }
    }
}

impl std::fmt::Display for Key {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.display_name())
    }
}
