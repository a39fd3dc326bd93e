//! Scope tags controlling instance caching behavior.

use std::fmt;
use std::str::FromStr;

/// Scope tag declared by a component
///
/// Defines how many instances of a component exist and who may observe them.
/// Scopes are a resource-lifetime policy, not an identity policy: a singleton
/// component can still be built fresh through [`Container::create`], which
/// bypasses scope caching entirely.
///
/// # Scope Characteristics
///
/// - **Singleton**: one instance per container, shared across threads
/// - **Thread**: one instance per container per calling thread
/// - **Prototype**: a fresh instance for every resolution, never cached
///
/// # Examples
///
/// ```rust
/// use aeolus_di::{Container, ComponentDescriptor, Scope};
/// use std::sync::Arc;
///
/// #[derive(Default)]
/// struct Database;
/// #[derive(Default)]
/// struct RequestModel;
///
/// let container = Container::builder()
///     .register(ComponentDescriptor::builder::<Database>().default_constructor().build())
///     .register(
///         ComponentDescriptor::builder::<RequestModel>()
///             .scope(Scope::Prototype)
///             .default_constructor()
///             .build(),
///     )
///     .build()
///     .unwrap();
///
/// let db1 = container.get::<Database>().unwrap();
/// let db2 = container.get::<Database>().unwrap();
/// assert!(Arc::ptr_eq(&db1, &db2)); // Same instance
///
/// let m1 = container.get::<RequestModel>().unwrap();
/// let m2 = container.get::<RequestModel>().unwrap();
/// assert!(!Arc::ptr_eq(&m1, &m2)); // Always different
/// ```
///
/// [`Container::create`]: crate::Container::create
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Scope {
    /// Single instance per container, cached until shutdown
    ///
    /// Created on first request and shared by every caller on every thread.
    /// Concurrent first requests are serialized per component: exactly one
    /// caller builds the instance, the others wait and observe it.
    #[default]
    Singleton,
    /// New instance per resolution, never cached
    Prototype,
    /// Single instance per calling thread
    ///
    /// Two resolutions on the same thread observe the same instance; a
    /// resolution on another thread gets its own instance and lifecycle.
    Thread,
}

impl Scope {
    /// Scope tag as written in component declarations.
    pub fn as_str(&self) -> &'static str {
        match self {
            Scope::Singleton => "singleton",
            Scope::Prototype => "prototype",
            Scope::Thread => "thread",
        }
    }

    /// Whether instances of this scope may be cached under an alias name.
    pub fn is_shared(&self) -> bool {
        matches!(self, Scope::Singleton)
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown scope tag.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown scope: {0}")]
pub struct UnknownScope(pub String);

impl FromStr for Scope {
    type Err = UnknownScope;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "singleton" => Ok(Scope::Singleton),
            "prototype" => Ok(Scope::Prototype),
            "thread" => Ok(Scope::Thread),
            other => Err(UnknownScope(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_declared_tags() {
        assert_eq!("singleton".parse::<Scope>().unwrap(), Scope::Singleton);
        assert_eq!(" thread ".parse::<Scope>().unwrap(), Scope::Thread);
        assert_eq!("prototype".parse::<Scope>().unwrap(), Scope::Prototype);
        assert_eq!("request".parse::<Scope>(), Err(UnknownScope("request".to_string())));
    }

    #[test]
    fn only_singleton_is_shared() {
        assert!(Scope::Singleton.is_shared());
        assert!(!Scope::Thread.is_shared());
        assert!(!Scope::Prototype.is_shared());
        assert_eq!(Scope::default(), Scope::Singleton);
    }
}
