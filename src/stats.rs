//! Container introspection.

use std::fmt;

/// Point-in-time counts of a container's tables.
///
/// `memory_used_bytes` is the shallow size of every managed instance; heap
/// data owned by those instances is not counted.
///
/// # Examples
///
/// ```
/// use aeolus_di::{Container, ComponentDescriptor};
///
/// struct Cache([u8; 64]);
///
/// impl Default for Cache {
///     fn default() -> Self {
///         Cache([0; 64])
///     }
/// }
///
/// let container = Container::builder()
///     .property("app.name", "demo")
///     .register(ComponentDescriptor::builder::<Cache>().default_constructor().build())
///     .build()
///     .unwrap();
///
/// container.get::<Cache>().unwrap();
/// let stats = container.stats();
/// assert_eq!(stats.bindings, 1);
/// assert_eq!(stats.managed, 1);
/// assert_eq!(stats.singletons, 1);
/// assert_eq!(stats.properties, 1);
/// assert_eq!(stats.memory_used_bytes, 64);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ContainerStats {
    /// Capability and self bindings
    pub bindings: usize,
    /// Pre-built instances registered by key
    pub beans: usize,
    /// Singleton instances cached so far
    pub singletons: usize,
    /// Thread-scoped instances cached on the calling thread
    pub thread_local: usize,
    /// Distinct aliases
    pub named: usize,
    /// Instances awaiting pre-destroy hooks
    pub managed: usize,
    pub properties: usize,
    pub processors: usize,
    pub memory_used_bytes: usize,
}

impl ContainerStats {
    /// Stats as a JSON object.
    #[cfg(feature = "serde")]
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

impl fmt::Display for ContainerStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "bindings={} beans={} singletons={} thread_local={} named={} managed={} properties={} processors={} memory.used.mb={:.2}",
            self.bindings,
            self.beans,
            self.singletons,
            self.thread_local,
            self.named,
            self.managed,
            self.properties,
            self.processors,
            self.memory_used_bytes as f64 / (1024.0 * 1024.0)
        )
    }
}
