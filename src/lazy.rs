//! Deferred dependency handles.

use std::fmt;
use std::sync::{Arc, Weak};

use once_cell::sync::OnceCell;

use crate::container::ContainerInner;
use crate::descriptor::{AnyArc, InjectionPoint, Injected};
use crate::error::{DiError, DiResult};

/// A dependency whose resolution is deferred until first use.
///
/// The handle keeps a weak reference to its container. The first call to
/// [`get`](Lazy::get) resolves the dependency with a fresh resolution stack and
/// memoizes the result; later calls return the same `Arc`. Deferring is how two
/// components can depend on each other without a circular-dependency failure.
///
/// # Examples
///
/// ```
/// use aeolus_di::{Container, ComponentDescriptor, Inject, Lazy};
/// use std::sync::Arc;
///
/// #[derive(Default)]
/// struct Ping { pong: Option<Lazy<Pong>> }
/// #[derive(Default)]
/// struct Pong { ping: Option<Arc<Ping>> }
///
/// let container = Container::builder()
///     .register(
///         ComponentDescriptor::builder::<Ping>()
///             .default_constructor()
///             .lazy_field("pong", Inject::<Pong>::of(), |p, lazy| p.pong = Some(lazy))
///             .build(),
///     )
///     .register(
///         ComponentDescriptor::builder::<Pong>()
///             .default_constructor()
///             .field("ping", Inject::<Ping>::of(), |p, ping| p.ping = Some(ping))
///             .build(),
///     )
///     .build()
///     .unwrap();
///
/// let ping = container.get::<Ping>().unwrap();
/// let lazy = ping.pong.as_ref().unwrap();
/// assert!(!lazy.is_resolved());
/// let pong = lazy.get().unwrap();
/// assert!(Arc::ptr_eq(pong.ping.as_ref().unwrap(), &ping));
/// ```
pub struct Lazy<T: ?Sized> {
    cell: OnceCell<Arc<T>>,
    deferred: Option<Deferred>,
    extract: fn(AnyArc) -> DiResult<Arc<T>>,
}

impl<T: ?Sized + Send + Sync + 'static> Lazy<T> {
    pub(crate) fn from_injected(injected: Injected, extract: fn(AnyArc) -> DiResult<Arc<T>>) -> DiResult<Self> {
        match injected {
            Injected::Resolved(any) => {
                let cell = OnceCell::new();
                let _ = cell.set(extract(any)?);
                Ok(Self {
                    cell,
                    deferred: None,
                    extract,
                })
            }
            Injected::Deferred(deferred) => Ok(Self {
                cell: OnceCell::new(),
                deferred: Some(deferred),
                extract,
            }),
        }
    }

    /// Resolves on first call, then returns the memoized instance.
    ///
    /// Fails with [`DiError::Detached`] if the container has been dropped
    /// before the first call.
    pub fn get(&self) -> DiResult<Arc<T>> {
        self.cell
            .get_or_try_init(|| match &self.deferred {
                Some(deferred) => (self.extract)(deferred.resolve()?),
                None => Err(DiError::TypeMismatch(std::any::type_name::<T>())),
            })
            .map(Arc::clone)
    }

    /// Whether the dependency has been resolved yet.
    pub fn is_resolved(&self) -> bool {
        self.cell.get().is_some()
    }
}

impl<T: ?Sized> fmt::Debug for Lazy<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Lazy")
            .field("target", &std::any::type_name::<T>())
            .field("resolved", &self.cell.get().is_some())
            .finish()
    }
}

/// Pending resolution of an injection point against a container.
pub(crate) struct Deferred {
    container: Weak<ContainerInner>,
    point: InjectionPoint,
}

impl Deferred {
    pub(crate) fn new(container: Weak<ContainerInner>, point: InjectionPoint) -> Self {
        Self { container, point }
    }

    pub(crate) fn resolve(&self) -> DiResult<AnyArc> {
        let container = self
            .container
            .upgrade()
            .ok_or(DiError::Detached(self.point.key.display_name()))?;
        container.resolve_point(&self.point)
    }
}
