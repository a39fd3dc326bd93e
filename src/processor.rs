//! Bean post-processing hooks.

use crate::descriptor::{BoxedBean, ComponentDescriptor};
use crate::error::DiResult;
use crate::logging::short_name;

/// Hook invoked around the post-construct phase of every instantiation.
///
/// Processors run in registration order. Each may inspect the instance, mutate
/// it, or return a replacement; whatever it returns is what the next
/// processor, the post-construct hooks, and finally the caller see. Errors
/// abort the instantiation and propagate to the caller.
///
/// # Examples
///
/// ```
/// use aeolus_di::{BeanProcessor, BoxedBean, ComponentDescriptor, Container, DiResult};
/// use std::sync::Arc;
/// use std::sync::atomic::{AtomicUsize, Ordering};
///
/// #[derive(Default)]
/// struct Counter(AtomicUsize);
///
/// impl BeanProcessor for Counter {
///     fn after_initialization(&self, bean: BoxedBean, _: &ComponentDescriptor) -> DiResult<BoxedBean> {
///         self.0.fetch_add(1, Ordering::SeqCst);
///         Ok(bean)
///     }
/// }
///
/// #[derive(Default)]
/// struct Service;
///
/// let counter = Arc::new(Counter::default());
/// let container = Container::builder()
///     .add_processor(counter.clone())
///     .register(ComponentDescriptor::builder::<Service>().default_constructor().build())
///     .build()
///     .unwrap();
///
/// container.get::<Service>().unwrap();
/// container.get::<Service>().unwrap();
/// assert_eq!(counter.0.load(Ordering::SeqCst), 1);
/// ```
pub trait BeanProcessor: Send + Sync {
    /// Runs after injection, before post-construct hooks.
    fn before_initialization(&self, bean: BoxedBean, _descriptor: &ComponentDescriptor) -> DiResult<BoxedBean> {
        Ok(bean)
    }

    /// Runs after post-construct hooks.
    fn after_initialization(&self, bean: BoxedBean, _descriptor: &ComponentDescriptor) -> DiResult<BoxedBean> {
        Ok(bean)
    }

    /// Name used in log lines.
    fn name(&self) -> &str {
        short_name(std::any::type_name::<Self>())
    }
}
