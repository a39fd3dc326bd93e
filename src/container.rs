//! The container and its instantiation engine.

use std::fmt;
use std::sync::{Arc, Weak};

use parking_lot::Mutex;

use crate::binder;
use crate::builder::ContainerBuilder;
use crate::descriptor::{
    extract_capability, extract_type, AnyArc, BeanMethod, ComponentDescriptor, Constructor, ConstructorArgs,
    InjectionPoint, Injected,
};
use crate::error::{DiError, DiResult};
use crate::key::Key;
use crate::lazy::Deferred;
use crate::logging::{short_name, Logger};
use crate::processor::BeanProcessor;
use crate::properties::Properties;
use crate::registry::{NamedBean, NamedLookup, Registry};
use crate::resolution::ResolutionStack;
use crate::scope_manager::ScopeManager;
use crate::stats::ContainerStats;

/// An instance the container built, kept for its pre-destroy hooks.
struct ManagedBean {
    descriptor: Arc<ComponentDescriptor>,
    instance: AnyArc,
}

/// Runtime dependency injection container.
///
/// Built once with [`ContainerBuilder`], then used concurrently from any
/// number of threads. Cloning is cheap and every clone shares the same
/// registry, caches and managed set.
///
/// # Resolution order
///
/// A request for a key (optionally with an alias) is answered by the first of:
///
/// 1. a configuration-bound component for that type (a fresh bound instance)
/// 2. an instance registered or cached under the alias
/// 3. the component bound to the alias (cached under the alias if singleton)
/// 4. a pre-built instance registered under the key
/// 5. the component bound to the key
///
/// # Examples
///
/// ```
/// use aeolus_di::{Container, ComponentDescriptor, InjectionPoint, Scope};
/// use std::sync::Arc;
///
/// trait Repository: Send + Sync { fn find(&self) -> &'static str; }
///
/// #[derive(Default)]
/// struct MemoryRepo;
/// impl Repository for MemoryRepo { fn find(&self) -> &'static str { "alice" } }
///
/// struct UserService { repo: Arc<dyn Repository> }
///
/// let container = Container::builder()
///     .register(
///         ComponentDescriptor::builder::<MemoryRepo>()
///             .provides::<dyn Repository>(|r| r as Arc<dyn Repository>)
///             .default_constructor()
///             .build(),
///     )
///     .register(
///         ComponentDescriptor::builder::<UserService>()
///             .scope(Scope::Prototype)
///             .inject_constructor(vec![InjectionPoint::capability::<dyn Repository>()], |args| {
///                 Ok(UserService { repo: args.capability::<dyn Repository>()? })
///             })
///             .build(),
///     )
///     .build()
///     .unwrap();
///
/// let users = container.get::<UserService>().unwrap();
/// assert_eq!(users.repo.find(), "alice");
/// ```
#[derive(Clone)]
pub struct Container {
    inner: Arc<ContainerInner>,
}

pub(crate) struct ContainerInner {
    pub(crate) registry: Registry,
    pub(crate) scopes: ScopeManager,
    pub(crate) properties: Properties,
    pub(crate) processors: Vec<Arc<dyn BeanProcessor>>,
    pub(crate) log: Arc<dyn Logger>,
    managed: Mutex<Vec<ManagedBean>>,
    this: Weak<ContainerInner>,
}

impl Container {
    /// Starts a new [`ContainerBuilder`].
    pub fn builder() -> ContainerBuilder {
        ContainerBuilder::new()
    }

    pub(crate) fn from_inner(inner: Arc<ContainerInner>) -> Self {
        Self { inner }
    }

    /// Resolves a concrete component.
    pub fn get<T: Send + Sync + 'static>(&self) -> DiResult<Arc<T>> {
        extract_type::<T>(self.inner.resolve_root(Key::of::<T>(), None)?)
    }

    /// Resolves a capability, usually `dyn Trait`.
    ///
    /// ```
    /// use aeolus_di::{Container, ComponentDescriptor};
    /// use std::sync::Arc;
    ///
    /// trait Greeter: Send + Sync { fn greet(&self) -> String; }
    /// #[derive(Default)]
    /// struct English;
    /// impl Greeter for English { fn greet(&self) -> String { "hello".into() } }
    ///
    /// let container = Container::builder()
    ///     .register(
    ///         ComponentDescriptor::builder::<English>()
    ///             .provides::<dyn Greeter>(|e| e as Arc<dyn Greeter>)
    ///             .default_constructor()
    ///             .build(),
    ///     )
    ///     .build()
    ///     .unwrap();
    ///
    /// assert_eq!(container.get_capability::<dyn Greeter>().unwrap().greet(), "hello");
    /// ```
    pub fn get_capability<I: ?Sized + Send + Sync + 'static>(&self) -> DiResult<Arc<I>> {
        extract_capability::<I>(self.inner.resolve_root(Key::capability::<I>(), None)?)
    }

    /// Resolves a concrete component through an alias first.
    pub fn get_named<T: Send + Sync + 'static>(&self, name: &str) -> DiResult<Arc<T>> {
        extract_type::<T>(self.inner.resolve_root(Key::of::<T>(), Some(name))?)
    }

    /// Resolves a capability through an alias first.
    ///
    /// ```
    /// use aeolus_di::{Container, ComponentDescriptor};
    /// use std::sync::Arc;
    ///
    /// trait Sink: Send + Sync { fn id(&self) -> u8; }
    /// #[derive(Default)] struct Console;
    /// #[derive(Default)] struct File;
    /// impl Sink for Console { fn id(&self) -> u8 { 1 } }
    /// impl Sink for File { fn id(&self) -> u8 { 2 } }
    ///
    /// let container = Container::builder()
    ///     .register(ComponentDescriptor::builder::<Console>()
    ///         .provides::<dyn Sink>(|c| c as Arc<dyn Sink>).default_constructor().build())
    ///     .register(ComponentDescriptor::builder::<File>().named("file")
    ///         .provides::<dyn Sink>(|f| f as Arc<dyn Sink>).default_constructor().build())
    ///     .build()
    ///     .unwrap();
    ///
    /// // last registration owns the capability binding
    /// assert_eq!(container.get_capability::<dyn Sink>().unwrap().id(), 2);
    /// assert_eq!(container.get_named_capability::<dyn Sink>("file").unwrap().id(), 2);
    /// ```
    pub fn get_named_capability<I: ?Sized + Send + Sync + 'static>(&self, name: &str) -> DiResult<Arc<I>> {
        extract_capability::<I>(self.inner.resolve_root(Key::capability::<I>(), Some(name))?)
    }

    /// Looks up a bean by alias alone and returns it type-erased.
    ///
    /// Instances registered under the alias are returned as stored; a
    /// component bound to the alias is returned in its concrete form.
    pub fn get_by_name(&self, name: &str) -> DiResult<AnyArc> {
        match self.inner.registry.lookup_by_name(name) {
            NamedLookup::Instance(bean) => Ok(bean.value),
            NamedLookup::Descriptor(descriptor) => self.inner.resolve_root(descriptor.key(), Some(name)),
            NamedLookup::Missing => Err(DiError::NotFound(format!("bean named '{name}'"))),
        }
    }

    /// Resolves an arbitrary injection point; lazy points yield the
    /// resolved instance directly.
    pub fn resolve(&self, point: &InjectionPoint) -> DiResult<AnyArc> {
        self.inner.resolve_point(point)
    }

    /// Builds a fresh instance of the component registered for `T`.
    ///
    /// Construction, injection, processors and hooks run exactly as for a
    /// regular resolution, but no scope cache or capability binding is
    /// consulted for `T` itself. The instance joins the managed set.
    ///
    /// ```
    /// use aeolus_di::{Container, ComponentDescriptor};
    /// use std::sync::Arc;
    ///
    /// #[derive(Default)]
    /// struct Session;
    ///
    /// let container = Container::builder()
    ///     .register(ComponentDescriptor::builder::<Session>().default_constructor().build())
    ///     .build()
    ///     .unwrap();
    ///
    /// let shared = container.get::<Session>().unwrap();
    /// let fresh = container.create::<Session>().unwrap();
    /// assert!(!Arc::ptr_eq(&shared, &fresh));
    /// ```
    pub fn create<T: Send + Sync + 'static>(&self) -> DiResult<Arc<T>> {
        let descriptor = self
            .inner
            .registry
            .descriptor(std::any::TypeId::of::<T>())
            .ok_or_else(|| DiError::NotFound(std::any::type_name::<T>().to_string()))?;
        extract_type::<T>(self.inner.create_from(&descriptor)?)
    }

    /// Builds a fresh instance from a descriptor that need not be registered.
    pub fn create_with(&self, descriptor: ComponentDescriptor) -> DiResult<AnyArc> {
        self.inner.create_from(&Arc::new(descriptor))
    }

    /// Snapshot of the container's tables.
    pub fn stats(&self) -> ContainerStats {
        self.inner.stats()
    }

    /// Configuration the container was built with.
    pub fn properties(&self) -> &Properties {
        &self.inner.properties
    }

    /// Runs every pre-destroy hook of every managed instance and empties the
    /// managed set.
    ///
    /// Instances are destroyed in reverse creation order. Hook failures are
    /// logged and never stop the remaining hooks. A second call finds nothing
    /// left to destroy. Thread-scoped instances cached on the calling thread
    /// are released; instances cached on other threads live until those
    /// threads exit.
    ///
    /// ```
    /// use aeolus_di::{Container, ComponentDescriptor};
    /// use std::sync::Arc;
    /// use std::sync::atomic::{AtomicUsize, Ordering};
    ///
    /// static CLOSED: AtomicUsize = AtomicUsize::new(0);
    ///
    /// #[derive(Default)]
    /// struct Pool;
    ///
    /// let container = Container::builder()
    ///     .register(
    ///         ComponentDescriptor::builder::<Pool>()
    ///             .default_constructor()
    ///             .pre_destroy("close", |_| { CLOSED.fetch_add(1, Ordering::SeqCst); Ok(()) })
    ///             .build(),
    ///     )
    ///     .build()
    ///     .unwrap();
    ///
    /// container.get::<Pool>().unwrap();
    /// container.shutdown();
    /// container.shutdown();
    /// assert_eq!(CLOSED.load(Ordering::SeqCst), 1);
    /// ```
    pub fn shutdown(&self) {
        self.inner.shutdown();
    }
}

impl Drop for Container {
    fn drop(&mut self) {
        if Arc::strong_count(&self.inner) == 1 {
            if let Some(managed) = self.inner.managed.try_lock() {
                let pending = managed.iter().filter(|m| !m.descriptor.pre_destroy.is_empty()).count();
                if pending > 0 {
                    self.inner.log.warn(format_args!(
                        "Container dropped with {} beans awaiting pre-destroy hooks; call shutdown() first",
                        pending
                    ));
                }
            }
        }
    }
}

impl fmt::Debug for Container {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Container").field("stats", &self.stats()).finish()
    }
}

impl ContainerInner {
    pub(crate) fn new(
        properties: Properties,
        processors: Vec<Arc<dyn BeanProcessor>>,
        log: Arc<dyn Logger>,
    ) -> Arc<Self> {
        Arc::new_cyclic(|this| ContainerInner {
            registry: Registry::new(),
            scopes: ScopeManager::new(),
            properties,
            processors,
            log,
            managed: Mutex::new(Vec::new()),
            this: this.clone(),
        })
    }

    fn resolve_root(&self, target: Key, name: Option<&str>) -> DiResult<AnyArc> {
        let mut stack = ResolutionStack::new();
        self.resolve(target, name, &mut stack)
    }

    /// Resolves an injection point with a fresh stack.
    pub(crate) fn resolve_point(&self, point: &InjectionPoint) -> DiResult<AnyArc> {
        self.resolve_root(point.key, point.name.as_deref())
    }

    fn resolve(&self, target: Key, name: Option<&str>, stack: &mut ResolutionStack) -> DiResult<AnyArc> {
        stack.guarded(target, |stack| self.resolve_guarded(target, name, stack))
    }

    fn resolve_guarded(&self, target: Key, name: Option<&str>, stack: &mut ResolutionStack) -> DiResult<AnyArc> {
        if !target.is_capability() {
            if let Some(descriptor) = self.registry.descriptor(target.type_id()) {
                if descriptor.config.is_some() {
                    return binder::bind(&descriptor, &self.properties);
                }
            }
        }

        if let Some(name) = name {
            match self.registry.lookup_by_name(name) {
                NamedLookup::Instance(bean) => return adapt_named(bean, &target),
                NamedLookup::Descriptor(descriptor) => {
                    let instance = self.instantiate(&descriptor, stack)?;
                    let instance = if descriptor.scope().is_shared() {
                        self.registry
                            .cache_named(
                                name,
                                NamedBean {
                                    value: instance,
                                    origin: Some(descriptor.clone()),
                                },
                            )
                            .value
                    } else {
                        instance
                    };
                    return adapt(&descriptor, instance, &target);
                }
                NamedLookup::Missing => {}
            }
        }

        if let Some(bean) = self.registry.typed_instance(&target) {
            return Ok(bean);
        }

        let descriptor = self.registry.lookup_by_capability(&target)?;
        let instance = self.instantiate(&descriptor, stack)?;
        adapt(&descriptor, instance, &target)
    }

    fn instantiate(&self, descriptor: &Arc<ComponentDescriptor>, stack: &mut ResolutionStack) -> DiResult<AnyArc> {
        stack.component(descriptor.key(), |stack| {
            self.scopes
                .get_or_create(descriptor.scope(), descriptor.key(), || self.construct(descriptor, stack))
        })
    }

    fn create_from(&self, descriptor: &Arc<ComponentDescriptor>) -> DiResult<AnyArc> {
        let mut stack = ResolutionStack::new();
        stack.guarded(descriptor.key(), |stack| self.construct(descriptor, stack))
    }

    fn inject(&self, point: &InjectionPoint, stack: &mut ResolutionStack) -> DiResult<Injected> {
        if point.lazy {
            return Ok(Injected::Deferred(Deferred::new(self.this.clone(), point.clone())));
        }
        Ok(Injected::Resolved(self.resolve(point.key, point.name.as_deref(), stack)?))
    }

    fn inject_all(&self, points: &[InjectionPoint], stack: &mut ResolutionStack) -> DiResult<Vec<Injected>> {
        let mut values = Vec::with_capacity(points.len());
        for point in points {
            values.push(self.inject(point, stack)?);
        }
        Ok(values)
    }

    /// Full instantiation: constructor, fields, setters, resources,
    /// processors and post-construct hooks, then registration in the
    /// managed set.
    fn construct(&self, descriptor: &Arc<ComponentDescriptor>, stack: &mut ResolutionStack) -> DiResult<AnyArc> {
        let type_name = descriptor.type_name();
        let simple = short_name(type_name);

        let constructor = select_constructor(descriptor)?;
        let args = self.inject_all(&constructor.params, stack)?;
        let mut bean = (constructor.create)(&mut ConstructorArgs::new(type_name, args))?;

        for field in &descriptor.fields {
            let value = self.inject(&field.point, stack)?;
            (field.apply)(bean.as_mut(), value)?;
            self.log.trace(format_args!("Injected field {}.{}", simple, field.member));
        }

        for setter in &descriptor.setters {
            let value = self.inject(&setter.point, stack)?;
            (setter.apply)(bean.as_mut(), value)?;
            self.log.trace(format_args!("Injected setter {}.{}()", simple, setter.member));
        }

        for resource in &descriptor.resources {
            let raw = self
                .properties
                .get(&resource.key)
                .ok_or_else(|| DiError::ResourceMissing(resource.key.clone()))?;
            (resource.apply)(bean.as_mut(), raw).map_err(|e| {
                DiError::creation_caused(
                    type_name,
                    format!("cannot inject resource {} as {} into {}", resource.key, resource.kind, resource.member),
                    e,
                )
            })?;
            self.log.trace(format_args!("Injected resource {}.{} = {}", simple, resource.member, resource.key));
        }

        for processor in &self.processors {
            bean = processor.before_initialization(bean, descriptor)?;
        }

        for hook in &descriptor.post_construct {
            match (hook.run)(bean.as_mut()) {
                Ok(()) => self.log.trace(format_args!("PostConstruct executed: {}.{}()", simple, hook.name)),
                Err(e) => self
                    .log
                    .error(format_args!("PostConstruct failed for {}.{}(): {}", simple, hook.name, e)),
            }
        }

        for processor in &self.processors {
            bean = processor.after_initialization(bean, descriptor)?;
        }

        let instance: AnyArc = Arc::from(bean);
        self.managed.lock().push(ManagedBean {
            descriptor: descriptor.clone(),
            instance: instance.clone(),
        });
        self.log.trace(format_args!("Created bean: {}", simple));
        Ok(instance)
    }

    /// Runs every bean method of a configuration component and registers the
    /// results as pre-built instances.
    pub(crate) fn process_configuration(&self, config: &ComponentDescriptor) -> DiResult<()> {
        for method in &config.bean_methods {
            let bean = self.invoke_bean_method(config, method).map_err(|e| {
                DiError::creation_caused(
                    config.type_name(),
                    format!("bean method {}() failed", method.method),
                    Box::new(e),
                )
            })?;
            match &method.name {
                Some(name) => self.registry.register_named_instance(name.clone(), bean),
                None => self.registry.register_typed_instance(method.produces, bean),
            }
            self.log.trace(format_args!(
                "Registered bean {} from {}.{}()",
                method.name.as_deref().unwrap_or_else(|| short_name(method.produces.display_name())),
                short_name(config.type_name()),
                method.method
            ));
        }
        Ok(())
    }

    fn invoke_bean_method(&self, config: &ComponentDescriptor, method: &BeanMethod) -> DiResult<AnyArc> {
        let mut stack = ResolutionStack::new();
        let args = self.inject_all(&method.params, &mut stack)?;
        (method.invoke)(&mut ConstructorArgs::new(config.type_name(), args))
    }

    fn shutdown(&self) {
        let managed = std::mem::take(&mut *self.managed.lock());
        self.log
            .info(format_args!("Container shutting down ({} managed beans)...", managed.len()));

        for bean in managed.iter().rev() {
            let simple = short_name(bean.descriptor.type_name());
            for hook in &bean.descriptor.pre_destroy {
                match (hook.run)(&*bean.instance) {
                    Ok(()) => self.log.trace(format_args!("PreDestroy executed: {}.{}()", simple, hook.name)),
                    Err(e) => self
                        .log
                        .error(format_args!("PreDestroy failed for {}.{}(): {}", simple, hook.name, e)),
                }
            }
        }
        self.scopes.clear_current_thread();
    }

    fn stats(&self) -> ContainerStats {
        let managed = self.managed.lock();
        ContainerStats {
            bindings: self.registry.binding_count(),
            beans: self.registry.typed_instance_count(),
            singletons: self.scopes.singleton_count(),
            thread_local: self.scopes.thread_count(),
            named: self.registry.name_count(),
            managed: managed.len(),
            properties: self.properties.len(),
            processors: self.processors.len(),
            memory_used_bytes: managed.iter().map(|m| std::mem::size_of_val(&*m.instance)).sum(),
        }
    }
}

/// Marked (injection) constructor first, then the zero-argument one.
fn select_constructor(descriptor: &ComponentDescriptor) -> DiResult<&Constructor> {
    descriptor
        .constructors
        .iter()
        .find(|c| c.marked)
        .or_else(|| descriptor.constructors.iter().find(|c| c.params.is_empty()))
        .ok_or_else(|| DiError::creation(descriptor.type_name(), "no valid constructor"))
}

/// Converts a concrete instance of `descriptor` into the form stored for
/// `target`.
fn adapt(descriptor: &ComponentDescriptor, instance: AnyArc, target: &Key) -> DiResult<AnyArc> {
    match target {
        Key::Type(id, _) if *id == descriptor.type_id() => Ok(instance),
        Key::Capability(..) => descriptor
            .upcast(target, instance)
            .ok_or(DiError::TypeMismatch(target.display_name())),
        Key::Type(..) => Err(DiError::TypeMismatch(target.display_name())),
    }
}

fn adapt_named(bean: NamedBean, target: &Key) -> DiResult<AnyArc> {
    match bean.origin {
        Some(descriptor) => adapt(&descriptor, bean.value, target),
        None => Ok(bean.value),
    }
}
