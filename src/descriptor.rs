//! Component descriptors: the explicit metadata the container builds from.
//!
//! A [`ComponentDescriptor`] states everything the container needs to know
//! about an injectable type: its identity, the capabilities it satisfies, its
//! scope and alias, how it is constructed, which fields and setters receive
//! dependencies, which configuration keys it reads, and which lifecycle hooks
//! run around it. Descriptors are assembled with the typed
//! [`DescriptorBuilder`] and then type-erased, so the engine itself never
//! touches live type metadata.

use std::any::{Any, TypeId};
use std::fmt;
use std::sync::Arc;

use crate::error::{BoxError, DiError, DiResult};
use crate::key::Key;
use crate::lazy::{Deferred, Lazy};
use crate::properties::{convert, Property, ValueKind};
use crate::scope::Scope;

/// Type-erased shared instance, as stored in scope caches and binding tables.
pub type AnyArc = Arc<dyn Any + Send + Sync>;

/// Type-erased owned instance, as passed through bean processors.
pub type BoxedBean = Box<dyn Any + Send + Sync>;

/// Outcome of a lifecycle hook.
pub type HookResult = Result<(), BoxError>;

type CtorFn = Arc<dyn Fn(&mut ConstructorArgs) -> DiResult<BoxedBean> + Send + Sync>;
type InjectFn = Arc<dyn Fn(&mut (dyn Any + Send + Sync), Injected) -> DiResult<()> + Send + Sync>;
type AssignFn = Arc<dyn Fn(&mut (dyn Any + Send + Sync), &str) -> Result<(), BoxError> + Send + Sync>;
type InitFn = Arc<dyn Fn(&mut (dyn Any + Send + Sync)) -> HookResult + Send + Sync>;
type DestroyFn = Arc<dyn Fn(&(dyn Any + Send + Sync)) -> HookResult + Send + Sync>;
type UpcastFn = Arc<dyn Fn(AnyArc) -> Option<AnyArc> + Send + Sync>;
type BeanFn = Arc<dyn Fn(&mut ConstructorArgs) -> DiResult<AnyArc> + Send + Sync>;

/// A declared dependency: what is injected, under which alias, and whether
/// resolution is deferred until first use.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InjectionPoint {
    pub key: Key,
    pub name: Option<String>,
    pub lazy: bool,
}

impl InjectionPoint {
    /// Dependency on a concrete component type.
    pub fn of<T: Send + Sync + 'static>() -> Self {
        Self {
            key: Key::of::<T>(),
            name: None,
            lazy: false,
        }
    }

    /// Dependency on a capability, usually `dyn Trait`.
    pub fn capability<I: ?Sized + Send + Sync + 'static>() -> Self {
        Self {
            key: Key::capability::<I>(),
            name: None,
            lazy: false,
        }
    }

    /// Resolve through the given alias first.
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Defer resolution: the consumer receives a [`Lazy`] handle.
    pub fn lazy(mut self) -> Self {
        self.lazy = true;
        self
    }
}

/// Typed dependency declaration used for field and setter injection.
///
/// `Inject::<Repo>::of()` asks for a concrete component,
/// `Inject::<dyn Greeter>::capability()` for a capability.
pub struct Inject<D: ?Sized> {
    point: InjectionPoint,
    extract: fn(AnyArc) -> DiResult<Arc<D>>,
}

impl<D: Send + Sync + 'static> Inject<D> {
    pub fn of() -> Self {
        Self {
            point: InjectionPoint::of::<D>(),
            extract: extract_type::<D>,
        }
    }
}

impl<D: ?Sized + Send + Sync + 'static> Inject<D> {
    pub fn capability() -> Self {
        Self {
            point: InjectionPoint::capability::<D>(),
            extract: extract_capability::<D>,
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.point = self.point.named(name);
        self
    }

    pub fn point(&self) -> &InjectionPoint {
        &self.point
    }
}

impl<D: ?Sized> From<Inject<D>> for InjectionPoint {
    fn from(inject: Inject<D>) -> Self {
        inject.point
    }
}

pub(crate) fn extract_type<T: Send + Sync + 'static>(any: AnyArc) -> DiResult<Arc<T>> {
    any.downcast::<T>()
        .map_err(|_| DiError::TypeMismatch(std::any::type_name::<T>()))
}

// Capabilities are stored as Arc<Arc<dyn Trait>>
pub(crate) fn extract_capability<I: ?Sized + Send + Sync + 'static>(any: AnyArc) -> DiResult<Arc<I>> {
    any.downcast::<Arc<I>>()
        .map(|boxed| (*boxed).clone())
        .map_err(|_| DiError::TypeMismatch(std::any::type_name::<I>()))
}

fn downcast_bean<T: 'static>(bean: &mut (dyn Any + Send + Sync)) -> DiResult<&mut T> {
    bean.downcast_mut::<T>()
        .ok_or(DiError::TypeMismatch(std::any::type_name::<T>()))
}

/// Value handed to a constructor parameter or injection slot.
pub(crate) enum Injected {
    Resolved(AnyArc),
    Deferred(Deferred),
}

impl Injected {
    pub(crate) fn into_resolved(self) -> DiResult<AnyArc> {
        match self {
            Injected::Resolved(any) => Ok(any),
            Injected::Deferred(deferred) => deferred.resolve(),
        }
    }
}

/// Resolved constructor arguments, consumed in declaration order.
///
/// # Examples
///
/// ```
/// use aeolus_di::{Container, ComponentDescriptor, InjectionPoint};
/// use std::sync::Arc;
///
/// #[derive(Default)]
/// struct Repo;
/// struct Service { repo: Arc<Repo> }
///
/// let container = Container::builder()
///     .register(ComponentDescriptor::builder::<Repo>().default_constructor().build())
///     .register(
///         ComponentDescriptor::builder::<Service>()
///             .inject_constructor(vec![InjectionPoint::of::<Repo>()], |args| {
///                 Ok(Service { repo: args.get::<Repo>()? })
///             })
///             .build(),
///     )
///     .build()
///     .unwrap();
///
/// let service = container.get::<Service>().unwrap();
/// assert!(Arc::ptr_eq(&service.repo, &container.get::<Repo>().unwrap()));
/// ```
pub struct ConstructorArgs {
    owner: &'static str,
    values: std::vec::IntoIter<Injected>,
    position: usize,
}

impl ConstructorArgs {
    pub(crate) fn new(owner: &'static str, values: Vec<Injected>) -> Self {
        Self {
            owner,
            values: values.into_iter(),
            position: 0,
        }
    }

    fn next_value(&mut self) -> DiResult<Injected> {
        self.position += 1;
        match self.values.next() {
            Some(value) => Ok(value),
            None => Err(DiError::creation(
                self.owner,
                format!("constructor argument {} was not declared", self.position),
            )),
        }
    }

    /// Next argument as a concrete component.
    pub fn get<T: Send + Sync + 'static>(&mut self) -> DiResult<Arc<T>> {
        extract_type::<T>(self.next_value()?.into_resolved()?)
    }

    /// Next argument as a capability.
    pub fn capability<I: ?Sized + Send + Sync + 'static>(&mut self) -> DiResult<Arc<I>> {
        extract_capability::<I>(self.next_value()?.into_resolved()?)
    }

    /// Next argument as a deferred concrete component.
    pub fn lazy<T: Send + Sync + 'static>(&mut self) -> DiResult<Lazy<T>> {
        Lazy::from_injected(self.next_value()?, extract_type::<T>)
    }

    /// Next argument as a deferred capability.
    pub fn lazy_capability<I: ?Sized + Send + Sync + 'static>(&mut self) -> DiResult<Lazy<I>> {
        Lazy::from_injected(self.next_value()?, extract_capability::<I>)
    }

    /// Arguments not consumed yet.
    pub fn remaining(&self) -> usize {
        self.values.len()
    }
}

#[derive(Clone)]
pub(crate) struct Constructor {
    pub(crate) params: Vec<InjectionPoint>,
    pub(crate) marked: bool,
    pub(crate) create: CtorFn,
}

#[derive(Clone)]
pub(crate) struct MemberInjection {
    pub(crate) member: String,
    pub(crate) point: InjectionPoint,
    pub(crate) apply: InjectFn,
}

#[derive(Clone)]
pub(crate) struct ResourceInjection {
    pub(crate) member: String,
    pub(crate) key: String,
    pub(crate) kind: ValueKind,
    pub(crate) apply: AssignFn,
}

#[derive(Clone)]
pub(crate) struct ConfigField {
    pub(crate) name: String,
    pub(crate) kind: ValueKind,
    pub(crate) assign: AssignFn,
}

#[derive(Clone)]
pub(crate) struct ConfigBinding {
    pub(crate) prefix: String,
    pub(crate) fields: Vec<ConfigField>,
}

#[derive(Clone)]
pub(crate) struct InitHook {
    pub(crate) name: String,
    pub(crate) run: InitFn,
}

#[derive(Clone)]
pub(crate) struct DestroyHook {
    pub(crate) name: String,
    pub(crate) run: DestroyFn,
}

#[derive(Clone)]
pub(crate) struct CapabilityBinding {
    pub(crate) key: Key,
    pub(crate) upcast: UpcastFn,
}

/// Factory method of a configuration component.
///
/// The produced bean is registered as a pre-built instance: under its alias
/// when named, otherwise under the key it produces.
///
/// # Examples
///
/// ```
/// use aeolus_di::{BeanMethod, Container, ComponentDescriptor, InjectionPoint};
/// use std::sync::Arc;
///
/// trait Clock: Send + Sync { fn now(&self) -> u64; }
/// struct Fixed(u64);
/// impl Clock for Fixed { fn now(&self) -> u64 { self.0 } }
///
/// struct AppConfig;
///
/// let container = Container::builder()
///     .register(
///         ComponentDescriptor::configuration::<AppConfig>()
///             .bean(BeanMethod::capability::<dyn Clock>("clock", vec![], |_| {
///                 Ok(Arc::new(Fixed(7)) as Arc<dyn Clock>)
///             }))
///             .bean(BeanMethod::of::<String>("greeting", vec![], |_| Ok("hi".to_string())).named("greeting"))
///             .build(),
///     )
///     .build()
///     .unwrap();
///
/// assert_eq!(container.get_capability::<dyn Clock>().unwrap().now(), 7);
/// assert_eq!(*container.get_named::<String>("greeting").unwrap(), "hi");
/// ```
#[derive(Clone)]
pub struct BeanMethod {
    pub(crate) method: String,
    pub(crate) produces: Key,
    pub(crate) name: Option<String>,
    pub(crate) params: Vec<InjectionPoint>,
    pub(crate) invoke: BeanFn,
}

impl BeanMethod {
    /// Factory producing a concrete value.
    pub fn of<T: Send + Sync + 'static>(
        method: impl Into<String>,
        params: Vec<InjectionPoint>,
        factory: impl Fn(&mut ConstructorArgs) -> DiResult<T> + Send + Sync + 'static,
    ) -> Self {
        Self {
            method: method.into(),
            produces: Key::of::<T>(),
            name: None,
            params,
            invoke: Arc::new(move |args| Ok(Arc::new(factory(args)?) as AnyArc)),
        }
    }

    /// Factory producing a capability implementation.
    pub fn capability<I: ?Sized + Send + Sync + 'static>(
        method: impl Into<String>,
        params: Vec<InjectionPoint>,
        factory: impl Fn(&mut ConstructorArgs) -> DiResult<Arc<I>> + Send + Sync + 'static,
    ) -> Self {
        Self {
            method: method.into(),
            produces: Key::capability::<I>(),
            name: None,
            params,
            invoke: Arc::new(move |args| Ok(Arc::new(factory(args)?) as AnyArc)),
        }
    }

    /// Register the produced bean under an alias instead of its key.
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn produces(&self) -> Key {
        self.produces
    }
}

/// Metadata for an injectable type.
///
/// Immutable once built; the container shares it behind an `Arc` for its whole
/// lifetime.
///
/// # Examples
///
/// ```
/// use aeolus_di::{Container, ComponentDescriptor, Inject, Scope};
/// use std::sync::Arc;
///
/// trait Greeter: Send + Sync { fn greet(&self) -> String; }
///
/// #[derive(Default)]
/// struct Repo;
///
/// #[derive(Default)]
/// struct HelloService { repo: Option<Arc<Repo>>, ready: bool }
///
/// impl Greeter for HelloService {
///     fn greet(&self) -> String { format!("hello (ready={})", self.ready) }
/// }
///
/// let descriptor = ComponentDescriptor::builder::<HelloService>()
///     .scope(Scope::Singleton)
///     .named("hello")
///     .provides::<dyn Greeter>(|svc| svc as Arc<dyn Greeter>)
///     .default_constructor()
///     .field("repo", Inject::<Repo>::of(), |svc, repo| svc.repo = Some(repo))
///     .post_construct("init", |svc| { svc.ready = true; Ok(()) })
///     .build();
///
/// assert_eq!(descriptor.name(), Some("hello"));
/// assert_eq!(descriptor.dependencies().count(), 1);
///
/// let container = Container::builder()
///     .register(ComponentDescriptor::builder::<Repo>().default_constructor().build())
///     .register(descriptor)
///     .build()
///     .unwrap();
///
/// let greeter = container.get_capability::<dyn Greeter>().unwrap();
/// assert_eq!(greeter.greet(), "hello (ready=true)");
/// ```
#[derive(Clone)]
pub struct ComponentDescriptor {
    pub(crate) key: Key,
    pub(crate) scope: Scope,
    pub(crate) name: Option<String>,
    pub(crate) capabilities: Vec<CapabilityBinding>,
    pub(crate) constructors: Vec<Constructor>,
    pub(crate) fields: Vec<MemberInjection>,
    pub(crate) setters: Vec<MemberInjection>,
    pub(crate) resources: Vec<ResourceInjection>,
    pub(crate) post_construct: Vec<InitHook>,
    pub(crate) pre_destroy: Vec<DestroyHook>,
    pub(crate) config: Option<ConfigBinding>,
    pub(crate) bean_methods: Vec<BeanMethod>,
    pub(crate) configuration: bool,
}

impl ComponentDescriptor {
    /// Starts a descriptor for component type `T`.
    pub fn builder<T: Send + Sync + 'static>() -> DescriptorBuilder<T> {
        DescriptorBuilder::new()
    }

    /// Starts a configuration descriptor whose [`BeanMethod`]s produce
    /// pre-built beans when the container is built.
    pub fn configuration<T: Send + Sync + 'static>() -> DescriptorBuilder<T> {
        let mut builder = DescriptorBuilder::new();
        builder.descriptor.configuration = true;
        builder
    }

    /// Starts a descriptor for a plain data holder filled from configuration
    /// keys under `prefix`.
    pub fn config_binding<T: Default + Send + Sync + 'static>(prefix: impl Into<String>) -> DescriptorBuilder<T> {
        let mut builder = DescriptorBuilder::new().default_constructor();
        builder.descriptor.config = Some(ConfigBinding {
            prefix: prefix.into(),
            fields: Vec::new(),
        });
        builder
    }

    pub fn key(&self) -> Key {
        self.key
    }

    /// Canonical type name.
    pub fn type_name(&self) -> &'static str {
        self.key.display_name()
    }

    pub fn type_id(&self) -> TypeId {
        self.key.type_id()
    }

    pub fn scope(&self) -> Scope {
        self.scope
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Capability keys this component satisfies.
    pub fn capabilities(&self) -> impl Iterator<Item = Key> + '_ {
        self.capabilities.iter().map(|c| c.key)
    }

    /// Every declared dependency: constructor parameters, then fields, then setters.
    pub fn dependencies(&self) -> impl Iterator<Item = &InjectionPoint> + '_ {
        self.constructors
            .iter()
            .flat_map(|c| c.params.iter())
            .chain(self.fields.iter().map(|f| &f.point))
            .chain(self.setters.iter().map(|s| &s.point))
    }

    /// Configuration keys read through resource injection.
    pub fn resource_keys(&self) -> impl Iterator<Item = &str> + '_ {
        self.resources.iter().map(|r| r.key.as_str())
    }

    pub fn config_prefix(&self) -> Option<&str> {
        self.config.as_ref().map(|c| c.prefix.as_str())
    }

    pub fn is_configuration(&self) -> bool {
        self.configuration
    }

    pub fn bean_methods(&self) -> &[BeanMethod] {
        &self.bean_methods
    }

    pub fn post_construct_hooks(&self) -> impl Iterator<Item = &str> + '_ {
        self.post_construct.iter().map(|h| h.name.as_str())
    }

    pub fn pre_destroy_hooks(&self) -> impl Iterator<Item = &str> + '_ {
        self.pre_destroy.iter().map(|h| h.name.as_str())
    }

    /// Converts a concrete instance of this component into the form stored
    /// for `capability`.
    pub(crate) fn upcast(&self, capability: &Key, instance: AnyArc) -> Option<AnyArc> {
        self.capabilities
            .iter()
            .find(|c| &c.key == capability)
            .and_then(|c| (c.upcast)(instance))
    }
}

impl fmt::Debug for ComponentDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentDescriptor")
            .field("type", &self.type_name())
            .field("scope", &self.scope)
            .field("name", &self.name)
            .field("capabilities", &self.capabilities().map(|k| k.display_name()).collect::<Vec<_>>())
            .field("dependencies", &self.dependencies().count())
            .field("resources", &self.resource_keys().collect::<Vec<_>>())
            .field("config_prefix", &self.config_prefix())
            .field("configuration", &self.configuration)
            .finish()
    }
}

/// Typed builder for [`ComponentDescriptor`].
pub struct DescriptorBuilder<T> {
    descriptor: ComponentDescriptor,
    _marker: std::marker::PhantomData<fn() -> T>,
}

impl<T: Send + Sync + 'static> DescriptorBuilder<T> {
    fn new() -> Self {
        Self {
            descriptor: ComponentDescriptor {
                key: Key::of::<T>(),
                scope: Scope::default(),
                name: None,
                capabilities: Vec::new(),
                constructors: Vec::new(),
                fields: Vec::new(),
                setters: Vec::new(),
                resources: Vec::new(),
                post_construct: Vec::new(),
                pre_destroy: Vec::new(),
                config: None,
                bean_methods: Vec::new(),
                configuration: false,
            },
            _marker: std::marker::PhantomData,
        }
    }

    pub fn scope(mut self, scope: Scope) -> Self {
        self.descriptor.scope = scope;
        self
    }

    /// Alias under which the component can be looked up by name.
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.descriptor.name = Some(name.into());
        self
    }

    /// Declares that the component satisfies capability `I`.
    pub fn provides<I: ?Sized + Send + Sync + 'static>(
        mut self,
        upcast: impl Fn(Arc<T>) -> Arc<I> + Send + Sync + 'static,
    ) -> Self {
        let key = Key::capability::<I>();
        self.descriptor.capabilities.retain(|c| c.key != key);
        let erased: UpcastFn = Arc::new(move |any: AnyArc| {
            any.downcast::<T>()
                .ok()
                .map(|concrete| Arc::new(upcast(concrete)) as AnyArc)
        });
        self.descriptor.capabilities.push(CapabilityBinding { key, upcast: erased });
        self
    }

    /// Zero-argument constructor.
    pub fn constructor(mut self, create: impl Fn() -> T + Send + Sync + 'static) -> Self {
        self.descriptor.constructors.push(Constructor {
            params: Vec::new(),
            marked: false,
            create: Arc::new(move |_| Ok(Box::new(create()) as BoxedBean)),
        });
        self
    }

    /// Zero-argument constructor through `Default`.
    pub fn default_constructor(self) -> Self
    where
        T: Default,
    {
        self.constructor(T::default)
    }

    /// Constructor marked for injection; its parameters are resolved
    /// recursively and handed over in declaration order.
    pub fn inject_constructor(
        mut self,
        params: Vec<InjectionPoint>,
        create: impl Fn(&mut ConstructorArgs) -> DiResult<T> + Send + Sync + 'static,
    ) -> Self {
        self.descriptor.constructors.push(Constructor {
            params,
            marked: true,
            create: Arc::new(move |args| Ok(Box::new(create(args)?) as BoxedBean)),
        });
        self
    }

    /// Field injection point, filled right after construction.
    pub fn field<D: ?Sized + Send + Sync + 'static>(
        mut self,
        member: impl Into<String>,
        inject: Inject<D>,
        assign: impl Fn(&mut T, Arc<D>) + Send + Sync + 'static,
    ) -> Self {
        let injection = member_injection::<T, D, _>(member.into(), inject, false, move |bean, injected, extract| {
            assign(bean, extract(injected.into_resolved()?)?);
            Ok(())
        });
        self.descriptor.fields.push(injection);
        self
    }

    /// Field receiving a [`Lazy`] handle instead of a resolved dependency.
    pub fn lazy_field<D: ?Sized + Send + Sync + 'static>(
        mut self,
        member: impl Into<String>,
        inject: Inject<D>,
        assign: impl Fn(&mut T, Lazy<D>) + Send + Sync + 'static,
    ) -> Self {
        let injection = member_injection::<T, D, _>(member.into(), inject, true, move |bean, injected, extract| {
            assign(bean, Lazy::from_injected(injected, extract)?);
            Ok(())
        });
        self.descriptor.fields.push(injection);
        self
    }

    /// Setter injection point, invoked after every field is filled.
    pub fn setter<D: ?Sized + Send + Sync + 'static>(
        mut self,
        method: impl Into<String>,
        inject: Inject<D>,
        call: impl Fn(&mut T, Arc<D>) + Send + Sync + 'static,
    ) -> Self {
        let injection = member_injection::<T, D, _>(method.into(), inject, false, move |bean, injected, extract| {
            call(bean, extract(injected.into_resolved()?)?);
            Ok(())
        });
        self.descriptor.setters.push(injection);
        self
    }

    /// Resource injection: the value of configuration key `key`, coerced to
    /// `P`. A missing key fails resolution.
    pub fn resource<P: Property>(
        mut self,
        member: impl Into<String>,
        key: impl Into<String>,
        assign: impl Fn(&mut T, P) + Send + Sync + 'static,
    ) -> Self {
        self.descriptor.resources.push(ResourceInjection {
            member: member.into(),
            key: key.into(),
            kind: P::KIND,
            apply: typed_assign(assign),
        });
        self
    }

    /// Configurable field of a [`config_binding`](ComponentDescriptor::config_binding)
    /// component, read from `prefix.field`.
    ///
    /// Only meaningful after `config_binding`: on any other builder the fields
    /// have no prefix and resolving the component fails with
    /// [`DiError::Binding`](crate::DiError::Binding).
    pub fn property<P: Property>(
        mut self,
        field: impl Into<String>,
        assign: impl Fn(&mut T, P) + Send + Sync + 'static,
    ) -> Self {
        let field = ConfigField {
            name: field.into(),
            kind: P::KIND,
            assign: typed_assign(assign),
        };
        self.descriptor
            .config
            .get_or_insert_with(|| ConfigBinding {
                prefix: String::new(),
                fields: Vec::new(),
            })
            .fields
            .push(field);
        self
    }

    /// Post-construct hook. Failures are logged and do not abort construction.
    pub fn post_construct(
        mut self,
        name: impl Into<String>,
        hook: impl Fn(&mut T) -> HookResult + Send + Sync + 'static,
    ) -> Self {
        self.descriptor.post_construct.push(InitHook {
            name: name.into(),
            run: Arc::new(move |bean| hook(downcast_bean::<T>(bean)?)),
        });
        self
    }

    /// Pre-destroy hook run on container shutdown.
    pub fn pre_destroy(
        mut self,
        name: impl Into<String>,
        hook: impl Fn(&T) -> HookResult + Send + Sync + 'static,
    ) -> Self {
        self.descriptor.pre_destroy.push(DestroyHook {
            name: name.into(),
            run: Arc::new(move |bean| match bean.downcast_ref::<T>() {
                Some(bean) => hook(bean),
                None => Err(DiError::TypeMismatch(std::any::type_name::<T>()).into()),
            }),
        });
        self
    }

    /// Factory method of a configuration component.
    pub fn bean(mut self, method: BeanMethod) -> Self {
        self.descriptor.configuration = true;
        self.descriptor.bean_methods.push(method);
        self
    }

    pub fn build(self) -> ComponentDescriptor {
        self.descriptor
    }
}

fn member_injection<T, D, F>(member: String, inject: Inject<D>, lazy: bool, apply: F) -> MemberInjection
where
    T: Send + Sync + 'static,
    D: ?Sized + Send + Sync + 'static,
    F: Fn(&mut T, Injected, fn(AnyArc) -> DiResult<Arc<D>>) -> DiResult<()> + Send + Sync + 'static,
{
    let Inject { mut point, extract } = inject;
    point.lazy = lazy;
    MemberInjection {
        member,
        point,
        apply: Arc::new(move |bean, injected| apply(downcast_bean::<T>(bean)?, injected, extract)),
    }
}

fn typed_assign<T, P>(assign: impl Fn(&mut T, P) + Send + Sync + 'static) -> AssignFn
where
    T: Send + Sync + 'static,
    P: Property,
{
    Arc::new(move |bean, raw| {
        let value = convert::<P>(raw)?;
        let bean = downcast_bean::<T>(bean)?;
        assign(bean, value);
        Ok(())
    })
}
