//! Fluent construction of a [`Container`].

use std::path::Path;
use std::sync::Arc;

use crate::container::{Container, ContainerInner};
use crate::descriptor::{AnyArc, ComponentDescriptor};
use crate::discovery::{ComponentDiscovery, MetadataCache};
use crate::error::DiResult;
use crate::key::Key;
use crate::logging::{short_name, Logger, TracingLogger};
use crate::processor::BeanProcessor;
use crate::properties::Properties;

/// A registration, applied in call order when the container is built.
enum Step {
    Scan(Vec<String>),
    Component(ComponentDescriptor),
    Bind(Key, ComponentDescriptor),
    Named(String, ComponentDescriptor),
    Instance(Key, AnyArc),
    NamedInstance(String, AnyArc),
}

/// Builder for [`Container`].
///
/// Registrations are applied in the order they were made, so a later
/// registration for the same key or alias replaces an earlier one. Components
/// found by [`scan`](Self::scan) are applied at the position of the `scan`
/// call, sorted by type name.
///
/// # Examples
///
/// ```
/// use aeolus_di::{Container, ComponentDescriptor, Scope};
///
/// #[derive(Default)]
/// struct Clock;
///
/// let container = Container::builder()
///     .property("app.mode", "test")
///     .register(ComponentDescriptor::builder::<Clock>().scope(Scope::Thread).default_constructor().build())
///     .instance(String::from("prebuilt"))
///     .build()
///     .unwrap();
///
/// assert_eq!(*container.get::<String>().unwrap(), "prebuilt");
/// assert_eq!(container.properties().get("app.mode"), Some("test"));
/// ```
pub struct ContainerBuilder {
    steps: Vec<Step>,
    properties: Properties,
    processors: Vec<Arc<dyn BeanProcessor>>,
    log: Arc<dyn Logger>,
    discovery: Option<Arc<dyn ComponentDiscovery>>,
    cache: Option<Arc<dyn MetadataCache>>,
}

impl Default for ContainerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ContainerBuilder {
    pub fn new() -> Self {
        Self {
            steps: Vec::new(),
            properties: Properties::new(),
            processors: Vec::new(),
            log: Arc::new(TracingLogger::new()),
            discovery: None,
            cache: None,
        }
    }

    /// Replaces the default [`TracingLogger`].
    pub fn logger(mut self, logger: Arc<dyn Logger>) -> Self {
        self.log = logger;
        self
    }

    /// Discovery used by [`scan`](Self::scan).
    pub fn discovery(mut self, discovery: Arc<dyn ComponentDiscovery>) -> Self {
        self.discovery = Some(discovery);
        self
    }

    /// Cache consulted when a scan discovers nothing.
    pub fn metadata_cache(mut self, cache: Arc<dyn MetadataCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Registers every component discovery finds under `prefixes`.
    ///
    /// A non-empty result is saved to the metadata cache; an empty one falls
    /// back to whatever the cache recorded last.
    pub fn scan<S: AsRef<str>>(mut self, prefixes: &[S]) -> Self {
        let prefixes = prefixes.iter().map(|p| p.as_ref().to_string()).collect();
        self.steps.push(Step::Scan(prefixes));
        self
    }

    /// Registers a component under its own type, its capabilities and its
    /// alias. Configuration components have their bean methods run at build.
    pub fn register(mut self, descriptor: ComponentDescriptor) -> Self {
        self.steps.push(Step::Component(descriptor));
        self
    }

    pub fn register_all(mut self, descriptors: impl IntoIterator<Item = ComponentDescriptor>) -> Self {
        self.steps.extend(descriptors.into_iter().map(Step::Component));
        self
    }

    /// Binds capability `I` to a component, whatever the component declares.
    pub fn bind<I: ?Sized + Send + Sync + 'static>(mut self, descriptor: ComponentDescriptor) -> Self {
        self.steps.push(Step::Bind(Key::capability::<I>(), descriptor));
        self
    }

    /// Binds an alias to a component.
    pub fn bind_named(mut self, name: impl Into<String>, descriptor: ComponentDescriptor) -> Self {
        self.steps.push(Step::Named(name.into(), descriptor));
        self
    }

    /// Registers a pre-built instance under its own type.
    pub fn instance<T: Send + Sync + 'static>(mut self, value: T) -> Self {
        self.steps.push(Step::Instance(Key::of::<T>(), Arc::new(value)));
        self
    }

    /// Registers a pre-built capability implementation.
    pub fn capability_instance<I: ?Sized + Send + Sync + 'static>(mut self, value: Arc<I>) -> Self {
        self.steps.push(Step::Instance(Key::capability::<I>(), Arc::new(value)));
        self
    }

    /// Registers a pre-built instance under an alias.
    pub fn named_instance<T: Send + Sync + 'static>(mut self, name: impl Into<String>, value: T) -> Self {
        self.steps.push(Step::NamedInstance(name.into(), Arc::new(value)));
        self
    }

    /// Merges entries into the configuration; later entries win.
    pub fn properties(mut self, properties: Properties) -> Self {
        self.properties.merge(properties);
        self
    }

    pub fn property(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.insert(key, value);
        self
    }

    /// Merges a `.properties` file into the configuration. A missing or
    /// unreadable file is logged and skipped.
    pub fn load_properties(mut self, path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match Properties::load(path) {
            Ok(loaded) => {
                self.log.info(format_args!(
                    "Loaded properties: {} ({} entries)",
                    path.display(),
                    loaded.len()
                ));
                self.properties.merge(loaded);
            }
            Err(e) => {
                self.log
                    .warn(format_args!("No properties file found: {} ({})", path.display(), e));
            }
        }
        self
    }

    /// Appends a processor; processors run in the order they were added.
    pub fn add_processor(mut self, processor: Arc<dyn BeanProcessor>) -> Self {
        self.log
            .info(format_args!("Registered BeanProcessor: {}", processor.name()));
        self.processors.push(processor);
        self
    }

    /// Applies every registration, runs configuration bean methods, and
    /// returns the finished container.
    ///
    /// Fails if a bean method fails; the error names the configuration
    /// component and wraps the cause.
    pub fn build(self) -> DiResult<Container> {
        let ContainerBuilder {
            steps,
            properties,
            processors,
            log,
            discovery,
            cache,
        } = self;
        let inner = ContainerInner::new(properties, processors, log.clone());
        let scanner = Scanner {
            discovery: discovery.as_deref(),
            cache: cache.as_deref(),
            log: log.as_ref(),
        };

        let mut configurations = Vec::new();
        for step in steps {
            match step {
                Step::Scan(prefixes) => {
                    for descriptor in scanner.scan(&prefixes) {
                        register_component(&inner, descriptor, &mut configurations, log.as_ref());
                    }
                }
                Step::Component(descriptor) => {
                    register_component(&inner, descriptor, &mut configurations, log.as_ref());
                }
                Step::Bind(key, descriptor) => {
                    log.trace(format_args!("Bound {} to {}", key, short_name(descriptor.type_name())));
                    inner.registry.register_type(key, Arc::new(descriptor));
                }
                Step::Named(name, descriptor) => {
                    log.trace(format_args!("Bound '{}' to {}", name, short_name(descriptor.type_name())));
                    inner.registry.register_named(name, Arc::new(descriptor));
                }
                Step::Instance(key, value) => inner.registry.register_typed_instance(key, value),
                Step::NamedInstance(name, value) => inner.registry.register_named_instance(name, value),
            }
        }

        for configuration in &configurations {
            inner.process_configuration(configuration)?;
        }

        log.info(format_args!(
            "Container initialized with {} bindings, {} named beans",
            inner.registry.binding_count(),
            inner.registry.name_count()
        ));
        Ok(Container::from_inner(inner))
    }
}

fn register_component(
    inner: &ContainerInner,
    descriptor: ComponentDescriptor,
    configurations: &mut Vec<ComponentDescriptor>,
    log: &dyn Logger,
) {
    if descriptor.is_configuration() {
        log.trace(format_args!("Registered configuration: {}", short_name(descriptor.type_name())));
        configurations.push(descriptor);
        return;
    }
    log.trace(format_args!(
        "Registered component: {} ({})",
        short_name(descriptor.type_name()),
        descriptor.scope()
    ));
    inner.registry.register_component(Arc::new(descriptor));
}

struct Scanner<'a> {
    discovery: Option<&'a dyn ComponentDiscovery>,
    cache: Option<&'a dyn MetadataCache>,
    log: &'a dyn Logger,
}

impl Scanner<'_> {
    fn scan(&self, prefixes: &[String]) -> Vec<ComponentDescriptor> {
        let filters: Vec<&str> = prefixes.iter().map(String::as_str).collect();

        let mut found = match self.discovery {
            Some(discovery) => discovery.discover(&filters),
            None => {
                self.log
                    .warn(format_args!("No component discovery configured for {:?}", filters));
                Vec::new()
            }
        };
        found.sort_by(|a, b| a.type_name().cmp(b.type_name()));

        if !found.is_empty() {
            if let Some(cache) = self.cache {
                if let Err(e) = cache.save(&found) {
                    self.log.warn(format_args!("Failed to save component cache: {}", e));
                }
            }
            self.log
                .info(format_args!("Scanned packages {:?} -> {} components", filters, found.len()));
            return found;
        }

        let cached = match self.cache.map(|cache| cache.load(&filters)) {
            Some(Ok(cached)) => cached,
            Some(Err(e)) => {
                self.log.warn(format_args!("Failed to load component cache: {}", e));
                Vec::new()
            }
            None => Vec::new(),
        };
        if cached.is_empty() {
            self.log
                .warn(format_args!("No components discovered for {:?}", filters));
        } else {
            self.log
                .info(format_args!("Loaded {} components from cache", cached.len()));
        }
        cached
    }
}
