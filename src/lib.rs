//! # aeolus-di
//!
//! Runtime dependency injection driven by explicit component descriptors.
//!
//! ## Features
//!
//! - **Scopes**: singleton, per-thread and prototype instances
//! - **Injection styles**: constructor, field, setter and configuration resources
//! - **Capabilities**: bind trait objects to implementing components
//! - **Aliases**: resolve by name, with named instances shadowing bindings
//! - **Lifecycle**: post-construct and pre-destroy hooks, bean processors
//! - **Lazy handles**: defer a dependency until first use to break cycles
//! - **Configuration**: `.properties` loading and prefix-bound config objects
//! - **Discovery**: prefix-filtered component catalogs with a metadata cache
//! - **Cycle detection**: resolution paths reported in full
//!
//! ## Quick Start
//!
//! ```rust
//! use aeolus_di::{Container, ComponentDescriptor, InjectionPoint};
//! use std::sync::Arc;
//!
//! #[derive(Default)]
//! struct Database {
//!     url: String,
//! }
//!
//! struct UserService {
//!     db: Arc<Database>,
//! }
//!
//! let container = Container::builder()
//!     .property("db.url", "postgres://localhost")
//!     .register(
//!         ComponentDescriptor::builder::<Database>()
//!             .default_constructor()
//!             .resource("url", "db.url", |db: &mut Database, url| db.url = url)
//!             .build(),
//!     )
//!     .register(
//!         ComponentDescriptor::builder::<UserService>()
//!             .inject_constructor(vec![InjectionPoint::of::<Database>()], |args| {
//!                 Ok(UserService { db: args.get::<Database>()? })
//!             })
//!             .build(),
//!     )
//!     .build()
//!     .unwrap();
//!
//! let users = container.get::<UserService>().unwrap();
//! assert_eq!(users.db.url, "postgres://localhost");
//! ```
//!
//! ## Capabilities and aliases
//!
//! ```rust
//! use aeolus_di::{Container, ComponentDescriptor, Inject};
//! use std::sync::Arc;
//!
//! trait Logger: Send + Sync {
//!     fn prefix(&self) -> &'static str;
//! }
//!
//! #[derive(Default)]
//! struct Console;
//! impl Logger for Console {
//!     fn prefix(&self) -> &'static str { "console" }
//! }
//!
//! #[derive(Default)]
//! struct Audit;
//! impl Logger for Audit {
//!     fn prefix(&self) -> &'static str { "audit" }
//! }
//!
//! #[derive(Default)]
//! struct Orders {
//!     log: Option<Arc<dyn Logger>>,
//! }
//!
//! let container = Container::builder()
//!     .register(
//!         ComponentDescriptor::builder::<Audit>()
//!             .named("audit")
//!             .provides::<dyn Logger>(|a| a as Arc<dyn Logger>)
//!             .default_constructor()
//!             .build(),
//!     )
//!     .register(
//!         ComponentDescriptor::builder::<Console>()
//!             .provides::<dyn Logger>(|c| c as Arc<dyn Logger>)
//!             .default_constructor()
//!             .build(),
//!     )
//!     .register(
//!         ComponentDescriptor::builder::<Orders>()
//!             .default_constructor()
//!             .field("log", Inject::<dyn Logger>::capability().named("audit"), |o, log| o.log = Some(log))
//!             .build(),
//!     )
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(container.get_capability::<dyn Logger>().unwrap().prefix(), "console");
//! let orders = container.get::<Orders>().unwrap();
//! assert_eq!(orders.log.as_ref().unwrap().prefix(), "audit");
//! ```
//!
//! ## Scopes
//!
//! - **Singleton** (default): one instance per container
//! - **Thread**: one instance per container per calling thread
//! - **Prototype**: a new instance for every resolution
//!
//! See [`Scope`] for an example.

pub mod binder;
pub mod builder;
pub mod container;
pub mod descriptor;
pub mod discovery;
pub mod error;
pub mod key;
pub mod lazy;
pub mod logging;
pub mod processor;
pub mod properties;
pub mod scope;
pub mod stats;

mod registry;
mod resolution;
mod scope_manager;

pub use binder::bind;
pub use builder::ContainerBuilder;
pub use container::Container;
pub use descriptor::{
    AnyArc, BeanMethod, BoxedBean, ComponentDescriptor, ConstructorArgs, DescriptorBuilder, HookResult, Inject,
    InjectionPoint,
};
pub use discovery::{
    matches_prefixes, CacheError, ComponentCatalog, ComponentDiscovery, FileMetadataCache, InMemoryMetadataCache,
    MetadataCache, DEFAULT_CACHE_FILE,
};
pub use error::{BoxError, DiError, DiResult};
pub use key::Key;
pub use lazy::Lazy;
pub use logging::{LogLevel, Logger, TracingLogger};
pub use processor::BeanProcessor;
pub use properties::{coerce, CoercionError, ConfigValue, Properties, Property, ValueKind};
pub use scope::{Scope, UnknownScope};
pub use stats::ContainerStats;
