//! Error types for the dependency injection container.

use std::sync::Arc;

/// Boxed error carried as the cause of creation and binding failures.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Shared error source, kept behind an `Arc` so `DiError` stays `Clone`.
pub type SharedError = Arc<dyn std::error::Error + Send + Sync + 'static>;

/// Dependency injection errors
///
/// Represents the failure conditions of resolution, instantiation and
/// configuration binding. All of them propagate unmodified to the caller of
/// the top-level `get`/`create` call; only lifecycle hook failures are
/// swallowed (and logged) by the container.
///
/// # Examples
///
/// ```rust
/// use aeolus_di::{Container, DiError};
///
/// struct Unregistered;
///
/// let container = Container::builder().build().unwrap();
/// match container.get::<Unregistered>() {
///     Err(DiError::NotFound(type_name)) => assert!(type_name.contains("Unregistered")),
///     _ => unreachable!(),
/// }
/// ```
///
/// ```rust
/// use aeolus_di::DiError;
///
/// let circular = DiError::Circular(vec!["ServiceA", "ServiceB", "ServiceA"]);
/// assert_eq!(circular.to_string(), "Circular dependency: ServiceA -> ServiceB -> ServiceA");
///
/// let missing = DiError::ResourceMissing("service.env".to_string());
/// assert_eq!(missing.to_string(), "Missing resource key: service.env");
/// ```
#[derive(Debug, Clone, thiserror::Error)]
pub enum DiError {
    /// No descriptor, binding or instance is known for the requested key or name
    #[error("Service not found: {0}")]
    NotFound(String),
    /// Type downcast failed
    #[error("Type mismatch for: {0}")]
    TypeMismatch(&'static str),
    /// Circular dependency detected (includes path)
    #[error("Circular dependency: {}", .0.join(" -> "))]
    Circular(Vec<&'static str>),
    /// Maximum recursion depth exceeded
    #[error("Max depth {0} exceeded")]
    DepthExceeded(usize),
    /// Constructor selection, instantiation or injection failed
    #[error("Failed to create {type_name}: {message}")]
    BeanCreation {
        type_name: &'static str,
        message: String,
        #[source]
        source: Option<SharedError>,
    },
    /// A declared resource key has no configuration entry
    #[error("Missing resource key: {0}")]
    ResourceMissing(String),
    /// A scope cell was re-entered while its instance was still being created
    #[error("Recursive creation detected for {0}")]
    RecursionDetected(&'static str),
    /// Configuration binding failed
    #[error("Failed to bind config for {type_name}: {message}")]
    Binding {
        type_name: &'static str,
        message: String,
        #[source]
        source: Option<SharedError>,
    },
    /// A lazy handle was used after its container was dropped
    #[error("Container dropped before lazy resolution of {0}")]
    Detached(&'static str),
}

impl DiError {
    pub(crate) fn creation(type_name: &'static str, message: impl Into<String>) -> Self {
        DiError::BeanCreation {
            type_name,
            message: message.into(),
            source: None,
        }
    }

    pub(crate) fn creation_caused(type_name: &'static str, message: impl Into<String>, cause: BoxError) -> Self {
        DiError::BeanCreation {
            type_name,
            message: message.into(),
            source: Some(Arc::from(cause)),
        }
    }

    pub(crate) fn binding(type_name: &'static str, message: impl Into<String>, cause: Option<BoxError>) -> Self {
        DiError::Binding {
            type_name,
            message: message.into(),
            source: cause.map(Arc::from),
        }
    }

    /// Returns `true` for the cycle-related failures (`Circular`,
    /// `RecursionDetected`, `DepthExceeded`).
    pub fn is_cycle(&self) -> bool {
        matches!(
            self,
            DiError::Circular(_) | DiError::RecursionDetected(_) | DiError::DepthExceeded(_)
        )
    }
}

/// Result type for DI operations
///
/// A convenience alias for `Result<T, DiError>` used throughout the crate.
///
/// # Examples
///
/// ```rust
/// use aeolus_di::{DiResult, DiError};
///
/// fn lookup() -> DiResult<()> {
///     Err(DiError::NotFound("some_service".to_string()))
/// }
///
/// assert!(lookup().is_err());
/// ```
pub type DiResult<T> = Result<T, DiError>;
