//! Configuration binding for prefix-bound components.

use std::sync::Arc;

use crate::descriptor::{AnyArc, ComponentDescriptor, ConstructorArgs};
use crate::error::{DiError, DiResult};
use crate::properties::Properties;

/// Builds a fresh instance of a prefix-bound component and fills every
/// declared field from `properties`.
///
/// For each field `f` the key `prefix.f` is consulted; absent keys leave the
/// field at its constructed default, present ones are coerced to the field's
/// kind. Bound instances are never cached: every call yields a new one.
///
/// # Examples
///
/// ```
/// use aeolus_di::{bind, ComponentDescriptor, Properties};
///
/// #[derive(Default)]
/// struct DbConfig { url: String, pool: i32, ssl: bool }
///
/// let descriptor = ComponentDescriptor::config_binding::<DbConfig>("db")
///     .property("url", |c: &mut DbConfig, v| c.url = v)
///     .property("pool", |c: &mut DbConfig, v| c.pool = v)
///     .property("ssl", |c: &mut DbConfig, v| c.ssl = v)
///     .build();
///
/// let props = Properties::parse("db.url=jdbc:x\ndb.pool=8");
/// let bound = bind(&descriptor, &props).unwrap();
/// let config = bound.downcast_ref::<DbConfig>().unwrap();
/// assert_eq!(config.url, "jdbc:x");
/// assert_eq!(config.pool, 8);
/// assert!(!config.ssl);
/// ```
pub fn bind(descriptor: &ComponentDescriptor, properties: &Properties) -> DiResult<AnyArc> {
    let type_name = descriptor.type_name();
    let binding = descriptor
        .config
        .as_ref()
        .ok_or_else(|| DiError::binding(type_name, "no configuration prefix declared", None))?;
    if binding.prefix.is_empty() {
        return Err(DiError::binding(
            type_name,
            "properties declared without a configuration prefix; use ComponentDescriptor::config_binding",
            None,
        ));
    }

    let constructor = descriptor
        .constructors
        .iter()
        .find(|c| c.params.is_empty())
        .ok_or_else(|| DiError::binding(type_name, "no zero-argument constructor", None))?;

    let mut bean = (constructor.create)(&mut ConstructorArgs::new(type_name, Vec::new()))
        .map_err(|e| DiError::binding(type_name, "construction failed", Some(Box::new(e))))?;

    for field in &binding.fields {
        let key = format!("{}.{}", binding.prefix, field.name);
        if let Some(raw) = properties.get(&key) {
            (field.assign)(bean.as_mut(), raw).map_err(|e| {
                DiError::binding(type_name, format!("cannot bind {key} as {}", field.kind), Some(e))
            })?;
        }
    }

    Ok(Arc::from(bean))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[derive(Default)]
    struct Server {
        host: String,
        port: i32,
        timeout: f64,
        max: i64,
    }

    fn server() -> ComponentDescriptor {
        ComponentDescriptor::config_binding::<Server>("server")
            .property("host", |s: &mut Server, v| s.host = v)
            .property("port", |s: &mut Server, v| s.port = v)
            .property("timeout", |s: &mut Server, v| s.timeout = v)
            .property("max", |s: &mut Server, v| s.max = v)
            .build()
    }

    #[test]
    fn binds_every_present_key() {
        let props = Properties::parse("server.host=localhost\nserver.port=9090\nserver.timeout=1.5\nserver.max=10000000000");
        let bound = bind(&server(), &props).unwrap();
        let server = bound.downcast_ref::<Server>().unwrap();
        assert_eq!(server.host, "localhost");
        assert_eq!(server.port, 9090);
        assert_eq!(server.timeout, 1.5);
        assert_eq!(server.max, 10_000_000_000);
    }

    #[test]
    fn absent_keys_keep_defaults() {
        let bound = bind(&server(), &Properties::new()).unwrap();
        let server = bound.downcast_ref::<Server>().unwrap();
        assert_eq!(server.host, "");
        assert_eq!(server.port, 0);
    }

    #[test]
    fn unparsable_value_is_a_binding_error_with_cause() {
        let props = Properties::parse("server.port=eighty");
        let err = bind(&server(), &props).unwrap_err();
        match &err {
            DiError::Binding { message, .. } => assert!(message.contains("server.port")),
            other => panic!("unexpected {other:?}"),
        }
        assert!(err.source().is_some());
    }

    #[test]
    fn each_bind_is_a_fresh_instance() {
        let props = Properties::parse("server.port=1");
        let a = bind(&server(), &props).unwrap();
        let b = bind(&server(), &props).unwrap();
        assert!(!Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn descriptor_without_prefix_is_rejected() {
        let plain = ComponentDescriptor::builder::<Server>().default_constructor().build();
        assert!(matches!(bind(&plain, &Properties::new()), Err(DiError::Binding { .. })));
    }

    #[test]
    fn properties_on_a_plain_builder_are_rejected() {
        let plain = ComponentDescriptor::builder::<Server>()
            .default_constructor()
            .property("port", |s: &mut Server, v| s.port = v)
            .build();
        let err = bind(&plain, &Properties::parse(".port=80\nport=80")).unwrap_err();
        match err {
            DiError::Binding { message, .. } => assert!(message.contains("without a configuration prefix")),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn descriptor_without_zero_arg_constructor_is_rejected() {
        let no_ctor = ComponentDescriptor::builder::<Server>()
            .property("port", |s: &mut Server, v| s.port = v)
            .build();
        assert!(matches!(bind(&no_ctor, &Properties::new()), Err(DiError::Binding { .. })));
    }
}
