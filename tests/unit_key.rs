/// Unit tests for Key type methods

use aeolus_di::Key;
use std::any::TypeId;
use std::collections::HashSet;

trait Greeter {}
struct Service;

#[test]
fn test_key_display_name_type() {
    let key = Key::of::<String>();
    assert_eq!(key.display_name(), "alloc::string::String");
    assert_eq!(key.to_string(), "alloc::string::String");
    assert_eq!(key.type_id(), TypeId::of::<String>());
}

#[test]
fn test_key_display_name_capability() {
    let key = Key::capability::<dyn Greeter>();
    assert!(key.display_name().starts_with("dyn "));
    assert!(key.display_name().ends_with("Greeter"));
    assert!(key.is_capability());
}

#[test]
fn test_key_equality_ignores_the_name() {
    let canonical = Key::of::<Service>();
    let renamed = Key::Type(TypeId::of::<Service>(), "alias");
    assert_eq!(canonical, renamed);

    let mut set = HashSet::new();
    set.insert(canonical);
    assert!(set.contains(&renamed));
}

#[test]
fn test_type_and_capability_keys_differ() {
    let id = TypeId::of::<Service>();
    let concrete = Key::Type(id, "Service");
    let capability = Key::Capability(id, "Service");
    assert_ne!(concrete, capability);

    let set: HashSet<Key> = [concrete, capability].into_iter().collect();
    assert_eq!(set.len(), 2);
}

#[test]
fn test_distinct_types_have_distinct_keys() {
    assert_ne!(Key::of::<u32>(), Key::of::<u64>());
    assert_ne!(Key::capability::<dyn Greeter>(), Key::capability::<dyn Send>());
}
