use aeolus_di::{ComponentDescriptor, Container, DiError, Inject, InjectionPoint, Lazy, Scope};
use std::sync::Arc;

fn assert_cycle_path(err: DiError, expected: &[&str]) {
    match err {
        DiError::Circular(path) => {
            assert_eq!(path.len(), expected.len(), "path was {:?}", path);
            for (got, want) in path.iter().zip(expected) {
                assert!(got.ends_with(want), "path was {:?}", path);
            }
        }
        other => panic!("expected Circular, got {other:?}"),
    }
}

#[test]
fn test_self_circular_dependency() {
    struct SelfReferencing;

    let container = Container::builder()
        .register(
            ComponentDescriptor::builder::<SelfReferencing>()
                .inject_constructor(vec![InjectionPoint::of::<SelfReferencing>()], |args| {
                    args.get::<SelfReferencing>()?;
                    Ok(SelfReferencing)
                })
                .build(),
        )
        .build()
        .unwrap();

    let err = container.get::<SelfReferencing>().err().unwrap();
    assert_cycle_path(err, &["SelfReferencing", "SelfReferencing"]);
}

#[test]
fn test_two_service_cycle() {
    struct ServiceA;
    struct ServiceB;

    let container = Container::builder()
        .register(
            ComponentDescriptor::builder::<ServiceA>()
                .inject_constructor(vec![InjectionPoint::of::<ServiceB>()], |_| Ok(ServiceA))
                .build(),
        )
        .register(
            ComponentDescriptor::builder::<ServiceB>()
                .inject_constructor(vec![InjectionPoint::of::<ServiceA>()], |_| Ok(ServiceB))
                .build(),
        )
        .build()
        .unwrap();

    let err = container.get::<ServiceA>().err().unwrap();
    assert!(err.is_cycle());
    assert_cycle_path(err, &["ServiceA", "ServiceB", "ServiceA"]);
}

#[test]
fn test_cycle_through_capability_and_field() {
    trait Port: Send + Sync {}

    #[derive(Default)]
    struct Adapter {
        core: Option<Arc<Core>>,
    }
    impl Port for Adapter {}

    #[derive(Default)]
    struct Core {
        port: Option<Arc<dyn Port>>,
    }

    let container = Container::builder()
        .register(
            ComponentDescriptor::builder::<Adapter>()
                .provides::<dyn Port>(|a| a as Arc<dyn Port>)
                .default_constructor()
                .field("core", Inject::<Core>::of(), |a, c| a.core = Some(c))
                .build(),
        )
        .register(
            ComponentDescriptor::builder::<Core>()
                .default_constructor()
                .field("port", Inject::<dyn Port>::capability(), |c, p| c.port = Some(p))
                .build(),
        )
        .build()
        .unwrap();

    let err = container.get::<Core>().err().unwrap();
    assert_cycle_path(err, &["Core", "Port", "Adapter", "Core"]);
}

#[test]
fn test_prototype_cycle_is_detected_too() {
    struct Left;
    struct Right;

    let container = Container::builder()
        .register(
            ComponentDescriptor::builder::<Left>()
                .scope(Scope::Prototype)
                .inject_constructor(vec![InjectionPoint::of::<Right>()], |_| Ok(Left))
                .build(),
        )
        .register(
            ComponentDescriptor::builder::<Right>()
                .scope(Scope::Prototype)
                .inject_constructor(vec![InjectionPoint::of::<Left>()], |_| Ok(Right))
                .build(),
        )
        .build()
        .unwrap();

    assert!(matches!(container.get::<Right>(), Err(DiError::Circular(_))));
}

#[test]
fn test_failed_cycle_leaves_container_usable() {
    struct ServiceA;
    struct ServiceB;
    #[derive(Default)]
    struct Healthy;

    let container = Container::builder()
        .register(
            ComponentDescriptor::builder::<ServiceA>()
                .inject_constructor(vec![InjectionPoint::of::<ServiceB>()], |_| Ok(ServiceA))
                .build(),
        )
        .register(
            ComponentDescriptor::builder::<ServiceB>()
                .inject_constructor(vec![InjectionPoint::of::<ServiceA>()], |_| Ok(ServiceB))
                .build(),
        )
        .register(ComponentDescriptor::builder::<Healthy>().default_constructor().build())
        .build()
        .unwrap();

    assert!(container.get::<ServiceA>().is_err());
    assert!(container.get::<ServiceA>().is_err());
    assert!(container.get::<Healthy>().is_ok());
    assert_eq!(container.stats().managed, 1);
}

#[test]
fn test_lazy_constructor_argument_breaks_cycle() {
    struct Parent {
        child: Lazy<Child>,
    }
    struct Child {
        parent: Arc<Parent>,
    }

    let container = Container::builder()
        .register(
            ComponentDescriptor::builder::<Parent>()
                .inject_constructor(vec![InjectionPoint::of::<Child>().lazy()], |args| {
                    Ok(Parent { child: args.lazy::<Child>()? })
                })
                .build(),
        )
        .register(
            ComponentDescriptor::builder::<Child>()
                .inject_constructor(vec![InjectionPoint::of::<Parent>()], |args| {
                    Ok(Child { parent: args.get::<Parent>()? })
                })
                .build(),
        )
        .build()
        .unwrap();

    let parent = container.get::<Parent>().unwrap();
    assert!(!parent.child.is_resolved());

    let child = parent.child.get().unwrap();
    assert!(Arc::ptr_eq(&child.parent, &parent));
    assert!(parent.child.is_resolved());
    assert!(Arc::ptr_eq(&child, &parent.child.get().unwrap()));
}

#[test]
fn test_lazy_capability_resolves_on_first_use() {
    trait Clock: Send + Sync {
        fn now(&self) -> u64;
    }
    #[derive(Default)]
    struct Fixed;
    impl Clock for Fixed {
        fn now(&self) -> u64 {
            99
        }
    }
    #[derive(Default)]
    struct Scheduler {
        clock: Option<Lazy<dyn Clock>>,
    }

    let container = Container::builder()
        .register(
            ComponentDescriptor::builder::<Scheduler>()
                .default_constructor()
                .lazy_field("clock", Inject::<dyn Clock>::capability(), |s, l| s.clock = Some(l))
                .build(),
        )
        .register(
            ComponentDescriptor::builder::<Fixed>()
                .provides::<dyn Clock>(|f| f as Arc<dyn Clock>)
                .default_constructor()
                .build(),
        )
        .build()
        .unwrap();

    let scheduler = container.get::<Scheduler>().unwrap();
    assert_eq!(container.stats().managed, 1);
    assert_eq!(scheduler.clock.as_ref().unwrap().get().unwrap().now(), 99);
    assert_eq!(container.stats().managed, 2);
}

#[test]
fn test_lazy_after_container_dropped_is_detached() {
    #[derive(Default)]
    struct Later;
    #[derive(Default)]
    struct Holder {
        later: Option<Lazy<Later>>,
    }

    let container = Container::builder()
        .register(ComponentDescriptor::builder::<Later>().default_constructor().build())
        .register(
            ComponentDescriptor::builder::<Holder>()
                .default_constructor()
                .lazy_field("later", Inject::<Later>::of(), |h, l| h.later = Some(l))
                .build(),
        )
        .build()
        .unwrap();

    let holder = container.get::<Holder>().unwrap();
    drop(container);
    assert!(matches!(holder.later.as_ref().unwrap().get(), Err(DiError::Detached(_))));
}
