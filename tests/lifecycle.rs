use aeolus_di::{
    BeanProcessor, BoxedBean, ComponentDescriptor, Container, DiError, DiResult, Inject, LogLevel, Logger, Scope,
};
use std::fmt;
use std::sync::{Arc, Mutex};

#[derive(Default)]
struct RecordingLogger(Mutex<Vec<(LogLevel, String)>>);

impl RecordingLogger {
    fn messages(&self, level: LogLevel) -> Vec<String> {
        self.0
            .lock()
            .unwrap()
            .iter()
            .filter(|(l, _)| *l == level)
            .map(|(_, m)| m.clone())
            .collect()
    }
}

impl Logger for RecordingLogger {
    fn log(&self, level: LogLevel, args: fmt::Arguments<'_>) {
        self.0.lock().unwrap().push((level, args.to_string()));
    }
}

type Journal = Arc<Mutex<Vec<String>>>;

struct Tracing {
    label: &'static str,
    journal: Journal,
}

impl BeanProcessor for Tracing {
    fn before_initialization(&self, bean: BoxedBean, descriptor: &ComponentDescriptor) -> DiResult<BoxedBean> {
        self.journal
            .lock()
            .unwrap()
            .push(format!("{}:before:{}", self.label, short(descriptor.type_name())));
        Ok(bean)
    }

    fn after_initialization(&self, bean: BoxedBean, descriptor: &ComponentDescriptor) -> DiResult<BoxedBean> {
        self.journal
            .lock()
            .unwrap()
            .push(format!("{}:after:{}", self.label, short(descriptor.type_name())));
        Ok(bean)
    }
}

fn short(name: &str) -> &str {
    name.rsplit("::").next().unwrap_or(name)
}

struct Widget {
    journal: Journal,
    initialized: bool,
}

fn widget(journal: &Journal) -> ComponentDescriptor {
    let for_ctor = journal.clone();
    ComponentDescriptor::builder::<Widget>()
        .constructor(move || {
            for_ctor.lock().unwrap().push("construct".into());
            Widget {
                journal: for_ctor.clone(),
                initialized: false,
            }
        })
        .post_construct("init", |w| {
            w.journal.lock().unwrap().push("post_construct".into());
            w.initialized = true;
            Ok(())
        })
        .pre_destroy("close", |w| {
            w.journal.lock().unwrap().push("pre_destroy:Widget".into());
            Ok(())
        })
        .build()
}

#[test]
fn processors_wrap_post_construct_in_registration_order() {
    let journal: Journal = Arc::default();
    let container = Container::builder()
        .add_processor(Arc::new(Tracing { label: "p1", journal: journal.clone() }))
        .add_processor(Arc::new(Tracing { label: "p2", journal: journal.clone() }))
        .register(widget(&journal))
        .build()
        .unwrap();

    let widget = container.get::<Widget>().unwrap();
    assert!(widget.initialized);
    assert_eq!(
        *journal.lock().unwrap(),
        vec![
            "construct",
            "p1:before:Widget",
            "p2:before:Widget",
            "post_construct",
            "p1:after:Widget",
            "p2:after:Widget",
        ]
    );
    assert_eq!(container.stats().processors, 2);
}

#[test]
fn processor_may_replace_the_instance() {
    struct Swap;
    impl BeanProcessor for Swap {
        fn after_initialization(&self, bean: BoxedBean, _: &ComponentDescriptor) -> DiResult<BoxedBean> {
            match bean.downcast::<Counter>() {
                Ok(mut counter) => {
                    counter.value += 100;
                    Ok(counter)
                }
                Err(other) => Ok(other),
            }
        }
    }

    #[derive(Default)]
    struct Counter {
        value: u32,
    }

    let container = Container::builder()
        .add_processor(Arc::new(Swap))
        .register(ComponentDescriptor::builder::<Counter>().default_constructor().build())
        .build()
        .unwrap();

    assert_eq!(container.get::<Counter>().unwrap().value, 100);
}

#[test]
fn processor_error_aborts_instantiation() {
    struct Veto;
    impl BeanProcessor for Veto {
        fn before_initialization(&self, _: BoxedBean, d: &ComponentDescriptor) -> DiResult<BoxedBean> {
            Err(DiError::BeanCreation {
                type_name: d.type_name(),
                message: "vetoed".into(),
                source: None,
            })
        }
    }

    let journal: Journal = Arc::default();
    let container = Container::builder()
        .add_processor(Arc::new(Veto))
        .register(widget(&journal))
        .build()
        .unwrap();

    assert!(matches!(container.get::<Widget>(), Err(DiError::BeanCreation { .. })));
    assert!(!journal.lock().unwrap().contains(&"post_construct".to_string()));
    assert_eq!(container.stats().managed, 0);
}

#[test]
fn failing_post_construct_is_logged_and_construction_continues() {
    #[derive(Default)]
    struct Fragile {
        second_ran: bool,
    }

    let log = Arc::new(RecordingLogger::default());
    let container = Container::builder()
        .logger(log.clone())
        .register(
            ComponentDescriptor::builder::<Fragile>()
                .default_constructor()
                .post_construct("explode", |_| Err("kaboom".into()))
                .post_construct("recover", |f| {
                    f.second_ran = true;
                    Ok(())
                })
                .build(),
        )
        .build()
        .unwrap();

    let fragile = container.get::<Fragile>().unwrap();
    assert!(fragile.second_ran);
    let errors = log.messages(LogLevel::Error);
    assert_eq!(errors.len(), 1);
    assert!(errors[0].contains("Fragile.explode()"));
    assert!(errors[0].contains("kaboom"));
}

#[test]
fn shutdown_runs_pre_destroy_in_reverse_creation_order_once() {
    let journal: Journal = Arc::default();

    struct Leaf {
        journal: Journal,
    }
    struct Root {
        journal: Journal,
    }

    let leaf_journal = journal.clone();
    let root_journal = journal.clone();
    let log = Arc::new(RecordingLogger::default());
    let container = Container::builder()
        .logger(log.clone())
        .register(
            ComponentDescriptor::builder::<Leaf>()
                .constructor(move || Leaf { journal: leaf_journal.clone() })
                .pre_destroy("close", |l| {
                    l.journal.lock().unwrap().push("leaf".into());
                    Ok(())
                })
                .build(),
        )
        .register(
            ComponentDescriptor::builder::<Root>()
                .constructor(move || Root { journal: root_journal.clone() })
                .field("leaf", Inject::<Leaf>::of(), |_, _| {})
                .pre_destroy("close", |r| {
                    r.journal.lock().unwrap().push("root".into());
                    Ok(())
                })
                .build(),
        )
        .build()
        .unwrap();

    container.get::<Root>().unwrap();
    container.shutdown();
    container.shutdown();

    assert_eq!(*journal.lock().unwrap(), vec!["root", "leaf"]);
    assert_eq!(container.stats().managed, 0);
    let infos = log.messages(LogLevel::Info);
    assert!(infos.iter().any(|m| m == "Container shutting down (2 managed beans)..."));
    assert!(infos.iter().any(|m| m == "Container shutting down (0 managed beans)..."));
}

#[test]
fn shutdown_without_instances_runs_no_hooks() {
    let journal: Journal = Arc::default();
    let log = Arc::new(RecordingLogger::default());
    let container = Container::builder()
        .logger(log.clone())
        .register(widget(&journal))
        .build()
        .unwrap();

    container.shutdown();
    container.shutdown();

    assert!(journal.lock().unwrap().is_empty());
    assert_eq!(container.stats().managed, 0);
    assert_eq!(container.stats().singletons, 0);
    let shutdowns: Vec<_> = log
        .messages(LogLevel::Info)
        .into_iter()
        .filter(|m| m.starts_with("Container shutting down"))
        .collect();
    assert_eq!(shutdowns, vec!["Container shutting down (0 managed beans)..."; 2]);
    assert!(log.messages(LogLevel::Error).is_empty());

    drop(container);
    assert!(log.messages(LogLevel::Warn).is_empty());
}

#[test]
fn failing_pre_destroy_does_not_stop_others() {
    #[derive(Default)]
    struct Stubborn;
    #[derive(Default)]
    struct Polite;

    let log = Arc::new(RecordingLogger::default());
    let closed = Arc::new(Mutex::new(false));
    let closed_flag = closed.clone();
    let container = Container::builder()
        .logger(log.clone())
        .register(
            ComponentDescriptor::builder::<Polite>()
                .default_constructor()
                .pre_destroy("close", move |_| {
                    *closed_flag.lock().unwrap() = true;
                    Ok(())
                })
                .build(),
        )
        .register(
            ComponentDescriptor::builder::<Stubborn>()
                .default_constructor()
                .pre_destroy("close", |_| Err("refused".into()))
                .build(),
        )
        .build()
        .unwrap();

    container.get::<Polite>().unwrap();
    container.get::<Stubborn>().unwrap();
    container.shutdown();

    assert!(*closed.lock().unwrap());
    let errors = log.messages(LogLevel::Error);
    assert_eq!(errors.len(), 1);
    assert!(errors[0].contains("Stubborn.close()"));
}

#[test]
fn every_prototype_instance_is_managed() {
    let journal: Journal = Arc::default();
    let proto_journal = journal.clone();

    struct Conn {
        journal: Journal,
    }

    let container = Container::builder()
        .register(
            ComponentDescriptor::builder::<Conn>()
                .scope(Scope::Prototype)
                .constructor(move || Conn { journal: proto_journal.clone() })
                .pre_destroy("close", |c| {
                    c.journal.lock().unwrap().push("closed".into());
                    Ok(())
                })
                .build(),
        )
        .build()
        .unwrap();

    for _ in 0..3 {
        container.get::<Conn>().unwrap();
    }
    assert_eq!(container.stats().managed, 3);
    container.shutdown();
    assert_eq!(journal.lock().unwrap().len(), 3);
}

#[test]
fn dropping_with_pending_hooks_warns() {
    let journal: Journal = Arc::default();
    let log = Arc::new(RecordingLogger::default());
    let container = Container::builder()
        .logger(log.clone())
        .register(widget(&journal))
        .build()
        .unwrap();

    container.get::<Widget>().unwrap();
    let clone = container.clone();
    drop(clone);
    assert!(log.messages(LogLevel::Warn).is_empty());

    drop(container);
    let warnings = log.messages(LogLevel::Warn);
    assert_eq!(warnings.len(), 1);
    assert!(warnings[0].contains("call shutdown()"));
}

#[test]
fn build_and_creation_are_logged() {
    let journal: Journal = Arc::default();
    let log = Arc::new(RecordingLogger::default());
    let container = Container::builder()
        .logger(log.clone())
        .register(widget(&journal))
        .build()
        .unwrap();
    container.get::<Widget>().unwrap();

    let infos = log.messages(LogLevel::Info);
    assert!(infos.iter().any(|m| m == "Container initialized with 1 bindings, 0 named beans"));
    let traces = log.messages(LogLevel::Trace);
    assert!(traces.iter().any(|m| m == "PostConstruct executed: Widget.init()"));
    assert!(traces.iter().any(|m| m == "Created bean: Widget"));
    container.shutdown();
}
