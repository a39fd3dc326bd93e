#![no_main]

use aeolus_di::{ComponentDescriptor, Container, DiError};
use libfuzzer_sys::fuzz_target;

#[derive(Default)]
struct Settings {
    port: i32,
    limit: i64,
    enabled: bool,
    ratio: f64,
}

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    let mut fields = text.splitn(4, '\n');

    let mut builder = Container::builder();
    for key in ["cfg.port", "cfg.limit", "cfg.enabled", "cfg.ratio"] {
        if let Some(raw) = fields.next() {
            builder = builder.property(key, raw);
        }
    }

    let container = builder
        .register(
            ComponentDescriptor::config_binding::<Settings>("cfg")
                .property("port", |s: &mut Settings, v| s.port = v)
                .property("limit", |s: &mut Settings, v| s.limit = v)
                .property("enabled", |s: &mut Settings, v| s.enabled = v)
                .property("ratio", |s: &mut Settings, v| s.ratio = v)
                .build(),
        )
        .build()
        .unwrap();

    // Binding either succeeds or reports the offending key; it never panics.
    match container.get::<Settings>() {
        Ok(settings) => {
            let _ = (settings.port, settings.limit, settings.enabled, settings.ratio);
        }
        Err(DiError::Binding { message, .. }) => assert!(message.starts_with("cannot bind cfg.")),
        Err(other) => panic!("unexpected error: {other}"),
    }
});
