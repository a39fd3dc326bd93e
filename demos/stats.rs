//! Container introspection after a scan.
//!
//! Run with: `cargo run --example stats`

use aeolus_di::{ComponentCatalog, ComponentDescriptor, Container, DiResult, InjectionPoint, Scope};
use std::sync::Arc;

#[derive(Default)]
struct Clock;

struct BasicService {
    _clock: Arc<Clock>,
}

#[derive(Default)]
struct Worker;

fn main() -> DiResult<()> {
    println!("=== Stats Example ===\n");

    let catalog = ComponentCatalog::new()
        .with(|| ComponentDescriptor::builder::<Clock>().default_constructor().build())
        .with(|| {
            ComponentDescriptor::builder::<BasicService>()
                .inject_constructor(vec![InjectionPoint::of::<Clock>()], |args| {
                    Ok(BasicService { _clock: args.get()? })
                })
                .build()
        })
        .with(|| {
            ComponentDescriptor::builder::<Worker>()
                .scope(Scope::Prototype)
                .default_constructor()
                .build()
        });

    let container = Container::builder()
        .discovery(Arc::new(catalog))
        .scan(&[module_path!()])
        .property("service.env", "dev")
        .build()?;

    container.get::<BasicService>()?;
    container.get::<Worker>()?;
    container.get::<Worker>()?;
    println!("Container stats: {}", container.stats());

    #[cfg(feature = "serde")]
    if let Ok(json) = container.stats().to_json() {
        println!("As JSON: {json}");
    }

    container.shutdown();
    Ok(())
}
