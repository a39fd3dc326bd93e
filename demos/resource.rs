//! Injecting single configuration values into a component.
//!
//! Run with: `cargo run --example resource`

use aeolus_di::{ComponentDescriptor, Container, DiResult};

#[derive(Default)]
struct ResourceExample {
    env: String,
}

impl ResourceExample {
    fn print_env(&self) {
        println!("Current environment: {}", self.env);
    }
}

fn main() -> DiResult<()> {
    println!("=== Resource Example ===\n");

    let container = Container::builder()
        .load_properties(concat!(env!("CARGO_MANIFEST_DIR"), "/demos/application.properties"))
        .register(
            ComponentDescriptor::builder::<ResourceExample>()
                .default_constructor()
                .resource("env", "service.env", |r: &mut ResourceExample, v| r.env = v)
                .build(),
        )
        .build()?;

    container.get::<ResourceExample>()?.print_env();

    // a missing key fails resolution rather than injecting a default
    let strict = Container::builder()
        .register(
            ComponentDescriptor::builder::<ResourceExample>()
                .default_constructor()
                .resource("env", "service.env", |r: &mut ResourceExample, v| r.env = v)
                .build(),
        )
        .build()?;
    if let Err(e) = strict.get::<ResourceExample>() {
        println!("Without properties: {e}");
    }
    Ok(())
}
