//! Capability binding through a scanned component catalog.
//!
//! Run with: `cargo run --example basics`

use aeolus_di::{ComponentCatalog, ComponentDescriptor, Container, DiResult};
use std::sync::Arc;

trait BasicService: Send + Sync {
    fn say_hello(&self) -> String;
}

#[derive(Default)]
struct HelloService;

impl BasicService for HelloService {
    fn say_hello(&self) -> String {
        "Hello from Aeolus DI!".to_string()
    }
}

fn hello_service() -> ComponentDescriptor {
    ComponentDescriptor::builder::<HelloService>()
        .provides::<dyn BasicService>(|s| s as Arc<dyn BasicService>)
        .default_constructor()
        .build()
}

fn main() -> DiResult<()> {
    println!("=== Basic Injection ===\n");

    let catalog = ComponentCatalog::new().with(hello_service);
    let container = Container::builder()
        .discovery(Arc::new(catalog))
        .scan(&[module_path!()])
        .build()?;

    let service = container.get_capability::<dyn BasicService>()?;
    println!("{}", service.say_hello());

    // the capability and the concrete type share one singleton
    let concrete = container.get::<HelloService>()?;
    let shared = Arc::as_ptr(&service) as *const () == Arc::as_ptr(&concrete) as *const ();
    println!("Same instance through both keys: {shared}");
    Ok(())
}
