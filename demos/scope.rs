//! Prototype versus singleton scope.
//!
//! Run with: `cargo run --example scope`

use aeolus_di::{ComponentDescriptor, Container, DiResult, Scope};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

trait ScopedService: Send + Sync {
    fn ping(&self) -> u32;
}

struct PrototypeService {
    id: u32,
}

impl ScopedService for PrototypeService {
    fn ping(&self) -> u32 {
        self.id
    }
}

#[derive(Default)]
struct Registry;

fn main() -> DiResult<()> {
    println!("=== Scope Example ===\n");

    static NEXT_ID: AtomicU32 = AtomicU32::new(1);

    let container = Container::builder()
        .register(
            ComponentDescriptor::builder::<PrototypeService>()
                .scope(Scope::Prototype)
                .provides::<dyn ScopedService>(|s| s as Arc<dyn ScopedService>)
                .constructor(|| PrototypeService {
                    id: NEXT_ID.fetch_add(1, Ordering::SeqCst),
                })
                .build(),
        )
        .register(ComponentDescriptor::builder::<Registry>().default_constructor().build())
        .build()?;

    let a = container.get_capability::<dyn ScopedService>()?;
    let b = container.get_capability::<dyn ScopedService>()?;
    println!("New instance: {}", a.ping());
    println!("New instance: {}", b.ping());

    let first = container.get::<Registry>()?;
    let second = container.get::<Registry>()?;
    println!("Singleton shared: {}", Arc::ptr_eq(&first, &second));

    container.shutdown();
    Ok(())
}
