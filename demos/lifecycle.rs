//! Post-construct and pre-destroy hooks.
//!
//! Run with: `RUST_LOG=aeolus_di=info cargo run --example lifecycle`

use aeolus_di::{ComponentDescriptor, Container, DiResult};
use tracing_subscriber::EnvFilter;

#[derive(Default)]
struct Database {
    connected: bool,
}

fn main() -> DiResult<()> {
    tracing_subscriber::fmt().with_env_filter(EnvFilter::from_default_env()).init();

    println!("=== Lifecycle Hooks ===\n");

    let container = Container::builder()
        .register(
            ComponentDescriptor::builder::<Database>()
                .default_constructor()
                .post_construct("init", |db| {
                    db.connected = true;
                    println!("[Lifecycle] Database connection established.");
                    Ok(())
                })
                .pre_destroy("shutdown", |_| {
                    println!("[Lifecycle] Database connection closed.");
                    Ok(())
                })
                .build(),
        )
        .build()?;

    let db = container.get::<Database>()?;
    println!("Connected: {}", db.connected);

    container.shutdown();
    Ok(())
}
