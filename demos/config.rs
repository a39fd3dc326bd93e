//! Prefix-bound configuration loaded from a `.properties` file.
//!
//! Run with: `cargo run --example config`

use aeolus_di::{ComponentDescriptor, Container, DiResult};
use std::fmt;

#[derive(Default)]
struct DbConfig {
    url: String,
    user: String,
    password: String,
    pool_size: i32,
}

impl fmt::Display for DbConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DbConfig{{url='{}', user='{}', pool_size={}}}", self.url, self.user, self.pool_size)
    }
}

fn main() -> DiResult<()> {
    println!("=== Config Binding Example ===\n");

    let container = Container::builder()
        .load_properties(concat!(env!("CARGO_MANIFEST_DIR"), "/demos/application.properties"))
        .register(
            ComponentDescriptor::config_binding::<DbConfig>("db")
                .property("url", |c: &mut DbConfig, v| c.url = v)
                .property("user", |c: &mut DbConfig, v| c.user = v)
                .property("password", |c: &mut DbConfig, v| c.password = v)
                .property("pool_size", |c: &mut DbConfig, v| c.pool_size = v)
                .build(),
        )
        .build()?;

    let config = container.get::<DbConfig>()?;
    println!("{config}");
    println!("Password set: {}", !config.password.is_empty());
    Ok(())
}
