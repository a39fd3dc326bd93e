//! A bean processor observing every instantiation.
//!
//! Run with: `cargo run --example processor`

use aeolus_di::{BeanProcessor, BoxedBean, ComponentDescriptor, Container, DiResult};
use std::sync::Arc;

struct LoggingBeanProcessor;

impl BeanProcessor for LoggingBeanProcessor {
    fn before_initialization(&self, bean: BoxedBean, descriptor: &ComponentDescriptor) -> DiResult<BoxedBean> {
        println!("[BeanProcessor] Before: {}", simple_name(descriptor.type_name()));
        Ok(bean)
    }

    fn after_initialization(&self, bean: BoxedBean, descriptor: &ComponentDescriptor) -> DiResult<BoxedBean> {
        println!("[BeanProcessor] After: {}", simple_name(descriptor.type_name()));
        Ok(bean)
    }
}

fn simple_name(name: &str) -> &str {
    name.rsplit("::").next().unwrap_or(name)
}

#[derive(Default)]
struct HelloService {
    greeting: String,
}

fn main() -> DiResult<()> {
    println!("=== Bean Processor Example ===\n");

    let container = Container::builder()
        .add_processor(Arc::new(LoggingBeanProcessor))
        .register(
            ComponentDescriptor::builder::<HelloService>()
                .default_constructor()
                .post_construct("init", |s| {
                    s.greeting = "Hello from Aeolus DI!".to_string();
                    Ok(())
                })
                .build(),
        )
        .build()?;

    println!("{}", container.get::<HelloService>()?.greeting);
    Ok(())
}
