//! Leveled logging sink used by the container.
//!
//! The container reports registration, scanning, bean creation and lifecycle
//! failures through a [`Logger`]. The default sink forwards to `tracing`, so
//! applications pick the output medium by installing a subscriber.

use std::fmt;

/// Severity of a log record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LogLevel {
    Trace,
    Info,
    Warn,
    Error,
}

/// Leveled sink the container writes to.
///
/// Each method receives pre-bound format arguments, so implementations never
/// parse templates themselves. Calls are made synchronously on the resolving
/// thread; keep implementations cheap.
///
/// # Examples
///
/// ```
/// use aeolus_di::{Container, Logger, LogLevel};
/// use std::fmt;
/// use std::sync::{Arc, Mutex};
///
/// #[derive(Default)]
/// struct Capture(Mutex<Vec<(LogLevel, String)>>);
///
/// impl Logger for Capture {
///     fn log(&self, level: LogLevel, args: fmt::Arguments<'_>) {
///         self.0.lock().unwrap().push((level, args.to_string()));
///     }
/// }
///
/// let capture = Arc::new(Capture::default());
/// let _container = Container::builder().logger(capture.clone()).build().unwrap();
/// assert!(capture.0.lock().unwrap().iter().any(|(_, m)| m.starts_with("Container initialized")));
/// ```
pub trait Logger: Send + Sync {
    /// Writes one record at `level`.
    fn log(&self, level: LogLevel, args: fmt::Arguments<'_>);

    fn trace(&self, args: fmt::Arguments<'_>) {
        self.log(LogLevel::Trace, args);
    }

    fn info(&self, args: fmt::Arguments<'_>) {
        self.log(LogLevel::Info, args);
    }

    fn warn(&self, args: fmt::Arguments<'_>) {
        self.log(LogLevel::Warn, args);
    }

    fn error(&self, args: fmt::Arguments<'_>) {
        self.log(LogLevel::Error, args);
    }
}

/// Built-in logger that forwards records to `tracing`.
///
/// Records are emitted under the `aeolus_di` target.
///
/// # Examples
///
/// ```
/// use aeolus_di::{Container, TracingLogger};
/// use std::sync::Arc;
///
/// let container = Container::builder()
///     .logger(Arc::new(TracingLogger::new()))
///     .build()
///     .unwrap();
/// # drop(container);
/// ```
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingLogger;

impl TracingLogger {
    pub fn new() -> Self {
        TracingLogger
    }
}

impl Logger for TracingLogger {
    fn log(&self, level: LogLevel, args: fmt::Arguments<'_>) {
        match level {
            LogLevel::Trace => tracing::trace!(target: "aeolus_di", "{}", args),
            LogLevel::Info => tracing::info!(target: "aeolus_di", "{}", args),
            LogLevel::Warn => tracing::warn!(target: "aeolus_di", "{}", args),
            LogLevel::Error => tracing::error!(target: "aeolus_di", "{}", args),
        }
    }
}

/// Short type name (last path segment) for log lines.
pub(crate) fn short_name(type_name: &str) -> &str {
    let base = type_name.split('<').next().unwrap_or(type_name);
    match base.rfind("::") {
        Some(idx) => &type_name[idx + 2..],
        None => type_name,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Capture(Mutex<Vec<(LogLevel, String)>>);

    impl Logger for Capture {
        fn log(&self, level: LogLevel, args: fmt::Arguments<'_>) {
            self.0.lock().unwrap().push((level, args.to_string()));
        }
    }

    #[test]
    fn level_helpers_route_to_log() {
        let capture = Capture::default();
        capture.trace(format_args!("t {}", 1));
        capture.info(format_args!("i"));
        capture.warn(format_args!("w"));
        capture.error(format_args!("e {}", "x"));

        let records = capture.0.lock().unwrap();
        assert_eq!(
            *records,
            vec![
                (LogLevel::Trace, "t 1".to_string()),
                (LogLevel::Info, "i".to_string()),
                (LogLevel::Warn, "w".to_string()),
                (LogLevel::Error, "e x".to_string()),
            ]
        );
    }

    #[test]
    fn short_name_strips_module_path() {
        assert_eq!(short_name("app::services::UserService"), "UserService");
        assert_eq!(short_name("Plain"), "Plain");
        assert_eq!(short_name("dyn app::Greeter"), "Greeter");
        assert_eq!(short_name("app::Holder<alloc::string::String>"), "Holder<alloc::string::String>");
    }

    #[test]
    fn tracing_logger_emits_under_crate_target() {
        use std::io;
        use std::sync::Arc;

        #[derive(Clone, Default)]
        struct Buf(Arc<Mutex<Vec<u8>>>);

        impl io::Write for Buf {
            fn write(&mut self, bytes: &[u8]) -> io::Result<usize> {
                self.0.lock().unwrap().extend_from_slice(bytes);
                Ok(bytes.len())
            }

            fn flush(&mut self) -> io::Result<()> {
                Ok(())
            }
        }

        let buf = Buf::default();
        let writer = buf.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::new("aeolus_di=info"))
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();

        tracing::subscriber::with_default(subscriber, || {
            let logger = TracingLogger::new();
            logger.trace(format_args!("filtered out"));
            logger.warn(format_args!("Loaded {} components", 3));
        });

        let output = String::from_utf8(buf.0.lock().unwrap().clone()).unwrap();
        assert!(output.contains("WARN"));
        assert!(output.contains("aeolus_di"));
        assert!(output.contains("Loaded 3 components"));
        assert!(!output.contains("filtered out"));
    }

    #[test]
    fn tracing_logger_does_not_panic_without_subscriber() {
        let logger = TracingLogger::new();
        logger.trace(format_args!("trace"));
        logger.error(format_args!("error {}", 42));
    }
}
