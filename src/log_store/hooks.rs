//! Process-wide hooks feeding the log store
//!
//! `log::error!` records and panics land in the store under the `error`
//! category, then continue to the console logger / previous panic hook as if
//! the store weren't there.

use std::any::Any;
use std::panic::{self, Location};
use std::sync::OnceLock;

use log::{Level, LevelFilter, Log, Metadata, Record};

use super::{LogLevel, LogOptions, SharedLogStore};

pub const ERROR_CATEGORY: &str = "error";

static INSTALLED: OnceLock<SharedLogStore> = OnceLock::new();

/// Record without blocking. Returns false when the store is busy (e.g. an
/// error logged from inside a listener).
fn record_error(store: &SharedLogStore, message: String, options: LogOptions) -> bool {
    match store.try_lock() {
        Ok(mut guard) => {
            guard.log(ERROR_CATEGORY, message, options);
            true
        }
        Err(std::sync::TryLockError::Poisoned(poisoned)) => {
            poisoned.into_inner().log(ERROR_CATEGORY, message, options);
            true
        }
        Err(std::sync::TryLockError::WouldBlock) => false,
    }
}

/// Console sink for wasm, where stderr goes nowhere
#[cfg(target_arch = "wasm32")]
struct ConsoleLogger;

#[cfg(target_arch = "wasm32")]
impl Log for ConsoleLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= Level::Info
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let line = format!("[{}] {}", record.target(), record.args());
        match record.level() {
            Level::Error => macroquad::logging::error!("{}", line),
            Level::Warn => macroquad::logging::warn!("{}", line),
            Level::Info => macroquad::logging::info!("{}", line),
            Level::Debug | Level::Trace => macroquad::logging::debug!("{}", line),
        }
    }

    fn flush(&self) {}
}

#[cfg(not(target_arch = "wasm32"))]
fn console_logger() -> (Box<dyn Log>, LevelFilter) {
    let logger = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).build();
    let filter = logger.filter();
    (Box::new(logger), filter)
}

#[cfg(target_arch = "wasm32")]
fn console_logger() -> (Box<dyn Log>, LevelFilter) {
    (Box::new(ConsoleLogger), LevelFilter::Info)
}

struct StoreLogger {
    store: SharedLogStore,
    console: Box<dyn Log>,
}

impl Log for StoreLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() == Level::Error || self.console.enabled(metadata)
    }

    fn log(&self, record: &Record) {
        if record.level() == Level::Error {
            let options = LogOptions::level(LogLevel::Error).with_data(record.target());
            record_error(&self.store, record.args().to_string(), options);
        }
        self.console.log(record);
    }

    fn flush(&self) {
        self.console.flush();
    }
}

fn panic_message(payload: &(dyn Any + Send), location: Option<&Location<'_>>) -> String {
    let message = if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    };
    match location {
        Some(location) => format!("panic at {}:{}: {}", location.file(), location.line(), message),
        None => format!("panic: {}", message),
    }
}

/// Install the store-forwarding logger and panic hook. Only the first call
/// does anything; returns whether this call installed the hooks.
pub fn init_global_hooks(store: &SharedLogStore) -> bool {
    if INSTALLED.set(store.clone()).is_err() {
        return false;
    }

    let (console, filter) = console_logger();
    let logger = StoreLogger { store: store.clone(), console };
    match log::set_boxed_logger(Box::new(logger)) {
        Ok(()) => log::set_max_level(filter.max(LevelFilter::Error)),
        Err(_) => eprintln!("simview: a logger was already installed; log::error! records won't reach the log store"),
    }

    let previous = panic::take_hook();
    let panic_store = store.clone();
    panic::set_hook(Box::new(move |info| {
        record_error(
            &panic_store,
            panic_message(info.payload(), info.location()),
            LogOptions::level(LogLevel::Error).with_data("panic"),
        );
        previous(info);
    }));
    true
}

/// Record the failure of a fallible background operation whose result
/// nobody is awaiting
pub fn report_rejection(context: &str, error: &dyn std::fmt::Display) {
    let message = format!("unhandled failure in {}: {}", context, error);
    log::warn!("{}", message);
    if let Some(store) = INSTALLED.get() {
        record_error(store, message, LogOptions::level(LogLevel::Error).with_data(context));
    }
}
