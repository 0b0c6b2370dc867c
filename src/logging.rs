//! Log facade backend with runtime listeners.
//!
//! The stack logs through the `log` macros only. [`init`] installs
//! [`ListenerLogger`], which formats each record into a fixed 256-byte
//! line (longer messages are truncated) and hands it to every registered
//! listener: a UART console, a diagnostics ring buffer, a remote log
//! upload. With `echo` enabled the line also goes to stderr, which is the
//! console on host builds.
//!
//! A listener may itself log. Nesting is bounded per thread: records
//! emitted at a depth beyond [`MAX_LOG_DEPTH`] are dropped.

use core::cell::{Cell, RefCell};
use core::fmt::{self, Write as _};
use core::sync::atomic::{AtomicBool, Ordering};

use embassy_sync::blocking_mutex::Mutex;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use log::{Level, Log, Metadata, Record, SetLoggerError};

use crate::config::RpcConfig;

/// Receives every formatted log line.
pub type Listener = fn(Level, &str);

/// Handle returned by [`add_listener`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListenerId(u32);

pub const MAX_LISTENERS: usize = 4;
pub const LINE_CAPACITY: usize = 256;
pub const MAX_LOG_DEPTH: u8 = 2;

pub type Line = heapless::String<LINE_CAPACITY>;

struct Registry {
    next_id: u32,
    listeners: heapless::Vec<(ListenerId, Listener), MAX_LISTENERS>,
}

static REGISTRY: Mutex<CriticalSectionRawMutex, RefCell<Registry>> =
    Mutex::new(RefCell::new(Registry {
        next_id: 1,
        listeners: heapless::Vec::new(),
    }));

static LOGGER: ListenerLogger = ListenerLogger;
static ECHO: AtomicBool = AtomicBool::new(false);

thread_local! {
    static DEPTH: Cell<u8> = const { Cell::new(0) };
}

/// Install the listener logger as the global `log` backend, filtering at
/// `config.log_level`.
///
/// Fails if another logger is already installed; the level and echo
/// setting are applied either way.
pub fn init(config: &RpcConfig, echo: bool) -> Result<(), SetLoggerError> {
    ECHO.store(echo, Ordering::Relaxed);
    log::set_max_level(config.log_level);
    log::set_logger(&LOGGER)
}

/// Register `listener`. Returns `None` when the table is full.
pub fn add_listener(listener: Listener) -> Option<ListenerId> {
    REGISTRY.lock(|cell| {
        let mut registry = cell.borrow_mut();
        let id = ListenerId(registry.next_id);
        registry.listeners.push((id, listener)).ok()?;
        registry.next_id = registry.next_id.wrapping_add(1);
        Some(id)
    })
}

/// Unregister a listener. Returns `false` if `id` was not registered.
pub fn remove_listener(id: ListenerId) -> bool {
    REGISTRY.lock(|cell| {
        let mut registry = cell.borrow_mut();
        match registry.listeners.iter().position(|(lid, _)| *lid == id) {
            Some(index) => {
                registry.listeners.remove(index);
                true
            }
            None => false,
        }
    })
}

pub fn listener_count() -> usize {
    REGISTRY.lock(|cell| cell.borrow().listeners.len())
}

/// Format `args` into a fixed line, truncating at a char boundary.
pub fn format_line(args: fmt::Arguments<'_>) -> Line {
    let mut line = Truncating(Line::new());
    // Truncating never reports an error.
    let _ = line.write_fmt(args);
    line.0
}

struct Truncating(Line);

impl fmt::Write for Truncating {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        for c in s.chars() {
            if self.0.push(c).is_err() {
                break;
            }
        }
        Ok(())
    }
}

/// Per-thread nesting level, released on drop.
struct DepthGuard;

impl DepthGuard {
    fn enter() -> Option<Self> {
        DEPTH.with(|depth| {
            let d = depth.get();
            if d >= MAX_LOG_DEPTH {
                None
            } else {
                depth.set(d + 1);
                Some(Self)
            }
        })
    }
}

impl Drop for DepthGuard {
    fn drop(&mut self) {
        DEPTH.with(|depth| depth.set(depth.get().saturating_sub(1)));
    }
}

/// `log::Log` implementation fanning records out to the listeners.
pub struct ListenerLogger;

impl Log for ListenerLogger {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record<'_>) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let Some(_guard) = DepthGuard::enter() else {
            return;
        };

        let line = format_line(*record.args());
        if ECHO.load(Ordering::Relaxed) {
            eprintln!("{:<5} {}: {}", record.level(), record.target(), line);
        }

        // Listeners run outside the lock so they may log or unregister.
        let listeners = REGISTRY.lock(|cell| cell.borrow().listeners.clone());
        for (_, listener) in &listeners {
            listener(record.level(), &line);
        }
    }

    fn flush(&self) {}
}
