//! The process-wide default handler.
//!
//! ```rust
//! use boxlog::{
//!     HandlerOptions, Level, LogEvent, PrettyHandler,
//!     hooks::default_handler::{default_handler, log, register_default_handler},
//! };
//!
//! register_default_handler(PrettyHandler::new(Vec::new(), HandlerOptions::new()));
//! assert!(default_handler().is_some());
//! log(&LogEvent::new(Level::Info, "hello")).unwrap();
//! ```

use spin::RwLock;
use triomphe::Arc;
use unsize::CoerceUnsize;

use crate::{error::HandleError, event::LogEvent, handler::Handler};

// Never held across a `handle` call: readers clone the `Arc` and release.
static DEFAULT_HANDLER: RwLock<Option<Arc<dyn Handler>>> = RwLock::new(None);

/// Installs `handler` as the default, replacing any previous one.
pub fn register_default_handler(handler: impl Handler) {
    let handler = Arc::new(handler).unsize(unsize::Coercion!(to dyn Handler));
    let previous = DEFAULT_HANDLER.write().replace(handler);
    if previous.is_some() {
        tracing::debug!(target: "boxlog", "replaced the default handler");
    }
}

/// The current default handler, if one is installed.
pub fn default_handler() -> Option<Arc<dyn Handler>> {
    DEFAULT_HANDLER.read().clone()
}

/// Removes and returns the current default handler.
pub fn take_default_handler() -> Option<Arc<dyn Handler>> {
    DEFAULT_HANDLER.write().take()
}

/// Sends `event` to the default handler.
///
/// Does nothing when no handler is installed or it does not accept the
/// event's level.
///
/// # Errors
///
/// Returns the handler's error if writing the event failed.
pub fn log(event: &LogEvent) -> Result<(), HandleError> {
    match default_handler() {
        Some(handler) if handler.enabled(event.level) => handler.handle(event),
        _ => Ok(()),
    }
}
