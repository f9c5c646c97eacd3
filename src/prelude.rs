//! Commonly used items for convenient importing.
//!
//! ```rust
//! use boxlog::prelude::*;
//!
//! let handler = PrettyHandler::new(Vec::new(), HandlerOptions::new().with_fixed_width(60));
//! handler
//!     .handle(&event!(Level::Info, "started", "workers" => 4u64))
//!     .unwrap();
//! ```

pub use crate::{
    Attr, Entry, HandleError, Handler, HandlerOptions, Level, LogEvent, LogValue, PrettyHandler,
    SourceLocation, Value, event, log,
};
