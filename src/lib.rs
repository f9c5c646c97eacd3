#![deny(
    missing_docs,
    unsafe_code,
    rustdoc::invalid_rust_codeblocks,
    rustdoc::broken_intra_doc_links,
    unused_doc_comments
)]
// Extra checks on nightly
#![cfg_attr(nightly_extra_checks, feature(rustdoc_missing_doc_code_examples))]
#![cfg_attr(nightly_extra_checks, forbid(rustdoc::missing_doc_code_examples))]
// Make docs.rs generate better docs
#![cfg_attr(docsrs, feature(doc_cfg))]

//! Box-drawn, color-coded terminal rendering for structured log events.
//!
//! ## Overview
//!
//! Structured logs are great for machines and tiring for people reading a
//! terminal during development. This crate renders each event as a small box:
//! level and message in the top border, attributes as a tree with nested
//! groups drawn as branches, and the source location centered in the bottom
//! border.
//!
//! ```text
//! ╭──[🛑 ERROR: request failed]──────────────────────[🕙 Oct 18 09:12:44]─╮
//! ├╼ op: "write"                                                          │
//! ├╼ 📂 GROUP: request                                                    │
//! │ ┣━━━╼ id: "123"                                                       │
//! │ ┗━━━╼ size: 42                                                        │
//! ╰───────────────────────[SOURCE: src/handler.rs:42]─────────────────────╯
//! ```
//!
//! ## Quick Example
//!
//! ```
//! use boxlog::{Attr, Handler, HandlerOptions, Level, LogEvent, PrettyHandler};
//!
//! let handler = PrettyHandler::new(std::io::stdout(), HandlerOptions::from_env());
//! let event = LogEvent::new(Level::Error, "request failed")
//!     .with_caller_source()
//!     .with_attr(Attr::string("op", "write"))
//!     .with_attr(Attr::group(
//!         "request",
//!         [Attr::string("id", "123"), Attr::int("size", 42)],
//!     ));
//! handler.handle(&event).unwrap();
//! ```
//!
//! ## Pieces
//!
//! - [`LogEvent`], [`Attr`] and [`Value`] describe what to log
//! - [`PrettyHandler`] renders events and writes each one to its sink in a
//!   single write, behind a lock shared by every handler derived from it
//! - [`render`] holds the layout engine, the text wrapper, styles and the
//!   serializer, usable without a handler
//! - [`metrics`] provides the runtime panel shown in verbose mode on wide
//!   terminals
//! - [`hooks::default_handler`] keeps a process-wide handler for the
//!   [`log!`] macro
//!
//! ## Features
//!
//! - `process-metrics` (default): resident and virtual memory in the metrics
//!   panel, read through `sysinfo`. Without it the panel shows `n/a` for both

#[macro_use]
mod macros;

pub mod hooks;
pub mod metrics;
pub mod prelude;
pub mod render;

mod error;
mod event;
mod handler;
mod options;
mod probe;

pub use self::{
    error::{HandleError, ParseLevelError},
    event::{Attr, Entry, Level, LogEvent, LogValue, SourceLocation, Value},
    handler::{Handler, PrettyHandler},
    options::{ColorChoice, HandlerOptions},
    probe::{FixedWidth, TerminalWidth, WidthProbe},
};
