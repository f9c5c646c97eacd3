//! Process-wide hooks.
//!
//! Currently the only hook is the [default handler](default_handler), which
//! lets code log without passing a handler around.

pub mod default_handler;
