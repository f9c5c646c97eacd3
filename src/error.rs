//! Errors surfaced by handlers and option parsing.

use std::io;

use thiserror::Error;

/// Error returned by [`Handler::handle`](crate::Handler::handle).
///
/// Rendering itself never fails; the only way to lose an event is the output
/// sink refusing the write. The failure is reported once and not retried.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum HandleError {
    /// Writing or flushing the rendered event failed.
    #[error("failed to write log event to the output sink")]
    Write(#[from] io::Error),
}

/// Error returned when parsing a [`Level`](crate::Level) from text.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("unknown log level `{input}`, expected one of debug, info, warn, error")]
pub struct ParseLevelError {
    input: String,
}

impl ParseLevelError {
    pub(crate) fn new(input: &str) -> Self {
        Self {
            input: input.to_owned(),
        }
    }

    /// The text that failed to parse.
    pub fn input(&self) -> &str {
        &self.input
    }
}
