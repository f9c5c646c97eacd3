//! Discovering how wide the output terminal is.

/// Reports the current terminal width in cells.
///
/// Probed once per handled event. Returning `None` makes the handler fall
/// back to [`HandlerOptions::fallback_width`](crate::HandlerOptions::fallback_width).
pub trait WidthProbe: Send + Sync + 'static {
    /// The width in cells, if known.
    fn probe(&self) -> Option<usize>;
}

/// Asks the terminal attached to stdout.
#[derive(Copy, Clone, Debug, Default)]
pub struct TerminalWidth;

impl WidthProbe for TerminalWidth {
    fn probe(&self) -> Option<usize> {
        terminal_size::terminal_size()
            .map(|(terminal_size::Width(width), _)| usize::from(width))
            .filter(|&width| width > 0)
    }
}

/// Always reports the same width.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct FixedWidth(pub usize);

impl WidthProbe for FixedWidth {
    fn probe(&self) -> Option<usize> {
        Some(self.0)
    }
}

impl<F> WidthProbe for F
where
    F: Fn() -> Option<usize> + Send + Sync + 'static,
{
    fn probe(&self) -> Option<usize> {
        self()
    }
}
