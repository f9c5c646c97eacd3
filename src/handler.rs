//! The [`Handler`] trait and its box-drawing implementation.

use core::fmt;
use std::io::Write;

use parking_lot::Mutex;
use triomphe::Arc;
use unsize::CoerceUnsize;

use crate::{
    error::HandleError,
    event::{Attr, Entry, Level, LogEvent},
    hooks::default_handler::register_default_handler,
    metrics::{MetricsSource, ProcessMetrics},
    options::HandlerOptions,
    probe::{FixedWidth, TerminalWidth, WidthProbe},
    render::{RenderContext, Renderer, Styler},
};

/// Receives log events.
///
/// Implementations must be shareable across threads; one handler is
/// typically shared by the whole process.
pub trait Handler: Send + Sync + 'static {
    /// Whether events at `level` would be handled at all.
    fn enabled(&self, level: Level) -> bool;

    /// Handles one event.
    ///
    /// # Errors
    ///
    /// Returns [`HandleError::Write`] if the output could not be written.
    fn handle(&self, event: &LogEvent) -> Result<(), HandleError>;
}

struct Output<W> {
    sink: W,
    scratch: Vec<u8>,
}

/// Renders each event as a box-drawn, color-coded tree and writes it to a
/// sink in a single write.
///
/// Handlers derived through [`with_attrs`](Self::with_attrs) and
/// [`with_group`](Self::with_group) share the sink and its lock with the
/// handler they came from, so output from all of them never interleaves.
///
/// ```rust
/// use boxlog::{Attr, ColorChoice, Handler, HandlerOptions, Level, LogEvent, PrettyHandler};
///
/// let options = HandlerOptions::new()
///     .with_color(ColorChoice::Never)
///     .with_fixed_width(60);
/// let handler = PrettyHandler::new(Vec::new(), options)
///     .with_group("request")
///     .with_attrs([Attr::string("id", "7f3a")]);
///
/// handler
///     .handle(&LogEvent::new(Level::Info, "served").with_attr(Attr::int("status", 200)))
///     .unwrap();
/// ```
pub struct PrettyHandler<W> {
    options: HandlerOptions,
    renderer: Renderer,
    entries: Arc<Vec<Entry>>,
    output: Arc<Mutex<Output<W>>>,
    width_probe: Arc<dyn WidthProbe>,
    metrics: Arc<dyn MetricsSource>,
}

impl<W: Write + Send> PrettyHandler<W> {
    /// Creates a handler writing to `sink`.
    ///
    /// Colors are resolved once here. The width comes from
    /// [`HandlerOptions::fixed_width`] if set, otherwise from the terminal.
    pub fn new(sink: W, options: HandlerOptions) -> Self {
        let renderer = Renderer::new(
            options.glyphs,
            Styler::new(options.color.enabled()),
            options.add_source,
        );
        let width_probe = match options.fixed_width {
            Some(width) => Arc::new(FixedWidth(width)).unsize(unsize::Coercion!(to dyn WidthProbe)),
            None => Arc::new(TerminalWidth).unsize(unsize::Coercion!(to dyn WidthProbe)),
        };
        Self {
            options,
            renderer,
            entries: Arc::new(Vec::new()),
            output: Arc::new(Mutex::new(Output {
                sink,
                scratch: Vec::new(),
            })),
            width_probe,
            metrics: Arc::new(ProcessMetrics::new())
                .unsize(unsize::Coercion!(to dyn MetricsSource)),
        }
    }

    /// The options this handler was created with.
    pub fn options(&self) -> &HandlerOptions {
        &self.options
    }

    /// Replaces how the terminal width is discovered.
    pub fn with_width_probe(mut self, probe: impl WidthProbe) -> Self {
        self.width_probe = Arc::new(probe).unsize(unsize::Coercion!(to dyn WidthProbe));
        self
    }

    /// Replaces where the metrics panel takes its numbers from.
    pub fn with_metrics_source(mut self, source: impl MetricsSource) -> Self {
        self.metrics = Arc::new(source).unsize(unsize::Coercion!(to dyn MetricsSource));
        self
    }

    /// Returns a handler whose events carry `attrs` before their own entries.
    ///
    /// Empty attributes are dropped; if none remain, the result is a plain
    /// clone of `self`.
    pub fn with_attrs(&self, attrs: impl IntoIterator<Item = Attr>) -> Self {
        let mut attrs = attrs.into_iter().filter(|attr| !attr.is_empty()).peekable();
        if attrs.peek().is_none() {
            return self.clone();
        }
        self.with_entries(attrs.map(Entry::Attribute))
    }

    /// Returns a handler whose events, and attributes added later through
    /// [`with_attrs`](Self::with_attrs), are nested in a group named `name`.
    ///
    /// An empty name returns a plain clone of `self`.
    pub fn with_group(&self, name: &str) -> Self {
        if name.is_empty() {
            return self.clone();
        }
        self.with_entries([Entry::GroupMarker {
            name: name.to_owned(),
        }])
    }

    fn with_entries(&self, extra: impl IntoIterator<Item = Entry>) -> Self {
        let mut entries = Vec::clone(&self.entries);
        entries.extend(extra);
        Self {
            entries: Arc::new(entries),
            ..self.clone()
        }
    }

    /// Renders `event` at a fixed `width` without touching the sink.
    pub fn render_to_vec(&self, event: &LogEvent, width: usize) -> Vec<u8> {
        let mut out = Vec::new();
        self.render_into(event, width, &mut out);
        out
    }

    fn render_into(&self, event: &LogEvent, width: usize, out: &mut Vec<u8>) {
        let mut ctx = RenderContext::new(
            width,
            self.options.is_verbose(),
            &self.options.panel_tiers,
        );
        let sample = ctx.panel_tier().map(|_| self.metrics.snapshot());
        self.renderer
            .write_event(&self.entries, event, &mut ctx, sample.as_ref(), out);
    }

    fn probe_width(&self) -> usize {
        self.width_probe.probe().unwrap_or_else(|| {
            tracing::debug!(
                target: "boxlog",
                fallback = self.options.fallback_width,
                "terminal width unavailable, using the fallback width"
            );
            self.options.fallback_width
        })
    }
}

impl<W: Write + Send + 'static> PrettyHandler<W> {
    /// Creates a handler like [`new`](Self::new) and, when
    /// [`HandlerOptions::install_as_default`] is set, registers a clone of it
    /// as the process default handler.
    pub fn build(sink: W, options: HandlerOptions) -> Self {
        let handler = Self::new(sink, options);
        if options.install_as_default {
            register_default_handler(handler.clone());
            tracing::debug!(target: "boxlog", "installed default handler");
        }
        handler
    }
}

impl PrettyHandler<std::io::Stdout> {
    /// Builds a handler writing to standard output.
    pub fn stdout(options: HandlerOptions) -> Self {
        Self::build(std::io::stdout(), options)
    }
}

impl<W: Write + Send + 'static> Handler for PrettyHandler<W> {
    fn enabled(&self, level: Level) -> bool {
        level >= self.options.level
    }

    fn handle(&self, event: &LogEvent) -> Result<(), HandleError> {
        if !self.enabled(event.level) {
            return Ok(());
        }

        let mut output = self.output.lock();
        let Output { sink, scratch } = &mut *output;
        scratch.clear();
        let width = self.probe_width();
        self.render_into(event, width, scratch);
        sink.write_all(scratch)?;
        sink.flush()?;
        Ok(())
    }
}

impl<W> Clone for PrettyHandler<W> {
    fn clone(&self) -> Self {
        Self {
            options: self.options,
            renderer: self.renderer,
            entries: Arc::clone(&self.entries),
            output: Arc::clone(&self.output),
            width_probe: Arc::clone(&self.width_probe),
            metrics: Arc::clone(&self.metrics),
        }
    }
}

impl<W> fmt::Debug for PrettyHandler<W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PrettyHandler")
            .field("options", &self.options)
            .field("entries", &self.entries)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::io;

    use super::*;
    use crate::{metrics::MetricsSample, options::ColorChoice};

    static_assertions::assert_impl_all!(PrettyHandler<Vec<u8>>: Send, Sync, Clone, Handler);
    static_assertions::assert_obj_safe!(Handler);

    #[derive(Clone, Default)]
    struct Shared(std::sync::Arc<std::sync::Mutex<(Vec<u8>, usize)>>);

    impl Shared {
        fn text(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().0.clone()).unwrap()
        }

        fn writes(&self) -> usize {
            self.0.lock().unwrap().1
        }
    }

    impl Write for Shared {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            let mut inner = self.0.lock().unwrap();
            inner.0.extend_from_slice(buf);
            inner.1 += 1;
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    struct Broken;

    impl Write for Broken {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn options() -> HandlerOptions {
        HandlerOptions::new()
            .with_color(ColorChoice::Never)
            .with_fixed_width(80)
    }

    #[test]
    fn test_events_below_level_are_not_written() {
        let sink = Shared::default();
        let handler = PrettyHandler::new(sink.clone(), options().with_level(Level::Warn));

        assert!(!handler.enabled(Level::Info));
        handler.handle(&LogEvent::new(Level::Info, "ignored")).unwrap();
        assert_eq!(sink.writes(), 0);

        handler.handle(&LogEvent::new(Level::Error, "kept")).unwrap();
        assert_eq!(sink.writes(), 1);
        assert!(sink.text().contains("kept"));
    }

    #[test]
    fn test_with_group_nests_later_attrs() {
        let sink = Shared::default();
        let handler = PrettyHandler::new(sink.clone(), options())
            .with_attrs([Attr::string("service", "api")])
            .with_group("request")
            .with_attrs([Attr::string("id", "123")]);

        handler
            .handle(&LogEvent::new(Level::Info, "done").with_attr(Attr::int("status", 200)))
            .unwrap();
        let text = sink.text();
        let rows: Vec<&str> = text.lines().collect();

        assert!(rows[1].starts_with("├╼ service: \"api\""));
        assert!(rows[2].starts_with("├╼ 📂 GROUP: request"));
        assert!(rows[3].starts_with("│ ┣━━━╼ id: \"123\""));
        assert!(rows[4].starts_with("│ ┗━━━╼ status: 200"));
    }

    #[test]
    fn test_empty_derivations_are_clones() {
        let handler = PrettyHandler::new(Vec::new(), options());
        assert!(handler.with_group("").entries.is_empty());
        assert!(handler.with_attrs([]).entries.is_empty());
        assert!(handler.with_attrs([Attr::string("", "")]).entries.is_empty());
        assert_eq!(handler.with_group("g").entries.len(), 1);
    }

    #[test]
    fn test_derived_handlers_share_the_sink() {
        let sink = Shared::default();
        let parent = PrettyHandler::new(sink.clone(), options());
        let child = parent.with_group("child");
        parent.handle(&LogEvent::new(Level::Info, "one")).unwrap();
        child
            .handle(&LogEvent::new(Level::Info, "two").with_attr(Attr::int("n", 2)))
            .unwrap();
        assert_eq!(sink.writes(), 2);
        assert!(Arc::ptr_eq(&parent.output, &child.output));
    }

    #[test]
    fn test_sink_failure_is_reported() {
        let handler = PrettyHandler::new(Broken, options());
        let error = handler
            .handle(&LogEvent::new(Level::Error, "lost"))
            .unwrap_err();
        let HandleError::Write(io_error) = error;
        assert_eq!(io_error.kind(), io::ErrorKind::BrokenPipe);
    }

    #[test]
    fn test_probe_failure_uses_fallback_width() {
        let sink = Shared::default();
        let handler = PrettyHandler::new(sink.clone(), options().with_fallback_width(50))
            .with_width_probe(|| None::<usize>);
        handler.handle(&LogEvent::new(Level::Info, "narrow")).unwrap();
        let text = sink.text();
        let first = text.lines().next().unwrap();
        assert_eq!(crate::render::width::display_width(first), 50);
    }

    #[test]
    fn test_verbose_output_includes_panel() {
        let handler = PrettyHandler::new(Vec::new(), options().with_level(Level::Debug))
            .with_metrics_source(|| MetricsSample {
                active_workers: Some(3),
                ..MetricsSample::unknown()
            });
        let event = LogEvent::new(Level::Debug, "tick");
        let out = String::from_utf8(handler.render_to_vec(&event, 170)).unwrap();
        assert!(out.contains("Active threads: 3"));

        let narrow = String::from_utf8(handler.render_to_vec(&event, 120)).unwrap();
        assert!(!narrow.contains("Active threads"));
    }
}
