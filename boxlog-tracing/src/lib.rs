#![deny(
    missing_docs,
    unsafe_code,
    rustdoc::invalid_rust_codeblocks,
    rustdoc::broken_intra_doc_links,
    unused_doc_comments
)]

//! Render `tracing` events with boxlog.
//!
//! [`BoxLayer`] is a [`tracing_subscriber::Layer`] that turns every event
//! into a boxlog [`LogEvent`] and hands it to a [`PrettyHandler`]. The spans
//! an event happened in become groups, root first, each holding the fields
//! recorded on that span.
//!
//! # Quick Start
//!
//! ```
//! use boxlog_tracing::BoxLayer;
//! use tracing_subscriber::{Registry, layer::SubscriberExt};
//!
//! let subscriber = Registry::default().with(BoxLayer::from_env());
//! tracing::subscriber::set_global_default(subscriber).expect("failed to set subscriber");
//!
//! #[tracing::instrument(fields(user_id = 42))]
//! fn example() {
//!     tracing::warn!(attempt = 3, "retrying");
//! }
//! example();
//! ```
//!
//! Output:
//! ```text
//! ╭──[⚠️ WARN: retrying]──────────────────────────────[🕙 Oct 18 09:12:44]─╮
//! ├╼ 📂 GROUP: example                                                   │
//! │ ┣━━━╼ user_id: 42                                                    │
//! │ ┗━━━╼ attempt: 3                                                     │
//! ╰──────────────────────[SOURCE: src/main.rs:10]────────────────────────╯
//! ```
//!
//! # Environment Variables
//!
//! - `BOXLOG_TRACING` - Comma-separated options:
//!   - `no-spans` - Do not render the spans an event happened in
//!   - `target` - Add the event's target as a `target` attribute
//!
//! The handler built by [`BoxLayer::from_env`] additionally reads the
//! `BOXLOG_*` variables documented on [`HandlerOptions`].

use std::{
    fmt,
    io::Write,
    sync::{
        Arc, OnceLock,
        atomic::{AtomicBool, Ordering},
    },
};

use boxlog::{Attr, Handler, HandlerOptions, Level, LogEvent, PrettyHandler, SourceLocation};
use tracing::{
    Event, Subscriber,
    field::{Field, Visit},
    span,
};
use tracing_subscriber::{Layer, layer::Context, registry::LookupSpan};

/// Target prefix of boxlog's own diagnostics, never rendered by the layer.
const OWN_TARGET: &str = "boxlog";

/// Field values recorded on a span.
#[derive(Clone, Debug, Default)]
struct CapturedFields(Vec<Attr>);

/// Collects the fields of a span or event as attributes.
struct FieldVisitor<'a> {
    attrs: &'a mut Vec<Attr>,
    message: Option<&'a mut String>,
}

impl FieldVisitor<'_> {
    fn push(&mut self, attr: Attr) {
        self.attrs.push(attr);
    }
}

impl Visit for FieldVisitor<'_> {
    fn record_i64(&mut self, field: &Field, value: i64) {
        self.push(Attr::int(field.name(), value));
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.push(Attr::uint(field.name(), value));
    }

    fn record_f64(&mut self, field: &Field, value: f64) {
        self.push(Attr::float(field.name(), value));
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.push(Attr::bool(field.name(), value));
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message"
            && let Some(message) = self.message.as_deref_mut()
        {
            value.clone_into(message);
        } else {
            self.push(Attr::string(field.name(), value));
        }
    }

    fn record_error(&mut self, field: &Field, value: &(dyn std::error::Error + 'static)) {
        self.push(Attr::string(field.name(), value.to_string()));
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message"
            && let Some(message) = self.message.as_deref_mut()
        {
            *message = format!("{value:?}");
        } else {
            self.push(Attr::string(field.name(), format!("{value:?}")));
        }
    }
}

#[derive(Debug)]
struct BoxlogTracingEnvOptions {
    spans: bool,
    target: bool,
}

impl BoxlogTracingEnvOptions {
    fn get() -> &'static Self {
        static BOXLOG_TRACING_FLAGS: OnceLock<BoxlogTracingEnvOptions> = OnceLock::new();

        BOXLOG_TRACING_FLAGS.get_or_init(|| {
            let mut options = BoxlogTracingEnvOptions {
                spans: true,
                target: false,
            };

            if let Some(var) = std::env::var_os("BOXLOG_TRACING") {
                for v in var.to_string_lossy().split(',') {
                    let v = v.trim();
                    if v.eq_ignore_ascii_case("no-spans") {
                        options.spans = false;
                    } else if v.eq_ignore_ascii_case("target") {
                        options.target = true;
                    }
                }
            }

            options
        })
    }
}

/// Maps a `tracing` level onto a boxlog [`Level`].
///
/// boxlog has no trace level, so `TRACE` renders as debug.
pub fn level_from_tracing(level: &tracing::Level) -> Level {
    if *level == tracing::Level::ERROR {
        Level::Error
    } else if *level == tracing::Level::WARN {
        Level::Warn
    } else if *level == tracing::Level::INFO {
        Level::Info
    } else {
        Level::Debug
    }
}

/// A tracing layer rendering events through a [`PrettyHandler`].
///
/// Spans are always recorded so their fields are available to later events;
/// events are rendered when the handler accepts their level.
///
/// `tracing` gives a layer no way to return errors. The first event the sink
/// fails to take is reported on stderr; later failures are dropped silently.
/// [`BoxLayer::write_failed`] tells whether that has happened.
///
/// # Examples
///
/// ```
/// use boxlog::{ColorChoice, HandlerOptions, Level, PrettyHandler};
/// use boxlog_tracing::BoxLayer;
/// use tracing_subscriber::{Registry, layer::SubscriberExt};
///
/// let handler = PrettyHandler::new(
///     std::io::stderr(),
///     HandlerOptions::new()
///         .with_level(Level::Debug)
///         .with_color(ColorChoice::Never),
/// );
/// let subscriber = Registry::default().with(BoxLayer::new(handler));
/// tracing::subscriber::with_default(subscriber, || {
///     tracing::debug!(cache = "warm", "ready");
/// });
/// ```
#[derive(Debug)]
pub struct BoxLayer<W> {
    handler: PrettyHandler<W>,
    spans: bool,
    target: bool,
    write_failed: Arc<AtomicBool>,
}

impl<W> Clone for BoxLayer<W> {
    fn clone(&self) -> Self {
        Self {
            handler: self.handler.clone(),
            spans: self.spans,
            target: self.target,
            write_failed: Arc::clone(&self.write_failed),
        }
    }
}

impl<W: Write + Send + 'static> BoxLayer<W> {
    /// Creates a layer rendering through `handler`.
    ///
    /// Span and target rendering follow `BOXLOG_TRACING`.
    pub fn new(handler: PrettyHandler<W>) -> Self {
        let env_options = BoxlogTracingEnvOptions::get();
        Self {
            handler,
            spans: env_options.spans,
            target: env_options.target,
            write_failed: Arc::default(),
        }
    }

    /// Whether events show the spans they happened in.
    pub fn with_spans(mut self, spans: bool) -> Self {
        self.spans = spans;
        self
    }

    /// Whether events carry their target as an attribute.
    pub fn with_target(mut self, target: bool) -> Self {
        self.target = target;
        self
    }

    /// Whether the sink has rejected an event since this layer was created.
    /// Clones of a layer share the flag.
    pub fn write_failed(&self) -> bool {
        self.write_failed.load(Ordering::Relaxed)
    }

    fn report_failure(&self, error: &boxlog::HandleError) {
        if !self.write_failed.swap(true, Ordering::Relaxed) {
            eprintln!("boxlog-tracing: failed to write log event: {error}");
        }
    }

    /// The handler events are rendered through.
    pub fn handler(&self) -> &PrettyHandler<W> {
        &self.handler
    }

    fn build_event<S>(&self, event: &Event<'_>, level: Level, ctx: &Context<'_, S>) -> LogEvent
    where
        S: Subscriber + for<'a> LookupSpan<'a>,
    {
        let metadata = event.metadata();
        let mut message = String::new();
        let mut fields = Vec::new();
        event.record(&mut FieldVisitor {
            attrs: &mut fields,
            message: Some(&mut message),
        });

        let mut log_event = LogEvent::new(level, message).timestamped_now();
        if let (Some(file), Some(line)) = (metadata.file(), metadata.line()) {
            log_event = log_event.with_source(SourceLocation::new(file, line));
        }
        if self.target {
            log_event = log_event.with_attr(Attr::string("target", metadata.target()));
        }

        if self.spans
            && let Some(scope) = ctx.event_scope(event)
        {
            for span in scope.from_root() {
                log_event = log_event.with_group(span.name());
                if let Some(captured) = span.extensions().get::<CapturedFields>() {
                    log_event = log_event.with_attrs(captured.0.iter().cloned());
                }
            }
        }

        log_event.with_attrs(fields)
    }
}

impl BoxLayer<std::io::Stdout> {
    /// A layer writing to stdout, configured from the `BOXLOG_*` environment
    /// variables.
    pub fn from_env() -> Self {
        Self::new(PrettyHandler::new(std::io::stdout(), HandlerOptions::from_env()))
    }
}

impl<S, W> Layer<S> for BoxLayer<W>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    W: Write + Send + 'static,
{
    fn on_new_span(&self, attrs: &span::Attributes<'_>, id: &span::Id, ctx: Context<'_, S>) {
        let Some(span) = ctx.span(id) else {
            return;
        };
        let mut captured = CapturedFields::default();
        attrs.record(&mut FieldVisitor {
            attrs: &mut captured.0,
            message: None,
        });
        span.extensions_mut().insert(captured);
    }

    fn on_record(&self, id: &span::Id, values: &span::Record<'_>, ctx: Context<'_, S>) {
        let Some(span) = ctx.span(id) else {
            return;
        };
        let mut extensions = span.extensions_mut();
        match extensions.get_mut::<CapturedFields>() {
            Some(captured) => values.record(&mut FieldVisitor {
                attrs: &mut captured.0,
                message: None,
            }),
            None => {
                let mut captured = CapturedFields::default();
                values.record(&mut FieldVisitor {
                    attrs: &mut captured.0,
                    message: None,
                });
                extensions.insert(captured);
            }
        }
    }

    fn on_event(&self, event: &Event<'_>, ctx: Context<'_, S>) {
        let metadata = event.metadata();
        if metadata.target().starts_with(OWN_TARGET) {
            return;
        }
        let level = level_from_tracing(metadata.level());
        if !self.handler.enabled(level) {
            return;
        }

        let log_event = self.build_event(event, level, &ctx);
        if let Err(error) = self.handler.handle(&log_event) {
            self.report_failure(&error);
        }
    }
}
