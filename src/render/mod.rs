//! Turning a [`LogEvent`] into box-drawn terminal output.
//!
//! Rendering is split in two passes:
//! - [`Renderer::render`] lays the event out as a list of [`RenderedLine`]s,
//!   each tagged with a [`LineRole`] and its depth in the attribute tree
//! - [`Serializer`] frames and pads those lines into bytes, every row exactly
//!   as wide as the box
//!
//! ```rust
//! use boxlog::{
//!     Attr, Level, LogEvent,
//!     render::{Glyphs, RenderContext, Renderer, Serializer, Styler},
//! };
//!
//! let event = LogEvent::new(Level::Info, "ready").with_attr(Attr::int("port", 8080));
//! let renderer = Renderer::new(Glyphs::UNICODE, Styler::new(false), false);
//! let mut ctx = RenderContext::fixed(40);
//! let lines = renderer.render(&event, &mut ctx);
//! let out = Serializer::new(Glyphs::UNICODE).serialize(&lines, ctx.box_width());
//!
//! let text = String::from_utf8(out).unwrap();
//! assert!(text.starts_with("╭──[🌐 INFO: ready]"));
//! assert!(text.contains("├╼ port: 8080"));
//! ```

mod layout;
mod line;
mod serialize;
mod style;
pub mod width;
mod wrap;

use hashbrown::HashMap;
use rustc_hash::FxBuildHasher;

pub use self::{
    line::{ItemPosition, LineRole, RenderedLine},
    serialize::Serializer,
    style::{Glyphs, Styler},
    wrap::{BREAK_DELIMITERS, Wrap, wrap},
};
use crate::{
    event::{Entry, LogEvent},
    metrics::{MetricsSample, PanelTier, PanelTiers, panel},
};

/// Narrowest box the renderer draws, whatever the terminal reports.
pub const MIN_WIDTH: usize = 20;

/// Per-call layout state.
///
/// Built fresh for every event from the probed terminal width; nothing in it
/// outlives one render.
#[derive(Clone, Debug)]
pub struct RenderContext {
    terminal_width: usize,
    box_width: usize,
    side_panel_width: usize,
    panel_tier: Option<PanelTier>,
    verbose: bool,
    continuation_active: HashMap<usize, bool, FxBuildHasher>,
}

impl RenderContext {
    /// Creates a context for a terminal `terminal_width` cells wide.
    ///
    /// In verbose mode the terminal may be split between the event box and
    /// the metrics panel according to `tiers`.
    pub fn new(terminal_width: usize, verbose: bool, tiers: &PanelTiers) -> Self {
        let terminal_width = terminal_width.max(MIN_WIDTH);
        let layout = verbose.then(|| tiers.select(terminal_width)).flatten();
        let (box_width, side_panel_width, panel_tier) = match layout {
            Some(layout) => (layout.box_width, layout.panel_width, Some(layout.tier)),
            None => (terminal_width, 0, None),
        };
        Self {
            terminal_width,
            box_width: box_width.max(MIN_WIDTH),
            side_panel_width,
            panel_tier,
            verbose,
            continuation_active: HashMap::with_hasher(FxBuildHasher),
        }
    }

    /// A non-verbose context drawing a box exactly `width` cells wide.
    pub fn fixed(width: usize) -> Self {
        Self::new(width, false, &PanelTiers::DISABLED)
    }

    /// Terminal width the context was built for.
    pub fn terminal_width(&self) -> usize {
        self.terminal_width
    }

    /// Width of the event box.
    pub fn box_width(&self) -> usize {
        self.box_width
    }

    /// Width available between the box's side borders.
    pub fn inner_width(&self) -> usize {
        self.box_width - 2
    }

    /// Width of the metrics panel, zero when it is not shown.
    pub fn side_panel_width(&self) -> usize {
        self.side_panel_width
    }

    /// Panel tier in use, if the panel is shown.
    pub fn panel_tier(&self) -> Option<PanelTier> {
        self.panel_tier
    }

    /// Whether the event is rendered in verbose mode.
    pub fn verbose(&self) -> bool {
        self.verbose
    }

    /// Whether the branch at `depth` still has siblings to draw.
    pub fn is_continuation_active(&self, depth: usize) -> bool {
        self.continuation_active
            .get(&depth)
            .copied()
            .unwrap_or(false)
    }

    pub(crate) fn set_continuation(&mut self, depth: usize, active: bool) {
        self.continuation_active.insert(depth, active);
    }
}

/// Lays events out with a fixed glyph set and color choice.
#[derive(Copy, Clone, Debug)]
pub struct Renderer {
    glyphs: Glyphs,
    styler: Styler,
    show_source: bool,
}

impl Renderer {
    /// Creates a renderer. `show_source` controls whether the bottom border
    /// carries the event's source location.
    pub const fn new(glyphs: Glyphs, styler: Styler, show_source: bool) -> Self {
        Self {
            glyphs,
            styler,
            show_source,
        }
    }

    /// The glyph set.
    pub const fn glyphs(&self) -> &Glyphs {
        &self.glyphs
    }

    /// The styler.
    pub const fn styler(&self) -> &Styler {
        &self.styler
    }

    /// Whether the source location is rendered.
    pub const fn shows_source(&self) -> bool {
        self.show_source
    }

    /// Lays out `event`.
    pub fn render(&self, event: &LogEvent, ctx: &mut RenderContext) -> Vec<RenderedLine> {
        self.render_with(&[], event, ctx)
    }

    /// Lays out `event` with `inherited` entries placed before its own.
    pub fn render_with(
        &self,
        inherited: &[Entry],
        event: &LogEvent,
        ctx: &mut RenderContext,
    ) -> Vec<RenderedLine> {
        layout::layout(self, inherited, event, ctx)
    }

    /// Lays out the metrics panel for the tier selected in `ctx`.
    pub fn render_panel(&self, sample: &MetricsSample, ctx: &RenderContext) -> Vec<RenderedLine> {
        match ctx.panel_tier() {
            Some(tier) => panel::layout(
                sample,
                tier,
                ctx.side_panel_width(),
                &self.glyphs,
                &self.styler,
            ),
            None => Vec::new(),
        }
    }

    /// Renders and serializes `event`, then the metrics panel if the context
    /// selected one and a sample is given, appending everything to `out`.
    pub fn write_event(
        &self,
        inherited: &[Entry],
        event: &LogEvent,
        ctx: &mut RenderContext,
        metrics: Option<&MetricsSample>,
        out: &mut Vec<u8>,
    ) {
        let serializer = Serializer::new(self.glyphs);
        let lines = self.render_with(inherited, event, ctx);
        serializer.serialize_into(&lines, ctx.box_width(), out);

        if let (Some(tier), Some(sample)) = (ctx.panel_tier(), metrics) {
            out.extend(core::iter::repeat_n(b'\n', tier.blank_lines_before()));
            let panel = self.render_panel(sample, ctx);
            serializer.serialize_into(&panel, ctx.side_panel_width(), out);
        }
    }
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new(Glyphs::DEFAULT, Styler::new(false), true)
    }
}
