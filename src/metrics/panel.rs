//! The runtime metrics panel shown beside verbose output on wide terminals.
//!
//! Which layout is used depends on the terminal width, see [`PanelTiers`].
//! The panel is a second box appended below the event box; its rows are
//! built here and serialized by the same
//! [`Serializer`](crate::render::Serializer) as the event itself.

use core::time::Duration;

use indexmap::IndexMap;
use rustc_hash::FxBuildHasher;

use crate::{
    metrics::MetricsSample,
    render::{
        Glyphs, LineRole, RenderedLine, Styler,
        width::{display_width, pad_right, truncate_styled},
    },
};

const NOT_AVAILABLE: &str = "n/a";
const MIB: f64 = 1024.0 * 1024.0;

/// How much of the panel fits next to the event box.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum PanelTier {
    /// One metric group per row block
    Compact,
    /// Two metric groups side by side
    Paired,
    /// Three metric groups side by side
    Full,
}

impl PanelTier {
    /// Number of metric groups placed side by side.
    pub const fn columns(self) -> usize {
        match self {
            PanelTier::Compact => 1,
            PanelTier::Paired => 2,
            PanelTier::Full => 3,
        }
    }

    /// Blank lines written between the event box and the panel.
    pub const fn blank_lines_before(self) -> usize {
        match self {
            PanelTier::Compact => 0,
            PanelTier::Paired => 1,
            PanelTier::Full => 2,
        }
    }
}

/// Box and panel widths chosen for one terminal width.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct PanelLayout {
    /// Selected tier
    pub tier: PanelTier,
    /// Width of the event box
    pub box_width: usize,
    /// Width of the metrics panel
    pub panel_width: usize,
}

/// Width breakpoints selecting a [`PanelTier`].
///
/// ```rust
/// use boxlog::metrics::{PanelTier, PanelTiers};
///
/// let tiers = PanelTiers::DEFAULT;
/// assert_eq!(tiers.select(120), None);
/// assert_eq!(tiers.select(170).map(|layout| layout.tier), Some(PanelTier::Compact));
/// assert_eq!(tiers.select(190).map(|layout| layout.box_width), Some(110));
/// assert_eq!(tiers.select(300).map(|layout| layout.box_width), Some(150));
/// ```
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct PanelTiers {
    /// The panel is shown only on terminals wider than this
    pub min_terminal_width: usize,
    /// Widest terminal using [`PanelTier::Compact`]
    pub compact_max_width: usize,
    /// Widest terminal using [`PanelTier::Paired`]
    pub paired_max_width: usize,
}

impl PanelTiers {
    /// Breakpoints at 158, 180 and 200 columns.
    pub const DEFAULT: Self = Self {
        min_terminal_width: 158,
        compact_max_width: 180,
        paired_max_width: 200,
    };
    /// Tiers that never show the panel.
    pub const DISABLED: Self = Self {
        min_terminal_width: usize::MAX,
        compact_max_width: usize::MAX,
        paired_max_width: usize::MAX,
    };

    /// Chooses the layout for `terminal_width`, or `None` when the terminal
    /// is too narrow for a panel.
    pub fn select(&self, terminal_width: usize) -> Option<PanelLayout> {
        if terminal_width <= self.min_terminal_width {
            return None;
        }
        let layout = if terminal_width <= self.compact_max_width {
            PanelLayout {
                tier: PanelTier::Compact,
                box_width: 100,
                panel_width: 50,
            }
        } else if terminal_width <= self.paired_max_width {
            PanelLayout {
                tier: PanelTier::Paired,
                box_width: terminal_width.saturating_sub(80),
                panel_width: 75,
            }
        } else {
            PanelLayout {
                tier: PanelTier::Full,
                box_width: terminal_width / 2,
                panel_width: 100,
            }
        };
        Some(layout)
    }
}

impl Default for PanelTiers {
    fn default() -> Self {
        Self::DEFAULT
    }
}

type MetricGroups = IndexMap<&'static str, Vec<String>, FxBuildHasher>;

/// Groups the sample's values under their titles, in display order.
fn metric_groups(sample: &MetricsSample) -> MetricGroups {
    let mut groups = MetricGroups::default();
    groups.insert(
        "🌀 Workers",
        vec![format!("Active threads: {}", or_na(sample.active_workers))],
    );
    groups.insert(
        "💾 Memory",
        vec![
            format!("Resident: {}", mebibytes(sample.heap_bytes)),
            format!("Virtual: {}", mebibytes(sample.total_alloc_bytes)),
        ],
    );
    groups.insert(
        "🕙 Collector",
        vec![
            format!("Collections: {}", or_na(sample.gc_count)),
            format!("Pause total: {}", duration(sample.gc_pause_total)),
        ],
    );
    groups.insert(
        "🧠 CPU",
        vec![
            format!("CPUs: {}", sample.cpu_count),
            format!("Parallelism: {}", sample.scheduler_parallelism),
        ],
    );
    groups
}

fn or_na(value: Option<impl ToString>) -> String {
    value.map_or_else(|| NOT_AVAILABLE.to_owned(), |value| value.to_string())
}

fn mebibytes(bytes: Option<u64>) -> String {
    bytes.map_or_else(
        || NOT_AVAILABLE.to_owned(),
        |bytes| format!("{:.1} MiB", bytes as f64 / MIB),
    )
}

fn duration(value: Option<Duration>) -> String {
    value.map_or_else(|| NOT_AVAILABLE.to_owned(), |value| format!("{value:?}"))
}

/// Lays the panel out for `tier` in a box `width` cells wide.
pub fn layout(
    sample: &MetricsSample,
    tier: PanelTier,
    width: usize,
    glyphs: &Glyphs,
    styler: &Styler,
) -> Vec<RenderedLine> {
    let rule = glyphs.rule;
    let mut lines = vec![RenderedLine::new(
        LineRole::PanelBorder { top: true },
        0,
        format!("{rule}{rule}[{}]", styler.label("runtime")),
    )];

    let groups = metric_groups(sample);
    let columns = tier.columns();
    let column_width = width.saturating_sub(3) / columns;
    let blocks: Vec<_> = groups.iter().collect();
    let block_count = blocks.chunks(columns).len();

    for (block_index, block) in blocks.chunks(columns).enumerate() {
        let height = block
            .iter()
            .map(|(_, values)| values.len() + 1)
            .max()
            .unwrap_or(0);
        for row in 0..height {
            let mut text = String::from(" ");
            for (title, values) in block {
                let cell = match row {
                    0 => styler.label(title),
                    _ => values
                        .get(row - 1)
                        .map(|value| format!("  {value}"))
                        .unwrap_or_default(),
                };
                let mut cell = if display_width(&cell) >= column_width {
                    truncate_styled(&cell, column_width.saturating_sub(1))
                } else {
                    cell
                };
                pad_right(&mut cell, column_width, ' ');
                text.push_str(&cell);
            }
            lines.push(RenderedLine::new(LineRole::PanelRow, 0, text));
        }
        if block_index + 1 < block_count {
            lines.push(RenderedLine::new(LineRole::PanelRow, 0, ""));
        }
    }

    lines.push(RenderedLine::new(
        LineRole::PanelBorder { top: false },
        0,
        "",
    ));
    lines
}
