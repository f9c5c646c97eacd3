//! Glyph sets and colors used when drawing an event.
//!
//! Two glyph presets are provided:
//! - **Unicode** ([`Glyphs::UNICODE`]) - rounded box borders, heavy tree
//!   connectors and emoji icons
//! - **ASCII** ([`Glyphs::ASCII`]) - plain ASCII substitutes for terminals
//!   and files without box-drawing support
//!
//! Colors are applied by [`Styler`], which can be switched off entirely.
//!
//! ```rust
//! use boxlog::render::{Glyphs, Styler};
//!
//! let styler = Styler::new(false);
//! assert_eq!(styler.key(0, "op"), "op");
//! assert_eq!(Glyphs::ASCII.branch, "|---");
//! ```

use owo_colors::{OwoColorize, Style};

use crate::event::Level;

/// Characters and icons used by the layout engine and the serializer.
///
/// Every connector and border glyph must be exactly one terminal cell wide,
/// except [`branch`](Self::branch) and [`corner`](Self::corner) which are four
/// and [`bullet`](Self::bullet) which is two.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Glyphs {
    /// Top-left corner of a box
    pub top_left: &'static str,
    /// Top-right corner of a box
    pub top_right: &'static str,
    /// Bottom-left corner of a box
    pub bottom_left: &'static str,
    /// Bottom-right corner of a box
    pub bottom_right: &'static str,
    /// Fill character of horizontal borders
    pub rule: char,
    /// Left border of a top-level item or group header
    pub tee: &'static str,
    /// Vertical border on every other row
    pub side: &'static str,
    /// Connector for an entry with siblings below it
    pub branch: &'static str,
    /// Connector for the last entry of a group
    pub corner: &'static str,
    /// Vertical bar continuing an open branch
    pub rail: &'static str,
    /// Marker placed right before a key
    pub bullet: &'static str,
    /// Stands in for the key on continuation rows
    pub placeholder: &'static str,
    /// Replaces the dropped head of a truncated source path
    pub ellipsis: &'static str,
    /// Marks a line cut at the right border
    pub overflow: &'static str,
    /// Icon of a scope group opened by a group marker
    pub scope_icon: &'static str,
    /// Icon of a nested group value
    pub group_icon: &'static str,
    /// Icon in front of the timestamp
    pub clock_icon: &'static str,
    /// Level icons, indexed by severity from debug to error
    pub level_icons: [&'static str; 4],
    /// Annotations of a structured value: first, middle and last line
    pub struct_marks: [&'static str; 3],
    /// Annotations of a wrapped value: first, second, middle and last line
    pub wrap_marks: [&'static str; 4],
}

impl Glyphs {
    /// Plain ASCII glyphs.
    pub const ASCII: Self = Self {
        top_left: "+",
        top_right: "+",
        bottom_left: "+",
        bottom_right: "+",
        rule: '-',
        tee: "|",
        side: "|",
        branch: "|---",
        corner: "`---",
        rail: "|",
        bullet: "> ",
        placeholder: "~",
        ellipsis: "...",
        overflow: ">",
        scope_icon: "#",
        group_icon: "+",
        clock_icon: "@",
        level_icons: ["(d)", "(i)", "(!)", "(x)"],
        struct_marks: ["+ struct", "|", "+"],
        wrap_marks: ["+ line", "| wrap", "|", "+"],
    };
    /// The default glyph set, an alias for [`UNICODE`](Self::UNICODE).
    pub const DEFAULT: Self = Self::UNICODE;
    /// Rounded box-drawing borders, heavy connectors and emoji icons.
    pub const UNICODE: Self = Self {
        top_left: "╭",
        top_right: "╮",
        bottom_left: "╰",
        bottom_right: "╯",
        rule: '─',
        tee: "├",
        side: "│",
        branch: "┣━━━",
        corner: "┗━━━",
        rail: "┃",
        bullet: "╼ ",
        placeholder: "⸗",
        ellipsis: "...",
        overflow: "…",
        scope_icon: "📂",
        group_icon: "📦",
        clock_icon: "🕙",
        level_icons: ["🔧", "🌐", "⚠️", "🛑"],
        struct_marks: ["╕ struct", "│", "╛"],
        wrap_marks: ["╕ line", "│ wrap", "│", "╛"],
    };

    /// Icon shown next to the level name.
    pub const fn level_icon(&self, level: Level) -> &'static str {
        self.level_icons[level.index()]
    }
}

impl Default for Glyphs {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Applies colors to keys, levels and labels.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Styler {
    colored: bool,
}

impl Styler {
    /// Creates a styler; with `colored == false` all text passes through
    /// untouched.
    pub const fn new(colored: bool) -> Self {
        Self { colored }
    }

    /// Whether this styler emits escape sequences.
    pub const fn is_colored(&self) -> bool {
        self.colored
    }

    /// Color of keys at `depth`, cycling through an eight entry palette.
    pub fn depth_style(depth: usize) -> Style {
        let style = Style::new();
        match depth % 8 {
            0 => style.bright_green(),
            1 => style.bright_yellow(),
            2 => style.bright_cyan(),
            3 => style.bright_magenta(),
            4 => style.bright_blue(),
            5 => style.bright_red(),
            6 => style.bright_black(),
            _ => style.bright_white(),
        }
    }

    /// Color of the level badge.
    pub fn level_style(level: Level) -> Style {
        let style = Style::new().bold();
        match level {
            Level::Debug => style.bright_magenta(),
            Level::Info => style.bright_blue(),
            Level::Warn => style.bright_yellow(),
            Level::Error => style.bright_red(),
        }
    }

    /// The `(icon, style)` pair used for `level` with the given glyph set.
    pub fn level_badge(level: Level, glyphs: &Glyphs) -> (&'static str, Style) {
        (glyphs.level_icon(level), Self::level_style(level))
    }

    /// Paints `text` with `style` when colors are enabled.
    pub fn paint(&self, text: &str, style: Style) -> String {
        if self.colored {
            text.style(style).to_string()
        } else {
            text.to_owned()
        }
    }

    /// A key colored for its depth.
    pub fn key(&self, depth: usize, key: &str) -> String {
        self.paint(key, Self::depth_style(depth))
    }

    /// The level name colored for its severity.
    pub fn level(&self, level: Level) -> String {
        self.paint(level.as_str(), Self::level_style(level))
    }

    /// Bold white label text such as `GROUP` or `SOURCE`.
    pub fn label(&self, text: &str) -> String {
        self.paint(text, Style::new().bold().bright_white())
    }

    /// Dimmed text for decorations such as annotations.
    pub fn dim(&self, text: &str) -> String {
        self.paint(text, Style::new().dimmed())
    }
}
