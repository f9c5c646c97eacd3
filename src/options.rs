//! Handler configuration.
//!
//! [`HandlerOptions`] is a plain value with `const` defaults and chainable
//! setters. It can also be read from the environment:
//!
//! | Variable        | Meaning                                               |
//! |-----------------|-------------------------------------------------------|
//! | `BOXLOG_LEVEL`  | Minimum level; unknown names fall back to `info`      |
//! | `BOXLOG_SOURCE` | `0`, `false`, `no` or `off` disable source locations  |
//! | `BOXLOG_COLOR`  | `always`, `never` or `auto`                           |
//! | `BOXLOG_WIDTH`  | Fixed width instead of probing the terminal           |

use std::ffi::OsString;

use is_terminal::IsTerminal as _;

use crate::{event::Level, metrics::PanelTiers, render::Glyphs};

/// When to emit ANSI colors.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum ColorChoice {
    /// Colors when stdout is a terminal and `NO_COLOR` is unset
    #[default]
    Auto,
    /// Always emit colors
    Always,
    /// Never emit colors
    Never,
}

impl ColorChoice {
    /// Resolves `Auto` against the current process.
    pub fn enabled(self) -> bool {
        match self {
            ColorChoice::Always => true,
            ColorChoice::Never => false,
            ColorChoice::Auto => {
                std::env::var_os("NO_COLOR").is_none_or(|value| value.is_empty())
                    && std::io::stdout().is_terminal()
            }
        }
    }

    fn from_name(name: &str) -> Option<Self> {
        let name = name.trim();
        if name.eq_ignore_ascii_case("auto") {
            Some(ColorChoice::Auto)
        } else if name.eq_ignore_ascii_case("always") {
            Some(ColorChoice::Always)
        } else if name.eq_ignore_ascii_case("never") {
            Some(ColorChoice::Never)
        } else {
            None
        }
    }
}

/// Configuration of a [`PrettyHandler`](crate::PrettyHandler).
///
/// ```rust
/// use boxlog::{ColorChoice, HandlerOptions, Level};
///
/// let options = HandlerOptions::new()
///     .with_level_name("warn")
///     .with_source(false)
///     .with_color(ColorChoice::Never);
/// assert_eq!(options.level, Level::Warn);
/// assert!(!options.is_verbose());
///
/// let fallback = HandlerOptions::new().with_level_name("chatty");
/// assert_eq!(fallback.level, Level::Info);
/// ```
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct HandlerOptions {
    /// Events below this level are discarded
    pub level: Level,
    /// Whether the bottom border shows the source location
    pub add_source: bool,
    /// Verbose mode; `None` means verbose exactly when `level` is debug
    pub verbose: Option<bool>,
    /// When to emit colors
    pub color: ColorChoice,
    /// Border and icon glyphs
    pub glyphs: Glyphs,
    /// Breakpoints for the metrics panel
    pub panel_tiers: PanelTiers,
    /// Width used when the terminal cannot be probed
    pub fallback_width: usize,
    /// Width used instead of probing, if set
    pub fixed_width: Option<usize>,
    /// Whether [`PrettyHandler::build`](crate::PrettyHandler::build) also
    /// installs the handler as the process default
    pub install_as_default: bool,
}

impl HandlerOptions {
    /// Info level, sources shown, automatic colors, Unicode glyphs and an
    /// 80 column fallback.
    pub const DEFAULT: Self = Self {
        level: Level::Info,
        add_source: true,
        verbose: None,
        color: ColorChoice::Auto,
        glyphs: Glyphs::DEFAULT,
        panel_tiers: PanelTiers::DEFAULT,
        fallback_width: 80,
        fixed_width: None,
        install_as_default: false,
    };

    /// Same as [`DEFAULT`](Self::DEFAULT).
    pub const fn new() -> Self {
        Self::DEFAULT
    }

    /// Defaults overridden by the `BOXLOG_*` environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var_os(name))
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<OsString>) -> Self {
        let var = |name: &str| lookup(name).map(|value| value.to_string_lossy().into_owned());
        let mut options = Self::DEFAULT;

        if let Some(level) = var("BOXLOG_LEVEL") {
            options = options.with_level_name(&level);
        }
        if let Some(source) = var("BOXLOG_SOURCE") {
            let source = source.trim();
            options.add_source = !["0", "false", "no", "off"]
                .iter()
                .any(|off| source.eq_ignore_ascii_case(off));
        }
        if let Some(color) = var("BOXLOG_COLOR") {
            match ColorChoice::from_name(&color) {
                Some(choice) => options.color = choice,
                None => tracing::debug!(target: "boxlog", %color, "ignoring unknown BOXLOG_COLOR"),
            }
        }
        if let Some(width) = var("BOXLOG_WIDTH") {
            match width.trim().parse::<usize>() {
                Ok(width) if width > 0 => options.fixed_width = Some(width),
                _ => tracing::debug!(target: "boxlog", %width, "ignoring invalid BOXLOG_WIDTH"),
            }
        }
        options
    }

    /// Sets the minimum level.
    pub const fn with_level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    /// Sets the minimum level by name, falling back to info for unknown
    /// names.
    pub fn with_level_name(self, name: &str) -> Self {
        let level = name.parse().unwrap_or_else(|error| {
            tracing::debug!(target: "boxlog", %error, "falling back to the info level");
            Level::Info
        });
        self.with_level(level)
    }

    /// Enables or disables source locations.
    pub const fn with_source(mut self, add_source: bool) -> Self {
        self.add_source = add_source;
        self
    }

    /// Forces verbose mode on or off regardless of the level.
    pub const fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = Some(verbose);
        self
    }

    /// Sets the color choice.
    pub const fn with_color(mut self, color: ColorChoice) -> Self {
        self.color = color;
        self
    }

    /// Sets the glyph set.
    pub const fn with_glyphs(mut self, glyphs: Glyphs) -> Self {
        self.glyphs = glyphs;
        self
    }

    /// Sets the metrics panel breakpoints.
    pub const fn with_panel_tiers(mut self, panel_tiers: PanelTiers) -> Self {
        self.panel_tiers = panel_tiers;
        self
    }

    /// Sets the width used when probing fails.
    pub const fn with_fallback_width(mut self, width: usize) -> Self {
        self.fallback_width = width;
        self
    }

    /// Uses a fixed width instead of probing the terminal.
    pub const fn with_fixed_width(mut self, width: usize) -> Self {
        self.fixed_width = Some(width);
        self
    }

    /// Requests installation as the process default handler on build.
    pub const fn install_as_default(mut self, install: bool) -> Self {
        self.install_as_default = install;
        self
    }

    /// Whether events render in verbose mode.
    pub fn is_verbose(&self) -> bool {
        self.verbose.unwrap_or(self.level == Level::Debug)
    }
}

impl Default for HandlerOptions {
    fn default() -> Self {
        Self::DEFAULT
    }
}
