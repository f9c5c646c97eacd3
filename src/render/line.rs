//! The intermediate line representation between layout and serialization.

/// Where an entry sits among its siblings.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ItemPosition {
    /// The sole child of its parent
    Only,
    /// First of several siblings
    First,
    /// Neither first nor last
    Middle,
    /// Last of several siblings
    Last,
}

impl ItemPosition {
    /// Position of the child at `index` among `len` siblings.
    pub const fn of(index: usize, len: usize) -> Self {
        let is_first = index == 0;
        let is_last = index + 1 >= len;
        match (is_first, is_last) {
            (true, true) => ItemPosition::Only,
            (true, false) => ItemPosition::First,
            (false, false) => ItemPosition::Middle,
            (false, true) => ItemPosition::Last,
        }
    }

    /// Whether no sibling follows, so the branch closes here.
    pub const fn is_last(self) -> bool {
        matches!(self, ItemPosition::Only | ItemPosition::Last)
    }
}

/// What a [`RenderedLine`] represents; selects its border glyphs and fill.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum LineRole {
    /// First line of the event box with level, message and timestamp
    TopBorder,
    /// Header line opening a group
    GroupHeader {
        /// Position of the group among its siblings
        position: ItemPosition,
    },
    /// First line of an attribute
    Item {
        /// Position of the attribute among its siblings
        position: ItemPosition,
    },
    /// Second and later lines of a wrapped or structured attribute
    WrappedContinuation {
        /// Position of the attribute among its siblings
        position: ItemPosition,
    },
    /// Last line of the event box, optionally carrying the source location
    BottomBorder,
    /// Top or bottom border of the metrics panel
    PanelBorder {
        /// `true` for the top border
        top: bool,
    },
    /// Content row of the metrics panel
    PanelRow,
}

/// One line of output before padding and border glyphs are applied.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RenderedLine {
    /// Styled content, possibly containing ANSI escapes
    pub text: String,
    /// What this line represents
    pub role: LineRole,
    /// Nesting depth of the entry, zero for top-level entries and borders
    pub depth: usize,
    /// Optional tag right-aligned inside the box
    pub annotation: Option<String>,
}

impl RenderedLine {
    /// Creates a line without annotation.
    pub fn new(role: LineRole, depth: usize, text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            role,
            depth,
            annotation: None,
        }
    }

    /// Attaches an annotation.
    pub fn with_annotation(mut self, annotation: impl Into<String>) -> Self {
        self.annotation = Some(annotation.into());
        self
    }

    /// Whether the line belongs to an attribute or a group header.
    pub const fn is_entry(&self) -> bool {
        matches!(
            self.role,
            LineRole::GroupHeader { .. }
                | LineRole::Item { .. }
                | LineRole::WrappedContinuation { .. }
        )
    }
}
