//! Turning [`RenderedLine`]s into bytes of a fixed display width.

use crate::render::{
    Glyphs, LineRole, RenderedLine,
    width::{center, display_width, pad_right, truncate_styled},
};

/// Cells kept free between an annotation and the right border.
const ANNOTATION_GAP: usize = 1;

#[derive(Copy, Clone)]
enum Align {
    Left,
    Center,
}

struct Frame {
    left: &'static str,
    right: &'static str,
    fill: char,
    align: Align,
}

/// Pads, truncates and frames lines so every one of them is exactly as wide
/// as the box.
///
/// ```rust
/// use boxlog::render::{Glyphs, LineRole, RenderedLine, Serializer};
///
/// let lines = [
///     RenderedLine::new(LineRole::TopBorder, 0, "[hi]"),
///     RenderedLine::new(LineRole::BottomBorder, 0, ""),
/// ];
/// let out = Serializer::new(Glyphs::ASCII).serialize(&lines, 10);
/// assert_eq!(String::from_utf8(out).unwrap(), "+[hi]----+\n+--------+\n\n");
/// ```
#[derive(Copy, Clone, Debug)]
pub struct Serializer {
    glyphs: Glyphs,
}

impl Serializer {
    /// Creates a serializer drawing borders with `glyphs`.
    pub const fn new(glyphs: Glyphs) -> Self {
        Self { glyphs }
    }

    /// Serializes `lines` into a fresh buffer.
    pub fn serialize(&self, lines: &[RenderedLine], width: usize) -> Vec<u8> {
        let mut out = Vec::new();
        self.serialize_into(lines, width, &mut out);
        out
    }

    /// Appends the serialized `lines` to `out`, followed by one blank line.
    pub fn serialize_into(&self, lines: &[RenderedLine], width: usize, out: &mut Vec<u8>) {
        let inner_width = width.saturating_sub(2);
        for line in lines {
            let frame = self.frame(line);
            let content = self.content(line, &frame, inner_width);
            out.extend_from_slice(frame.left.as_bytes());
            out.extend_from_slice(content.as_bytes());
            out.extend_from_slice(frame.right.as_bytes());
            out.push(b'\n');
        }
        out.push(b'\n');
    }

    fn frame(&self, line: &RenderedLine) -> Frame {
        let glyphs = &self.glyphs;
        let (left, right, fill, align) = match line.role {
            LineRole::TopBorder | LineRole::PanelBorder { top: true } => {
                (glyphs.top_left, glyphs.top_right, glyphs.rule, Align::Left)
            }
            LineRole::BottomBorder | LineRole::PanelBorder { top: false } => (
                glyphs.bottom_left,
                glyphs.bottom_right,
                glyphs.rule,
                Align::Center,
            ),
            LineRole::GroupHeader { .. } | LineRole::Item { .. } if line.depth == 0 => {
                (glyphs.tee, glyphs.side, ' ', Align::Left)
            }
            LineRole::GroupHeader { .. }
            | LineRole::Item { .. }
            | LineRole::WrappedContinuation { .. }
            | LineRole::PanelRow => (glyphs.side, glyphs.side, ' ', Align::Left),
        };
        Frame {
            left,
            right,
            fill,
            align,
        }
    }

    /// The line content, exactly `inner_width` cells wide.
    fn content(&self, line: &RenderedLine, frame: &Frame, inner_width: usize) -> String {
        let mut content = match frame.align {
            Align::Center if !line.text.is_empty() => center(&line.text, inner_width, frame.fill),
            _ => line.text.clone(),
        };

        let annotation = line.annotation.as_deref().filter(|annotation| {
            display_width(&content) + 1 + display_width(annotation) + ANNOTATION_GAP
                <= inner_width
        });

        match annotation {
            Some(annotation) => {
                let start = inner_width - display_width(annotation) - ANNOTATION_GAP;
                pad_right(&mut content, start, frame.fill);
                content.push_str(annotation);
                pad_right(&mut content, inner_width, frame.fill);
            }
            None if display_width(&content) > inner_width => {
                let overflow = self.glyphs.overflow;
                let mut cut = truncate_styled(
                    &content,
                    inner_width.saturating_sub(display_width(overflow)),
                );
                if display_width(overflow) <= inner_width {
                    cut.push_str(overflow);
                }
                content = cut;
                pad_right(&mut content, inner_width, frame.fill);
            }
            None => pad_right(&mut content, inner_width, frame.fill),
        }
        content
    }
}

impl Default for Serializer {
    fn default() -> Self {
        Self::new(Glyphs::DEFAULT)
    }
}
