//! Breaking long values into segments of bounded display width.

use core::iter::FusedIterator;

use unicode_width::UnicodeWidthChar;

/// Characters after which a segment may end.
pub const BREAK_DELIMITERS: [char; 5] = [' ', '/', '.', ',', '\n'];

/// Splits `text` into segments no wider than `max_width` cells.
///
/// Each segment is the longest prefix of the remainder that fits, cut just
/// after the last delimiter in it, or at the window end if there is none.
/// A single character wider than the budget is emitted on its own.
/// A `max_width` of zero yields the whole text as one segment.
///
/// Concatenating the segments reproduces `text` exactly:
///
/// ```rust
/// use boxlog::render::wrap;
///
/// let text = "/var/log/service/requests.log";
/// let segments: Vec<&str> = wrap(text, 10).collect();
/// assert_eq!(segments, ["/var/log/", "service/", "requests.", "log"]);
/// assert_eq!(segments.concat(), text);
/// ```
pub fn wrap(text: &str, max_width: usize) -> Wrap<'_> {
    Wrap {
        remainder: text,
        max_width,
        finished: false,
    }
}

/// Iterator returned by [`wrap`].
#[derive(Clone, Debug)]
pub struct Wrap<'a> {
    remainder: &'a str,
    max_width: usize,
    finished: bool,
}

impl<'a> Iterator for Wrap<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<&'a str> {
        if self.finished {
            return None;
        }
        let window_end = if self.max_width == 0 {
            self.remainder.len()
        } else {
            window_end(self.remainder, self.max_width)
        };
        if window_end == self.remainder.len() {
            self.finished = true;
            return Some(core::mem::take(&mut self.remainder));
        }

        let window = &self.remainder[..window_end];
        let cut = window
            .rfind(|ch: char| BREAK_DELIMITERS.contains(&ch))
            .map_or(window_end, |index| index + 1);

        let (segment, rest) = self.remainder.split_at(cut);
        self.remainder = rest;
        self.finished = rest.is_empty();
        Some(segment)
    }
}

impl FusedIterator for Wrap<'_> {}

/// Byte offset of the end of the widest prefix fitting in `max_width`,
/// always covering at least one char.
///
/// Stops at the first char past the budget, so wrapping a whole value
/// visits each char a bounded number of times.
fn window_end(text: &str, max_width: usize) -> usize {
    let mut width = 0;
    let mut end = 0;
    for (index, ch) in text.char_indices() {
        width += ch.width().unwrap_or(0);
        if width > max_width {
            break;
        }
        end = index + ch.len_utf8();
    }
    if end == 0 {
        text.chars().next().map_or(0, char::len_utf8)
    } else {
        end
    }
}
