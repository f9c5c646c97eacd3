//! Display-width arithmetic on possibly styled text.
//!
//! Every width in the renderer is measured in terminal cells as reported by
//! `unicode-width`, after ANSI escape sequences have been removed.

use std::{borrow::Cow, sync::LazyLock};

use regex::Regex;
use unicode_width::UnicodeWidthStr;

/// Narrow no-break space, appended to odd-width centered text.
pub const NARROW_SPACE: char = '\u{202f}';

static ANSI_ESCAPE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\x1b\[[0-9;]*[A-Za-z]").expect("ANSI escape pattern is valid")
});

/// Removes ANSI SGR escape sequences.
pub fn strip_ansi(text: &str) -> Cow<'_, str> {
    if text.contains('\x1b') {
        ANSI_ESCAPE.replace_all(text, "")
    } else {
        Cow::Borrowed(text)
    }
}

/// Number of terminal cells `text` occupies once escapes are removed.
pub fn display_width(text: &str) -> usize {
    strip_ansi(text).width()
}

/// Centers `text` in `width` cells using `fill` on both sides.
///
/// Text with an odd display width gets a trailing [`NARROW_SPACE`] first.
/// Text that does not fit is returned unchanged.
pub fn center(text: &str, width: usize, fill: char) -> String {
    let mut text = Cow::Borrowed(text);
    if display_width(&text) % 2 == 1 {
        text.to_mut().push(NARROW_SPACE);
    }
    let text_width = display_width(&text);
    if text_width >= width {
        return text.into_owned();
    }
    let padding = width - text_width;
    let left = padding / 2;
    let right = padding - left;

    let mut out = String::with_capacity(text.len() + padding * fill.len_utf8());
    out.extend(core::iter::repeat_n(fill, left));
    out.push_str(&text);
    out.extend(core::iter::repeat_n(fill, right));
    out
}

/// Centers a short glyph inside `width` cells of spaces.
///
/// Unlike [`center`], no narrow space is added; used for the continuation
/// placeholder that stands in for a key.
pub fn center_glyph(glyph: &str, width: usize) -> String {
    let glyph_width = display_width(glyph);
    if glyph_width >= width {
        return glyph.to_owned();
    }
    let padding = width - glyph_width;
    let left = padding / 2;
    format!(
        "{}{glyph}{}",
        " ".repeat(left),
        " ".repeat(padding - left)
    )
}

/// Pads `text` on the right with `fill` up to `width` cells.
pub fn pad_right(text: &mut String, width: usize, fill: char) {
    let current = display_width(text);
    if current < width {
        text.extend(core::iter::repeat_n(fill, width - current));
    }
}

/// Keeps the tail of `text`, replacing the dropped head with `ellipsis`, so
/// that the result is at most `max_width` cells.
///
/// Used for source paths, where the file name at the end matters most.
pub fn truncate_left(text: &str, max_width: usize, ellipsis: &str) -> String {
    if text.width() <= max_width {
        return text.to_owned();
    }
    let budget = max_width.saturating_sub(ellipsis.width());
    let mut start = text.len();
    for (index, _) in text.char_indices().rev() {
        if text[index..].width() > budget {
            break;
        }
        start = index;
    }
    format!("{ellipsis}{}", &text[start..])
}

/// Cuts styled `text` down to at most `max_width` cells.
///
/// Escape sequences are copied through without counting toward the width;
/// when any were present a reset is appended so the cut never leaks a style
/// into the padding that follows.
pub fn truncate_styled(text: &str, max_width: usize) -> String {
    let mut out = String::with_capacity(text.len());
    let mut visible = String::with_capacity(text.len());
    let mut styled = false;
    let mut rest = text;

    while !rest.is_empty() {
        if let Some(escape) = ANSI_ESCAPE.find(rest).filter(|m| m.start() == 0) {
            out.push_str(escape.as_str());
            rest = &rest[escape.end()..];
            styled = true;
            continue;
        }
        let Some(ch) = rest.chars().next() else {
            break;
        };
        visible.push(ch);
        if visible.width() > max_width {
            break;
        }
        out.push(ch);
        rest = &rest[ch.len_utf8()..];
    }

    if styled {
        out.push_str("\x1b[0m");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_ansi() {
        assert_eq!(strip_ansi("\x1b[1;31mred\x1b[0m"), "red");
        assert!(matches!(strip_ansi("plain"), Cow::Borrowed("plain")));
    }

    #[test]
    fn test_display_width() {
        assert_eq!(display_width("\x1b[32mkey\x1b[0m"), 3);
        assert_eq!(display_width("🛑 ERROR"), 8);
        assert_eq!(display_width("┣━━━╼ "), 6);
    }

    #[test]
    fn test_center_odd_width() {
        let centered = center("abc", 9, '─');
        assert_eq!(display_width(&centered), 9);
        assert!(centered.starts_with("──abc"));
        assert!(centered.contains(NARROW_SPACE));
        assert!(centered.ends_with("───"));
    }

    #[test]
    fn test_center_too_wide() {
        assert_eq!(center("abcdef", 4, ' '), "abcdef");
    }

    #[test]
    fn test_center_glyph() {
        assert_eq!(center_glyph("⸗", 5), "  ⸗  ");
        assert_eq!(center_glyph("⸗", 4), " ⸗  ");
        assert_eq!(center_glyph("⸗", 1), "⸗");
    }

    #[test]
    fn test_truncate_left() {
        let path = "/home/user/projects/service/internal/handler.go:42";
        let cut = truncate_left(path, 20, "...");
        assert!(cut.starts_with("..."));
        assert!(cut.ends_with("handler.go:42"));
        assert!(cut.width() <= 20);
        assert_eq!(truncate_left("short.rs:1", 20, "..."), "short.rs:1");
    }

    #[test]
    fn test_truncate_styled() {
        let cut = truncate_styled("\x1b[32mabcdef\x1b[0m", 3);
        assert_eq!(strip_ansi(&cut), "abc");
        assert!(cut.ends_with("\x1b[0m"));
        assert_eq!(truncate_styled("abcdef", 4), "abcd");
        assert_eq!(truncate_styled("ab🛑", 3), "ab");
    }

    #[test]
    fn test_pad_right() {
        let mut text = String::from("\x1b[1mab\x1b[0m");
        pad_right(&mut text, 5, ' ');
        assert_eq!(display_width(&text), 5);
    }
}
