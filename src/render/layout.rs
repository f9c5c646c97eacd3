//! Laying out an event's entry tree as [`RenderedLine`]s.
//!
//! Entries are first folded into a tree of [`Node`]s, where group markers
//! become scope groups holding everything after them and empty groups are
//! dropped. The tree is then walked depth first, producing one or more lines
//! per node.

use crate::{
    event::{Attr, Entry, LogEvent, Value},
    render::{
        Glyphs, ItemPosition, LineRole, RenderContext, RenderedLine, Renderer, Styler,
        width::{center_glyph, display_width, truncate_left},
        wrap::wrap,
    },
};

/// Inner width above which wrapped values carry side annotations.
const ANNOTATION_MIN_INNER_WIDTH: usize = 60;
/// Cells kept free on wrapped lines for the annotation.
const ANNOTATION_RESERVE: usize = 10;
/// Cells kept between the message and the timestamp.
const TIMESTAMP_MARGIN: usize = 10;
const TIMESTAMP_FORMAT: &str = "%b %e %H:%M:%S";
const SOURCE_FRAME: &str = "[SOURCE: ]";
const RAIL_PADDING: &str = "     ";
const BLANK_SEGMENT: &str = "      ";

enum Node<'a> {
    Attr(&'a Attr),
    Group {
        name: &'a str,
        scope: bool,
        children: Vec<Node<'a>>,
    },
}

/// Folds the flat entry list into a tree, dropping empty attributes and
/// empty groups.
fn build_tree<'a>(entries: impl IntoIterator<Item = &'a Entry>) -> Vec<Node<'a>> {
    let mut root = Vec::new();
    let mut scopes: Vec<(&'a str, Vec<Node<'a>>)> = Vec::new();

    for entry in entries {
        match entry {
            Entry::Attribute(attr) => {
                let children = match scopes.last_mut() {
                    Some((_, children)) => children,
                    None => &mut root,
                };
                push_attr(attr, children);
            }
            Entry::GroupMarker { name } if name.is_empty() => {}
            Entry::GroupMarker { name } => scopes.push((name, Vec::new())),
        }
    }

    while let Some((name, children)) = scopes.pop() {
        if children.is_empty() {
            continue;
        }
        let node = Node::Group {
            name,
            scope: true,
            children,
        };
        match scopes.last_mut() {
            Some((_, parent)) => parent.push(node),
            None => root.push(node),
        }
    }
    root
}

fn push_attr<'a>(attr: &'a Attr, out: &mut Vec<Node<'a>>) {
    if attr.is_empty() {
        return;
    }
    let Value::Group(attrs) = &attr.value else {
        out.push(Node::Attr(attr));
        return;
    };

    // A group without a key is inlined into its parent.
    if attr.key.is_empty() {
        for child in attrs {
            push_attr(child, out);
        }
        return;
    }

    let mut children = Vec::with_capacity(attrs.len());
    for child in attrs {
        push_attr(child, &mut children);
    }
    if !children.is_empty() {
        out.push(Node::Group {
            name: &attr.key,
            scope: false,
            children,
        });
    }
}

pub(super) fn layout(
    renderer: &Renderer,
    inherited: &[Entry],
    event: &LogEvent,
    ctx: &mut RenderContext,
) -> Vec<RenderedLine> {
    let tree = build_tree(inherited.iter().chain(&event.entries));
    let mut pass = LayoutPass {
        glyphs: renderer.glyphs(),
        styler: renderer.styler(),
        ctx,
        lines: Vec::new(),
    };
    pass.top_border(event);
    pass.nodes(&tree, 0);
    pass.bottom_border(event, renderer.shows_source());
    pass.lines
}

struct LayoutPass<'r> {
    glyphs: &'r Glyphs,
    styler: &'r Styler,
    ctx: &'r mut RenderContext,
    lines: Vec<RenderedLine>,
}

impl LayoutPass<'_> {
    fn nodes(&mut self, nodes: &[Node<'_>], depth: usize) {
        for (index, node) in nodes.iter().enumerate() {
            let position = ItemPosition::of(index, nodes.len());
            match node {
                Node::Attr(attr) => self.attr(attr, depth, position),
                Node::Group {
                    name,
                    scope,
                    children,
                } => {
                    self.group_header(name, *scope, depth, position);
                    self.ctx.set_continuation(depth, !position.is_last());
                    self.nodes(children, depth + 1);
                    self.ctx.set_continuation(depth, false);
                }
            }
        }
    }

    /// Tree prefix of a line at `depth`.
    ///
    /// Depth zero hangs directly off the box border. Deeper lines start with
    /// one column per open ancestor branch, then either the connector of the
    /// entry itself or, on continuation rows, its own rail.
    fn prefix(&self, depth: usize, position: ItemPosition, continuation: bool) -> String {
        let mut prefix = String::new();
        if depth == 0 {
            prefix.push_str(if continuation { "  " } else { self.glyphs.bullet });
            return prefix;
        }

        prefix.push(' ');
        for level in 1..depth {
            self.push_rail(&mut prefix, self.ctx.is_continuation_active(level));
        }
        if continuation {
            self.push_rail(&mut prefix, !position.is_last());
        } else if position.is_last() {
            prefix.push_str(self.glyphs.corner);
            prefix.push_str(self.glyphs.bullet);
        } else {
            prefix.push_str(self.glyphs.branch);
            prefix.push_str(self.glyphs.bullet);
        }
        prefix
    }

    fn push_rail(&self, prefix: &mut String, active: bool) {
        if active {
            prefix.push_str(self.glyphs.rail);
            prefix.push_str(RAIL_PADDING);
        } else {
            prefix.push_str(BLANK_SEGMENT);
        }
    }

    fn placeholder(&self, key: &str, depth: usize) -> String {
        let key_width = display_width(key);
        if key_width == 0 {
            return String::new();
        }
        let placeholder = center_glyph(self.glyphs.placeholder, key_width);
        self.styler.key(depth, &placeholder)
    }

    fn push(&mut self, line: RenderedLine) {
        self.lines.push(line);
    }

    fn top_border(&mut self, event: &LogEvent) {
        let (icon, _) = Styler::level_badge(event.level, self.glyphs);
        let message = escape_line_breaks(&event.message);
        let rule = self.glyphs.rule;
        let text = format!(
            "{rule}{rule}[{icon} {level}: {message}]",
            level = self.styler.level(event.level)
        );
        let mut line = RenderedLine::new(LineRole::TopBorder, 0, text);

        if let Some(timestamp) = event.timestamp {
            let stamp = format!(
                "[{} {}]",
                self.glyphs.clock_icon,
                timestamp.format(TIMESTAMP_FORMAT)
            );
            let needed = display_width(&message) + TIMESTAMP_MARGIN + display_width(&stamp);
            if needed <= self.ctx.inner_width() {
                line = line.with_annotation(stamp);
            }
        }
        self.push(line);
    }

    fn bottom_border(&mut self, event: &LogEvent, show_source: bool) {
        let text = match &event.source {
            Some(source) if show_source => {
                let budget = self
                    .ctx
                    .inner_width()
                    .saturating_sub(display_width(SOURCE_FRAME) + 4);
                let path = truncate_left(&source.to_string(), budget, self.glyphs.ellipsis);
                format!("[{}: {path}]", self.styler.label("SOURCE"))
            }
            _ => String::new(),
        };
        self.push(RenderedLine::new(LineRole::BottomBorder, 0, text));
    }

    fn group_header(&mut self, name: &str, scope: bool, depth: usize, position: ItemPosition) {
        let prefix = self.prefix(depth, position, false);
        let name = self.styler.key(depth, name);
        let text = if scope {
            format!(
                "{prefix}{} {}: {name}",
                self.glyphs.scope_icon,
                self.styler.label("GROUP")
            )
        } else {
            format!("{prefix}{} {name}:", self.glyphs.group_icon)
        };
        self.push(RenderedLine::new(
            LineRole::GroupHeader { position },
            depth,
            text,
        ));
    }

    fn attr(&mut self, attr: &Attr, depth: usize, position: ItemPosition) {
        if let Value::Structured(
            json @ (serde_json::Value::Object(_) | serde_json::Value::Array(_)),
        ) = &attr.value
        {
            match serde_json::to_string_pretty(json) {
                Ok(pretty) => {
                    self.structured(&attr.key, &pretty, depth, position);
                    return;
                }
                Err(error) => tracing::debug!(
                    target: "boxlog",
                    %error,
                    key = %attr.key,
                    "structured value rendered as a plain string"
                ),
            }
        }
        self.scalar(&attr.key, &attr.value, depth, position);
    }

    fn scalar(&mut self, key: &str, value: &Value, depth: usize, position: ItemPosition) {
        let prefix = self.prefix(depth, position, false);
        let styled_key = self.styler.key(depth, key);
        let (text, quoted) = match value {
            Value::String(raw) => (escape_debug(raw), true),
            _ => (value.to_string(), false),
        };
        let body = |segment: &str| {
            if quoted {
                format!("\"{segment}\"")
            } else {
                segment.to_owned()
            }
        };

        let inner_width = self.ctx.inner_width();
        let prefix_width = display_width(&prefix);
        let key_width = display_width(key);
        let full = body(&text);
        if prefix_width + key_width + 2 + display_width(&full) <= inner_width {
            self.push(RenderedLine::new(
                LineRole::Item { position },
                depth,
                format!("{prefix}{styled_key}: {full}"),
            ));
            return;
        }

        let annotate = inner_width > ANNOTATION_MIN_INNER_WIDTH;
        let reserved = prefix_width
            + key_width
            + 2
            + if quoted { 2 } else { 0 }
            + if annotate { ANNOTATION_RESERVE } else { 0 };
        let budget = inner_width.saturating_sub(reserved).max(1);

        let continuation = self.prefix(depth, position, true);
        let placeholder = self.placeholder(key, depth);
        let marks = self.glyphs.wrap_marks;
        let segments: Vec<&str> = wrap(&text, budget).collect();
        let last = segments.len() - 1;

        for (index, segment) in segments.into_iter().enumerate() {
            let line = if index == 0 {
                RenderedLine::new(
                    LineRole::Item { position },
                    depth,
                    format!("{prefix}{styled_key}: {}", body(segment)),
                )
            } else {
                RenderedLine::new(
                    LineRole::WrappedContinuation { position },
                    depth,
                    format!("{continuation}{placeholder}: {}", body(segment)),
                )
            };
            let line = if annotate {
                let mark = match index {
                    0 => marks[0],
                    i if i == last => marks[3],
                    1 => marks[1],
                    _ => marks[2],
                };
                line.with_annotation(self.styler.dim(mark))
            } else {
                line
            };
            self.push(line);
        }
    }

    fn structured(&mut self, key: &str, pretty: &str, depth: usize, position: ItemPosition) {
        let prefix = self.prefix(depth, position, false);
        let continuation = self.prefix(depth, position, true);
        let styled_key = self.styler.key(depth, key);
        let placeholder = self.placeholder(key, depth);
        let marks = self.glyphs.struct_marks;
        let last = pretty.lines().count().saturating_sub(1);

        for (index, json_line) in pretty.lines().enumerate() {
            let (line, mark) = if index == 0 {
                let line = RenderedLine::new(
                    LineRole::Item { position },
                    depth,
                    format!("{prefix}{styled_key}: {json_line}"),
                );
                (line, marks[0])
            } else {
                let line = RenderedLine::new(
                    LineRole::WrappedContinuation { position },
                    depth,
                    format!("{continuation}{placeholder}  {json_line}"),
                );
                (line, if index == last { marks[2] } else { marks[1] })
            };
            self.push(line.with_annotation(self.styler.dim(mark)));
        }
    }
}

/// Debug-escapes a string value without the surrounding quotes, so that
/// wrapping measures exactly what gets printed.
fn escape_debug(raw: &str) -> String {
    let quoted = format!("{raw:?}");
    quoted[1..quoted.len() - 1].to_owned()
}

fn escape_line_breaks(message: &str) -> String {
    message.replace('\r', "\\r").replace('\n', "\\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{event::Level, metrics::PanelTiers};

    fn renderer() -> Renderer {
        Renderer::new(Glyphs::UNICODE, Styler::new(false), true)
    }

    fn texts(lines: &[RenderedLine]) -> Vec<&str> {
        lines.iter().map(|line| line.text.as_str()).collect()
    }

    /// Joins the quoted segments of every entry line back together.
    fn reassemble(lines: &[&RenderedLine]) -> String {
        lines
            .iter()
            .map(|line| {
                let (_, quoted) = line.text.split_once(": ").unwrap();
                quoted.strip_prefix('"').unwrap().strip_suffix('"').unwrap()
            })
            .collect()
    }

    fn wrapped<'a>(lines: &'a [RenderedLine], depth: usize) -> Vec<&'a RenderedLine> {
        lines
            .iter()
            .filter(|line| line.depth == depth)
            .filter(|line| {
                matches!(
                    line.role,
                    LineRole::Item { .. } | LineRole::WrappedContinuation { .. }
                )
            })
            .filter(|line| line.text.contains('"'))
            .collect()
    }

    fn assert_no_truncation(lines: &[RenderedLine], width: usize) {
        let out = crate::render::Serializer::new(Glyphs::UNICODE).serialize(lines, width);
        let text = String::from_utf8(out).unwrap();
        assert!(!text.contains(Glyphs::UNICODE.overflow), "{text}");
    }

    #[test]
    fn test_tree_drops_empty_groups() {
        let entries = vec![
            Entry::GroupMarker {
                name: "outer".to_owned(),
            },
            Entry::Attribute(Attr::group("nested", [])),
            Entry::GroupMarker {
                name: "inner".to_owned(),
            },
        ];
        assert!(build_tree(&entries).is_empty());
    }

    #[test]
    fn test_tree_scopes_enclose_following_entries() {
        let entries = vec![
            Entry::Attribute(Attr::string("op", "write")),
            Entry::GroupMarker {
                name: "request".to_owned(),
            },
            Entry::Attribute(Attr::string("id", "123")),
            Entry::Attribute(Attr::int("size", 42)),
        ];
        let tree = build_tree(&entries);
        assert_eq!(tree.len(), 2);
        let Node::Group {
            name,
            scope,
            children,
        } = &tree[1]
        else {
            panic!("expected a group");
        };
        assert_eq!(*name, "request");
        assert!(*scope);
        assert_eq!(children.len(), 2);
    }

    #[test]
    fn test_keyless_group_is_inlined() {
        let entries = vec![Entry::Attribute(Attr::group(
            "",
            [Attr::int("a", 1), Attr::int("b", 2)],
        ))];
        let tree = build_tree(&entries);
        assert_eq!(tree.len(), 2);
        assert!(tree.iter().all(|node| matches!(node, Node::Attr(_))));
    }

    #[test]
    fn test_connectors_and_rails() {
        let event = LogEvent::new(Level::Info, "tree").with_attrs([
            Attr::group(
                "outer",
                [
                    Attr::group("inner", [Attr::int("x", 1), Attr::int("y", 2)]),
                    Attr::int("z", 3),
                ],
            ),
            Attr::int("tail", 4),
        ]);
        let mut ctx = RenderContext::fixed(80);
        let lines = renderer().render(&event, &mut ctx);
        let texts = texts(&lines);

        assert_eq!(texts[1], "╼ 📦 outer:");
        assert_eq!(texts[2], " ┣━━━╼ 📦 inner:");
        assert_eq!(texts[3], " ┃     ┣━━━╼ x: 1");
        assert_eq!(texts[4], " ┃     ┗━━━╼ y: 2");
        assert_eq!(texts[5], " ┗━━━╼ z: 3");
        assert_eq!(texts[6], "╼ tail: 4");
        assert_eq!(lines[2].depth, 1);
        assert_eq!(lines[3].depth, 2);
        assert_eq!(
            lines[4].role,
            LineRole::Item {
                position: ItemPosition::Last
            }
        );
    }

    #[test]
    fn test_closed_branch_uses_blank_padding() {
        let event = LogEvent::new(Level::Info, "tree").with_attr(Attr::group(
            "outer",
            [Attr::int("a", 1), Attr::group("last", [Attr::int("b", 2)])],
        ));
        let mut ctx = RenderContext::fixed(80);
        let lines = renderer().render(&event, &mut ctx);
        let texts = texts(&lines);
        assert_eq!(texts[3], " ┗━━━╼ 📦 last:");
        assert_eq!(texts[4], "       ┗━━━╼ b: 2");
    }

    #[test]
    fn test_scope_group_header() {
        let event = LogEvent::new(Level::Info, "scoped")
            .with_group("config")
            .with_attr(Attr::bool("tls", true));
        let mut ctx = RenderContext::fixed(80);
        let lines = renderer().render(&event, &mut ctx);
        assert_eq!(lines[1].text, "╼ 📂 GROUP: config");
        assert_eq!(lines[2].text, " ┗━━━╼ tls: true");
    }

    #[test]
    fn test_wrapped_value_annotations() {
        let note = "word ".repeat(40);
        let event =
            LogEvent::new(Level::Info, "wrap").with_attr(Attr::string("note", note.trim_end()));
        let mut ctx = RenderContext::fixed(80);
        let lines = renderer().render(&event, &mut ctx);
        let entries: Vec<_> = lines.iter().filter(|line| line.is_entry()).collect();

        assert!(entries.len() >= 3);
        assert_eq!(entries[0].annotation.as_deref(), Some("╕ line"));
        assert_eq!(entries[1].annotation.as_deref(), Some("│ wrap"));
        assert_eq!(
            entries.last().and_then(|line| line.annotation.as_deref()),
            Some("╛")
        );
        assert!(entries[1].text.starts_with("   ⸗  : \""));
    }

    #[test]
    fn test_wrapped_escapes_are_kept_whole() {
        let value = concat!(
            r#"C:\Users\builder\AppData\Local\Temp\cargo\registry\src\index\"#,
            r#"crate-1.0\src\lib.rs said "hello""#,
            "\tthen ",
            r#"{"a": 1, "b": "\n"}"#,
            "\nand a second line with \"more quotes\" and \\ slashes",
        );
        for width in [40, 60, 80, 120] {
            let event =
                LogEvent::new(Level::Info, "escapes").with_attr(Attr::string("path", value));
            let mut ctx = RenderContext::fixed(width);
            let lines = renderer().render(&event, &mut ctx);
            let entries = wrapped(&lines, 0);

            assert!(entries.len() >= 2, "width {width}");
            assert_eq!(reassemble(&entries), escape_debug(value), "width {width}");
            assert_no_truncation(&lines, width);
        }
    }

    #[test]
    fn test_wrapped_value_under_open_branch() {
        let note = "lorem ipsum \"dolor\" ".repeat(10);
        let event = LogEvent::new(Level::Info, "nested").with_attr(Attr::group(
            "outer",
            [
                Attr::group("inner", [Attr::string("note", note.as_str()), Attr::int("x", 1)]),
                Attr::int("after", 2),
            ],
        ));
        let mut ctx = RenderContext::fixed(80);
        let lines = renderer().render(&event, &mut ctx);
        let entries = wrapped(&lines, 2);

        assert!(entries.len() >= 2);
        assert!(entries[0].text.starts_with(" ┃     ┣━━━╼ note: \""));
        for line in &entries[1..] {
            assert!(line.text.starts_with(" ┃     ┃      ⸗  : \""), "{}", line.text);
        }
        assert_eq!(reassemble(&entries), escape_debug(&note));
        assert!(texts(&lines).contains(&" ┃     ┗━━━╼ x: 1"));
        assert!(texts(&lines).contains(&" ┗━━━╼ after: 2"));
        assert_no_truncation(&lines, 80);
    }

    #[test]
    fn test_wrapped_value_with_empty_key() {
        let value = "x".repeat(150);
        let event =
            LogEvent::new(Level::Info, "keyless").with_attr(Attr::string("", value.as_str()));
        let mut ctx = RenderContext::fixed(60);
        let lines = renderer().render(&event, &mut ctx);
        let entries = wrapped(&lines, 0);

        assert!(entries.len() >= 2);
        assert!(entries[0].text.starts_with("╼ : \"x"));
        for line in &entries[1..] {
            assert!(line.text.starts_with("  : \"x"), "{}", line.text);
        }
        assert_eq!(reassemble(&entries), value);
        assert_no_truncation(&lines, 60);
    }

    #[test]
    fn test_narrow_box_has_no_wrap_annotations() {
        let event =
            LogEvent::new(Level::Info, "wrap").with_attr(Attr::string("note", "x".repeat(100)));
        let mut ctx = RenderContext::fixed(40);
        let lines = renderer().render(&event, &mut ctx);
        assert!(lines.iter().filter(|line| line.is_entry()).count() > 1);
        assert!(lines.iter().all(|line| line.annotation.is_none()));
    }

    #[test]
    fn test_structured_value() {
        let payload = serde_json::json!({ "name": "reindex", "retries": 3 });
        let event = LogEvent::new(Level::Debug, "job")
            .with_attr(Attr::new("job", Value::Structured(payload)))
            .with_attr(Attr::new("scalar", Value::Structured(serde_json::json!(7))));
        let mut ctx = RenderContext::fixed(100);
        let lines = renderer().render(&event, &mut ctx);
        let texts = texts(&lines);

        assert_eq!(texts[1], "╼ job: {");
        assert_eq!(lines[1].annotation.as_deref(), Some("╕ struct"));
        assert_eq!(texts[2], "   ⸗     \"name\": \"reindex\",");
        assert_eq!(lines[2].annotation.as_deref(), Some("│"));
        assert_eq!(texts[4], "   ⸗   }");
        assert_eq!(lines[4].annotation.as_deref(), Some("╛"));
        assert_eq!(texts[5], "╼ scalar: 7");
    }

    #[test]
    fn test_timestamp_dropped_when_message_is_long() {
        let timestamp = chrono::Local::now();
        let short = LogEvent::new(Level::Info, "ok").with_timestamp(timestamp);
        let long = LogEvent::new(Level::Info, "m".repeat(60)).with_timestamp(timestamp);
        let mut ctx = RenderContext::fixed(80);

        let lines = renderer().render(&short, &mut ctx);
        assert!(lines[0].annotation.as_deref().is_some_and(|a| a.starts_with("[🕙 ")));
        let lines = renderer().render(&long, &mut ctx);
        assert_eq!(lines[0].annotation, None);
    }

    #[test]
    fn test_source_in_bottom_border() {
        let event = LogEvent::new(Level::Error, "boom").with_source(crate::SourceLocation::new(
            "/very/long/path/to/some/deeply/nested/module/handler.go",
            42,
        ));
        let mut ctx = RenderContext::fixed(40);
        let lines = renderer().render(&event, &mut ctx);
        let bottom = &lines[lines.len() - 1];
        assert_eq!(bottom.role, LineRole::BottomBorder);
        assert!(bottom.text.starts_with("[SOURCE: ..."));
        assert!(bottom.text.ends_with("handler.go:42]"));
        assert!(display_width(&bottom.text) <= ctx.inner_width());

        let hidden = Renderer::new(Glyphs::UNICODE, Styler::new(false), false);
        let lines = hidden.render(&event, &mut ctx);
        assert_eq!(lines[lines.len() - 1].text, "");
    }

    #[test]
    fn test_message_line_breaks_escaped() {
        let event = LogEvent::new(Level::Warn, "first\nsecond");
        let mut ctx = RenderContext::new(80, false, &PanelTiers::DEFAULT);
        let lines = renderer().render(&event, &mut ctx);
        assert_eq!(lines[0].text, "──[⚠️ WARN: first\\nsecond]");
    }
}
