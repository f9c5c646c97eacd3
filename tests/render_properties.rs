//! Properties of rendered output that hold for every event and width.
//!
//! - `test_every_line_fits_the_terminal`: no rendered row is wider than the
//!   terminal, for every width from 20 to 200, with and without the metrics
//!   panel
//! - `test_rendering_twice_is_identical`: output depends only on its inputs
//! - `test_wrap_segments_reassemble`: wrapping never loses text
//! - `test_empty_groups_are_elided`: groups without attributes disappear
//! - `test_structural_fidelity`: values appear once each, at the right depth
//! - `test_error_scenario`: an error event with a source at 80 columns
//! - `test_long_value_wraps_under_placeholder`: a 300 character value at 60
//!   columns

use boxlog::{
    Attr, ColorChoice, HandlerOptions, Level, LogEvent, PrettyHandler, SourceLocation,
    metrics::{MetricsSample, PanelTiers},
    render::{
        Glyphs, LineRole, RenderContext, RenderedLine, Renderer, Serializer, Styler,
        width::{display_width, strip_ansi},
        wrap,
    },
};
use chrono::{Local, TimeZone};

fn sample_events() -> Vec<LogEvent> {
    let timestamp = Local
        .with_ymd_and_hms(2024, 3, 9, 14, 5, 7)
        .single()
        .unwrap();
    vec![
        LogEvent::new(Level::Info, "started"),
        LogEvent::new(Level::Error, "request failed")
            .with_timestamp(timestamp)
            .with_source(SourceLocation::new("src/server/handlers/users.rs", 218))
            .with_attr(Attr::string("op", "write"))
            .with_attr(Attr::group(
                "request",
                [Attr::string("id", "123"), Attr::int("size", 42)],
            )),
        LogEvent::new(
            Level::Warn,
            "a rather long message that will not fit in a narrow terminal at all",
        )
        .with_timestamp(timestamp)
        .with_attr(Attr::string("note", "lorem ipsum dolor sit amet ".repeat(12))),
        LogEvent::new(Level::Debug, "deep")
            .with_group("outer")
            .with_attr(Attr::group(
                "a",
                [
                    Attr::group("b", [Attr::group("c", [Attr::string("leaf", "x".repeat(90))])]),
                    Attr::bool("flag", true),
                ],
            ))
            .with_attr(Attr::float("ratio", 0.25)),
        LogEvent::new(Level::Info, "structured").with_attr(Attr::structured(
            "payload",
            &serde_json::json!({"user": {"name": "ada", "roles": ["admin", "ops"]}, "count": 3}),
        )),
    ]
}

fn render(
    renderer: &Renderer,
    event: &LogEvent,
    width: usize,
    verbose: bool,
) -> String {
    let mut ctx = RenderContext::new(width, verbose, &PanelTiers::DEFAULT);
    let mut out = Vec::new();
    renderer.write_event(&[], event, &mut ctx, Some(&MetricsSample::unknown()), &mut out);
    String::from_utf8(out).unwrap()
}

#[test]
fn test_every_line_fits_the_terminal() {
    let renderers = [
        Renderer::new(Glyphs::UNICODE, Styler::new(false), true),
        Renderer::new(Glyphs::UNICODE, Styler::new(true), true),
        Renderer::new(Glyphs::ASCII, Styler::new(false), true),
    ];
    let events = sample_events();

    for width in 20..=200 {
        for renderer in &renderers {
            for event in &events {
                for verbose in [false, true] {
                    let text = render(renderer, event, width, verbose);
                    for line in text.lines() {
                        let visible = strip_ansi(line);
                        assert!(
                            display_width(&visible) <= width,
                            "{} cells at width {width}: {visible}",
                            display_width(&visible),
                        );
                    }
                }
            }
        }
    }
}

#[test]
fn test_rendering_twice_is_identical() {
    let renderer = Renderer::new(Glyphs::UNICODE, Styler::new(true), true);
    for event in sample_events() {
        for width in [20, 61, 80, 170, 190, 200] {
            assert_eq!(
                render(&renderer, &event, width, true),
                render(&renderer, &event, width, true)
            );
        }
    }
}

#[test]
fn test_wrap_segments_reassemble() {
    let inputs = [
        "",
        "a",
        "no-delimiters-here-at-all",
        "path/to/some/deeply/nested/file.rs",
        "words separated by spaces, commas; and other: marks",
        "日本語のテキストと English mixed",
    ];
    for input in inputs {
        for max_width in 1..=12 {
            let joined: String = wrap(input, max_width).collect();
            assert_eq!(joined, input, "max width {max_width}");
        }
    }
}

#[test]
fn test_empty_groups_are_elided() {
    let renderer = Renderer::new(Glyphs::UNICODE, Styler::new(false), false);
    let bare = LogEvent::new(Level::Info, "nothing");
    let hollow = LogEvent::new(Level::Info, "nothing")
        .with_attr(Attr::group("empty", []))
        .with_group("scope")
        .with_attr(Attr::group("also_empty", [Attr::group("inner", [])]));

    assert_eq!(
        render(&renderer, &hollow, 60, false),
        render(&renderer, &bare, 60, false)
    );
    assert_eq!(render(&renderer, &bare, 60, false).lines().count(), 3);
}

#[test]
fn test_structural_fidelity() {
    let renderer = Renderer::new(Glyphs::UNICODE, Styler::new(false), false);
    let event = LogEvent::new(Level::Info, "done")
        .with_attr(Attr::string("op", "write"))
        .with_attr(Attr::group(
            "request",
            [Attr::string("id", "123"), Attr::int("size", 42)],
        ));

    let mut ctx = RenderContext::fixed(80);
    let lines = renderer.render(&event, &mut ctx);
    let depth_of = |key: &str| {
        lines
            .iter()
            .find(|line| line.text.contains(&format!("{key}: ")))
            .map(|line| line.depth)
    };
    assert_eq!(depth_of("op"), Some(0));
    assert_eq!(depth_of("id"), Some(1));
    assert_eq!(depth_of("size"), Some(1));

    let text = String::from_utf8(Serializer::new(Glyphs::UNICODE).serialize(&lines, 80)).unwrap();
    for needle in ["\"write\"", "request", "\"123\"", "42"] {
        assert_eq!(text.matches(needle).count(), 1, "{needle} in\n{text}");
    }
}

#[test]
fn test_error_scenario() {
    let handler = PrettyHandler::new(
        Vec::new(),
        HandlerOptions::new().with_color(ColorChoice::Never),
    );
    let event = LogEvent::new(Level::Error, "request failed")
        .with_source(SourceLocation::new("handler.go", 42));

    let text = String::from_utf8(handler.render_to_vec(&event, 80)).unwrap();
    let rows: Vec<&str> = text.lines().filter(|row| !row.is_empty()).collect();

    assert!(rows[0].starts_with("╭"));
    assert!(rows[0].contains("🛑"));
    assert!(rows[0].contains("request failed"));
    let last = rows[rows.len() - 1];
    assert!(last.starts_with("╰"));
    assert!(last.contains("handler.go:42"));
    assert!(rows.iter().all(|row| display_width(row) <= 80));
}

#[test]
fn test_long_value_wraps_under_placeholder() {
    let value: String = "the quick brown fox jumps over the lazy dog "
        .repeat(7)
        .chars()
        .take(300)
        .collect();
    assert_eq!(value.chars().count(), 300);

    let renderer = Renderer::new(Glyphs::UNICODE, Styler::new(false), false);
    let event = LogEvent::new(Level::Info, "note").with_attr(Attr::string("note", value.as_str()));
    let mut ctx = RenderContext::fixed(60);
    let lines = renderer.render(&event, &mut ctx);
    let entries: Vec<&RenderedLine> = lines.iter().filter(|line| line.is_entry()).collect();

    assert!(entries.len() >= 2);
    assert!(matches!(entries[0].role, LineRole::Item { .. }));
    assert!(entries[0].text.starts_with("╼ note: "));
    for line in &entries[1..] {
        assert!(matches!(line.role, LineRole::WrappedContinuation { .. }));
        assert!(line.text.contains(Glyphs::UNICODE.placeholder));
        assert!(!line.text.contains("note"));
    }

    let reassembled: String = entries
        .iter()
        .map(|line| {
            let (_, quoted) = line.text.split_once(": ").unwrap();
            quoted.strip_prefix('"').unwrap().strip_suffix('"').unwrap()
        })
        .collect();
    let squash = |text: &str| text.split_whitespace().collect::<String>();
    assert_eq!(squash(&reassembled), squash(&value));

    let out = Serializer::new(Glyphs::UNICODE).serialize(&lines, 60);
    let text = String::from_utf8(out).unwrap();
    assert!(text.lines().all(|row| display_width(row) <= 60));
}
