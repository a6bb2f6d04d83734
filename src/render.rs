//! Response body highlighting.
//!
//! The lexer is chosen from the declared content type first, then by looking
//! at the text itself. Output is one [`Line`] per body line, colored with
//! 24-bit terminal colors.

use std::sync::OnceLock;

use anyhow::{anyhow, Result};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use syntect::easy::HighlightLines;
use syntect::highlighting::{FontStyle, Style as SyntectStyle, Theme, ThemeSet};
use syntect::parsing::{SyntaxReference, SyntaxSet};
use syntect::util::LinesWithEndings;
use tracing::{debug, warn};
use unicode_width::UnicodeWidthChar;

pub const DEFAULT_THEME: &str = "base16-ocean.dark";

const TAB_WIDTH: usize = 8;

/// Syntax names paired with the MIME types they claim, searched in order.
const MIME_REGISTRY: &[(&str, &[&str])] = &[
    (
        "JSON",
        &[
            "application/json",
            "application/problem+json",
            "application/vnd.api+json",
            "application/ld+json",
        ],
    ),
    ("HTML", &["text/html", "application/xhtml+xml"]),
    (
        "XML",
        &[
            "text/xml",
            "application/xml",
            "application/rss+xml",
            "application/atom+xml",
            "image/svg+xml",
        ],
    ),
    (
        "JavaScript",
        &[
            "application/javascript",
            "text/javascript",
            "application/x-javascript",
        ],
    ),
    ("CSS", &["text/css"]),
    ("YAML", &["application/yaml", "application/x-yaml", "text/yaml", "text/x-yaml"]),
    ("Markdown", &["text/markdown", "text/x-markdown"]),
    ("SQL", &["application/sql", "text/x-sql"]),
    ("Python", &["text/x-python", "application/x-python"]),
    ("Bourne Again Shell (bash)", &["application/x-sh", "text/x-shellscript"]),
];

struct Assets {
    syntax_set: SyntaxSet,
    themes: ThemeSet,
}

fn assets() -> &'static Assets {
    static ASSETS: OnceLock<Assets> = OnceLock::new();
    ASSETS.get_or_init(|| Assets {
        syntax_set: SyntaxSet::load_defaults_newlines(),
        themes: ThemeSet::load_defaults(),
    })
}

/// The named theme, or any bundled theme when it is unknown.
fn theme(name: &str) -> Option<&'static Theme> {
    let themes = &assets().themes.themes;
    themes.get(name).or_else(|| {
        warn!(theme = name, "unknown theme, using fallback");
        themes
            .get(DEFAULT_THEME)
            .or_else(|| themes.values().next())
    })
}

/// Syntax whose MIME list has an entry contained in `content_type`.
pub fn lexer_for_content_type(content_type: &str) -> Option<&'static SyntaxReference> {
    let content_type = content_type.to_lowercase();
    let syntax_set = &assets().syntax_set;
    MIME_REGISTRY
        .iter()
        .find(|(_, mime_types)| mime_types.iter().any(|mt| content_type.contains(mt)))
        .and_then(|(name, _)| syntax_set.find_syntax_by_name(name))
}

/// Guesses the syntax from the text itself.
pub fn analyse(text: &str) -> &'static SyntaxReference {
    let syntax_set = &assets().syntax_set;
    let trimmed = text.trim_start();

    if let Some(syntax) = syntax_set.find_syntax_by_first_line(trimmed) {
        return syntax;
    }

    let by_name = |name: &str| syntax_set.find_syntax_by_name(name);
    let lower: String = trimmed.chars().take(64).collect::<String>().to_lowercase();

    let guess = if (trimmed.starts_with('{') || trimmed.starts_with('['))
        && serde_json::from_str::<serde_json::Value>(text).is_ok()
    {
        by_name("JSON")
    } else if lower.starts_with("<!doctype html") || lower.starts_with("<html") {
        by_name("HTML")
    } else if trimmed.starts_with('<') {
        by_name("XML")
    } else {
        None
    };

    guess.unwrap_or_else(|| syntax_set.find_syntax_plain_text())
}

pub fn select_lexer(content_type: &str, text: &str) -> &'static SyntaxReference {
    let syntax = lexer_for_content_type(content_type).unwrap_or_else(|| analyse(text));
    debug!(content_type, syntax = %syntax.name, "lexer selected");
    syntax
}

/// Re-indents a JSON document. `None` when the text is not JSON.
pub fn prettify_json(text: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(text).ok()?;
    serde_json::to_string_pretty(&value).ok()
}

fn to_ratatui(style: SyntectStyle) -> Style {
    let fg = style.foreground;
    let mut out = Style::default().fg(Color::Rgb(fg.r, fg.g, fg.b));
    if style.font_style.contains(FontStyle::BOLD) {
        out = out.add_modifier(Modifier::BOLD);
    }
    if style.font_style.contains(FontStyle::ITALIC) {
        out = out.add_modifier(Modifier::ITALIC);
    }
    if style.font_style.contains(FontStyle::UNDERLINE) {
        out = out.add_modifier(Modifier::UNDERLINED);
    }
    out
}

/// Merges neighbouring ranges that share a style.
fn coalesce<'a>(ranges: Vec<(SyntectStyle, &'a str)>) -> Vec<(SyntectStyle, String)> {
    let mut merged: Vec<(SyntectStyle, String)> = Vec::with_capacity(ranges.len());
    for (style, text) in ranges {
        match merged.last_mut() {
            Some((last, acc)) if *last == style => acc.push_str(text),
            _ => merged.push((style, text.to_string())),
        }
    }
    merged
}

fn strip_newline(s: &mut String) {
    while s.ends_with('\n') || s.ends_with('\r') {
        s.pop();
    }
}

/// Makes text safe to put in terminal cells: tabs become spaces up to the
/// next tab stop and other control characters become U+FFFD. Line breaks
/// (`\n` and `\r\n`) are kept.
pub fn sanitize(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut column = 0;
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '\n' => {
                out.push(c);
                column = 0;
            }
            '\r' if chars.peek() == Some(&'\n') => out.push(c),
            '\t' => {
                let pad = TAB_WIDTH - column % TAB_WIDTH;
                out.extend(std::iter::repeat(' ').take(pad));
                column += pad;
            }
            c if c.is_control() => {
                out.push(char::REPLACEMENT_CHARACTER);
                column += 1;
            }
            c => {
                out.push(c);
                column += c.width().unwrap_or(0);
            }
        }
    }
    out
}

/// Highlights `text` with the given lexer and theme.
pub fn try_render(
    syntax: &SyntaxReference,
    theme_name: &str,
    text: &str,
) -> Result<Vec<Line<'static>>> {
    let theme = theme(theme_name).ok_or_else(|| anyhow!("no highlighting theme available"))?;
    let syntax_set = &assets().syntax_set;
    let mut highlighter = HighlightLines::new(syntax, theme);
    let text = sanitize(text);

    let mut lines = Vec::new();
    for line in LinesWithEndings::from(&text) {
        let ranges = highlighter.highlight_line(line, syntax_set)?;
        let spans: Vec<Span<'static>> = coalesce(ranges)
            .into_iter()
            .filter_map(|(style, mut s)| {
                strip_newline(&mut s);
                (!s.is_empty()).then(|| Span::styled(s, to_ratatui(style)))
            })
            .collect();
        lines.push(Line::from(spans));
    }
    Ok(lines)
}

/// Unhighlighted lines, used when highlighting fails.
pub fn plain(text: &str) -> Vec<Line<'static>> {
    sanitize(text)
        .lines()
        .map(|l| Line::raw(l.to_string()))
        .collect()
}

/// Highlights a response body for display. Highlighting errors degrade to
/// plain text.
pub fn render(content_type: &str, body: &str, theme_name: &str) -> Vec<Line<'static>> {
    render_with(content_type, body, theme_name, try_render)
}

/// [`render`] with the highlighter supplied by the caller.
pub fn render_with<F>(
    content_type: &str,
    body: &str,
    theme_name: &str,
    highlight: F,
) -> Vec<Line<'static>>
where
    F: Fn(&SyntaxReference, &str, &str) -> Result<Vec<Line<'static>>>,
{
    let syntax = select_lexer(content_type, body);
    highlight(syntax, theme_name, body).unwrap_or_else(|e| {
        warn!(syntax = %syntax.name, "highlighting failed, rendering plain text: {e}");
        plain(body)
    })
}

/// Splits one line into rows no wider than `width` columns. The line is
/// expected to be [`sanitize`]d already.
pub fn wrap_line(line: &Line<'static>, width: usize) -> Vec<Line<'static>> {
    if width == 0 {
        return vec![line.clone()];
    }

    let mut rows: Vec<Line<'static>> = Vec::new();
    let mut row: Vec<Span<'static>> = Vec::new();
    let mut row_width = 0;

    for span in &line.spans {
        let mut chunk = String::new();
        for c in span.content.chars() {
            let w = c.width().unwrap_or(1);
            if row_width + w > width && row_width > 0 {
                if !chunk.is_empty() {
                    row.push(Span::styled(std::mem::take(&mut chunk), span.style));
                }
                rows.push(Line::from(std::mem::take(&mut row)));
                row_width = 0;
            }
            chunk.push(c);
            row_width += w;
        }
        if !chunk.is_empty() {
            row.push(Span::styled(chunk, span.style));
        }
    }

    rows.push(Line::from(row));
    rows
}

pub fn wrap(lines: &[Line<'static>], width: usize) -> Vec<Line<'static>> {
    lines.iter().flat_map(|l| wrap_line(l, width)).collect()
}
