use crate::app::{App, StatusKind};
use crate::draft::HeaderSet;
use crate::field::{kind_of, SCHEMA, SLOT_COUNT};
use crate::input::TextInput;
use crate::keymap::BINDINGS;

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Wrap},
    Frame,
};
use std::time::Duration;

/// Columns given to one slot, prompt included.
const SLOT_WIDTH: u16 = 32;
const FIELDS_WIDTH: u16 = 1 + SLOT_WIDTH * 2;

fn prompt_style(active: bool) -> Style {
    if active {
        Style::default()
            .fg(Color::Magenta)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::DarkGray)
    }
}

fn url_style() -> Style {
    Style::default()
        .fg(Color::Cyan)
        .add_modifier(Modifier::BOLD)
}

/// Spans for one slot and the column of its cursor relative to the slot.
fn slot_spans(slot: usize, input: &TextInput, focused: usize) -> (Vec<Span<'static>>, u16) {
    let spec = &SCHEMA[slot];
    let active = kind_of(focused).prompt_slot(focused) == kind_of(slot).prompt_slot(slot);

    let mut spans = Vec::new();
    let mut used = 0;
    if !spec.prompt.is_empty() {
        let prompt = format!("{} > ", spec.prompt);
        used += prompt.chars().count();
        spans.push(Span::styled(prompt, prompt_style(active)));
    }
    let cursor = (used + input.cursor()) as u16;

    let value = input.value();
    used += value.chars().count();
    if input.is_empty() {
        used += spec.placeholder.chars().count();
        spans.push(Span::styled(
            spec.placeholder,
            Style::default().fg(Color::DarkGray),
        ));
    } else {
        spans.push(Span::raw(value.clone()));
        if slot == focused {
            if let Some(rest) = input
                .current_suggestion()
                .and_then(|s| s.get(value.len()..))
            {
                used += rest.chars().count();
                spans.push(Span::styled(
                    rest.to_string(),
                    Style::default().fg(Color::DarkGray),
                ));
            }
        }
    }

    let pad = usize::from(SLOT_WIDTH).saturating_sub(used);
    spans.push(Span::raw(" ".repeat(pad)));
    (spans, cursor)
}

fn draw_fields(frame: &mut Frame, app: &App, area: Rect) {
    let focus = app.focus();
    let focused = focus.focused();
    let mut rows = Vec::with_capacity(SLOT_COUNT / 2);
    let mut cursor = None;

    for (row, slot) in (0..SLOT_COUNT).step_by(2).enumerate() {
        let mut spans = vec![Span::raw(" ")];
        for (col, s) in [slot, slot + 1].into_iter().enumerate() {
            let (cells, x) = slot_spans(s, focus.fields().get(s), focused);
            if s == focused {
                cursor = Some((area.x + 1 + col as u16 * SLOT_WIDTH + x, area.y + row as u16));
            }
            spans.extend(cells);
        }
        rows.push(Line::from(spans));
    }

    frame.render_widget(Paragraph::new(rows), area);
    if let Some((x, y)) = cursor {
        if x < area.right() && y < area.bottom() {
            frame.set_cursor_position((x, y));
        }
    }
}

fn draw_help(frame: &mut Frame, area: Rect) {
    let hints: Vec<Span> = BINDINGS
        .iter()
        .flat_map(|(key, desc)| {
            [
                Span::styled(*key, Style::default().fg(Color::Gray)),
                Span::styled(format!(" {desc}  "), Style::default().fg(Color::DarkGray)),
            ]
        })
        .collect();
    frame.render_widget(
        Paragraph::new(Line::from(hints)).wrap(Wrap { trim: true }),
        area,
    );
}

fn header_lines(headers: &HeaderSet) -> Vec<Line<'static>> {
    headers
        .iter()
        .flat_map(|(name, values)| {
            values.iter().map(move |v| {
                Line::from(vec![
                    Span::raw(" "),
                    Span::styled(format!("{name}: "), Style::default().fg(Color::Blue)),
                    Span::raw(v.clone()),
                ])
            })
        })
        .collect()
}

fn request_lines(app: &App) -> Vec<Line<'static>> {
    let draft = app.draft();
    let mut lines = vec![
        Line::default(),
        Line::styled(
            format!(" {} {} {}", draft.protocol(), draft.method(), draft.url()),
            url_style(),
        ),
    ];
    lines.extend(header_lines(&draft.effective_headers()));
    if let Some(body) = draft.body() {
        lines.push(Line::default());
        lines.push(Line::styled(
            format!(" {body}"),
            Style::default().fg(Color::Yellow),
        ));
    }
    lines
}

fn response_lines(app: &App) -> Vec<Line<'static>> {
    let mut lines = vec![Line::default()];
    match app.response() {
        Some(res) => {
            lines.push(Line::styled(
                format!(" {} {}", res.protocol(), res.status_line()),
                url_style(),
            ));
            lines.extend(header_lines(res.headers()));
        }
        None => lines.push(Line::default()),
    }
    lines.push(Line::default());
    lines
}

/// `123ms` below a second, `1.23s` from there on.
pub fn format_elapsed(elapsed: Duration) -> String {
    if elapsed < Duration::from_secs(1) {
        format!("{}ms", elapsed.as_millis())
    } else {
        format!("{:.2}s", elapsed.as_secs_f64())
    }
}

pub fn badge_color(status: Option<u16>) -> Color {
    match status {
        Some(200..=299) => Color::Green,
        Some(300..=499) => Color::Yellow,
        Some(500..=599) => Color::Red,
        _ => Color::DarkGray,
    }
}

fn draw_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let status = app.response().map(|r| r.status());
    let badge = match status {
        Some(code) => format!(" {code} "),
        None if app.in_flight() => " ... ".to_string(),
        None => " --- ".to_string(),
    };
    let (message, kind) = app.status();
    let message_style = match kind {
        StatusKind::Info => Style::default().fg(Color::White),
        StatusKind::Error => Style::default().fg(Color::Red),
    };
    let elapsed = app.elapsed().map(format_elapsed).unwrap_or_default();
    let protocol = app
        .response()
        .map(|r| r.protocol().to_string())
        .unwrap_or_else(|| app.draft().protocol());

    let right = vec![
        Span::styled(
            format!(" #{} ", app.req_count()),
            Style::default().bg(Color::Blue).fg(Color::White),
        ),
        Span::styled(
            format!(" {elapsed} "),
            Style::default().bg(Color::DarkGray).fg(Color::White),
        ),
        Span::styled(
            format!(" {protocol} "),
            Style::default()
                .bg(Color::Magenta)
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        ),
    ];
    let right_width: usize = right.iter().map(Span::width).sum();

    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(0), Constraint::Length(right_width as u16)])
        .split(area);

    let left = Line::from(vec![
        Span::styled(
            badge,
            Style::default()
                .bg(badge_color(status))
                .fg(Color::Black)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(format!(" {message}"), message_style),
    ]);
    let bar = Style::default().bg(Color::Black);
    frame.render_widget(Paragraph::new(left).style(bar), chunks[0]);
    frame.render_widget(Paragraph::new(Line::from(right)).style(bar), chunks[1]);
}

pub fn draw(frame: &mut Frame, app: &App) {
    let request = request_lines(app);
    let response = response_lines(app);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(6),
            Constraint::Length(request.len() as u16),
            Constraint::Length(response.len() as u16),
            Constraint::Length(app.viewport_height() as u16),
            Constraint::Min(1),
            Constraint::Length(1),
        ])
        .split(frame.area());

    let top = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(FIELDS_WIDTH), Constraint::Min(0)])
        .split(chunks[0]);
    draw_fields(frame, app, top[0]);
    if app.show_help() {
        draw_help(frame, top[1]);
    }

    frame.render_widget(Paragraph::new(request), chunks[1]);
    frame.render_widget(Paragraph::new(response), chunks[2]);

    let body_area = chunks[3].inner(ratatui::layout::Margin {
        horizontal: 1,
        vertical: 0,
    });
    frame.render_widget(Paragraph::new(app.visible_lines().to_vec()), body_area);

    draw_status_bar(frame, app, chunks[5]);
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::args::CommandLineArgs;
    use crate::config::Settings;
    use crate::http::{ResponseCapture, Timed};
    use crate::keymap::Action;
    use ratatui::{backend::TestBackend, Terminal};

    fn screen(app: &App, width: u16, height: u16) -> Vec<String> {
        let mut terminal = Terminal::new(TestBackend::new(width, height)).unwrap();
        terminal.draw(|frame| draw(frame, app)).unwrap();
        let buffer = terminal.backend().buffer().clone();
        (0..height)
            .map(|y| {
                (0..width)
                    .map(|x| buffer[(x, y)].symbol().to_string())
                    .collect::<String>()
            })
            .collect()
    }

    fn app(args: &[&str]) -> App {
        let args = CommandLineArgs::parse_from(args).unwrap();
        App::new(&Settings::resolve(&args, None), 100, 30)
    }

    #[test]
    fn elapsed_formatting() {
        assert_eq!(format_elapsed(Duration::from_millis(123)), "123ms");
        assert_eq!(format_elapsed(Duration::from_millis(1234)), "1.23s");
    }

    #[test]
    fn badge_colors_follow_status_class() {
        assert_eq!(badge_color(Some(204)), Color::Green);
        assert_eq!(badge_color(Some(301)), Color::Yellow);
        assert_eq!(badge_color(Some(404)), Color::Yellow);
        assert_eq!(badge_color(Some(503)), Color::Red);
        assert_eq!(badge_color(None), Color::DarkGray);
    }

    #[test]
    fn draws_fields_and_request_line() {
        let app = app(&["posterm", "example.com", "--path", "/items", "-H", "Accept: */*"]);
        let rows = screen(&app, 100, 30);
        assert!(rows[0].contains("Host    > example.com"));
        assert!(rows[0].contains("HTTP/1. > 1"));
        assert!(rows[1].contains("Method  > GET"));
        assert!(rows[2].contains("X-Auth-Token"));
        assert!(rows[7].contains("HTTP/1.1 GET http://example.com/items"));
        assert!(rows[8].contains("Accept: */*"));
        assert!(rows[29].contains("#0"));
    }

    #[test]
    fn draws_response_summary_and_body() {
        let mut app = app(&["posterm"]);
        let generation = match app.handle_action(Action::Run).pop() {
            Some(crate::app::Effect::Spawn(_, g)) => g,
            other => panic!("unexpected {other:?}"),
        };
        let mut headers = HeaderSet::new();
        headers.insert("Content-Type".to_string(), vec!["text/plain".to_string()]);
        app.on_executed(Timed {
            generation,
            elapsed: Duration::from_millis(42),
            payload: Ok(ResponseCapture::new(
                200,
                "HTTP/1.1",
                headers,
                "hello body\n".to_string(),
            )),
        });

        let text = screen(&app, 100, 30).join("\n");
        assert!(text.contains("HTTP/1.1 200 OK"));
        assert!(text.contains("Content-Type: text/plain"));
        assert!(text.contains(" hello body"));
        assert!(text.contains(" 200 "));
        assert!(text.contains("42ms"));
        assert!(text.contains("#1"));
    }

    #[test]
    fn help_panel_lists_bindings() {
        let mut app = app(&["posterm"]);
        assert!(!screen(&app, 140, 30).join("\n").contains("send request"));
        app.handle_action(Action::ToggleHelp);
        assert!(screen(&app, 140, 30).join("\n").contains("send request"));
    }

    #[test]
    fn tiny_terminal_does_not_panic() {
        let app = app(&["posterm"]);
        screen(&app, 10, 3);
    }
}
