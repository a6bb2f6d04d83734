use crate::config::Settings;
use crate::draft::RequestDraft;
use crate::focus::FocusMachine;
use crate::http::{HttpClient, Outcome, PreparedRequest, ResponseCapture, Timed};
use crate::keymap::{action_for, Action};
use crate::pager::Pager;
use crate::render::{prettify_json, render, wrap};
use crate::ui;

use anyhow::{Context, Result};
use crossterm::{
    cursor::Show,
    event::{Event, EventStream, KeyEvent, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use futures::StreamExt;
use ratatui::{backend::CrosstermBackend, text::Line, Terminal};
use std::io::{stdout, Stdout};
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Rows taken by the field inputs above the summaries.
const FIELD_ROWS: usize = 6;
/// Status bar plus the blank row above it.
const FOOTER_ROWS: usize = 2;

pub type Tui = Terminal<CrosstermBackend<Stdout>>;

/// Work the event loop performs on behalf of the app after an event.
#[derive(Debug, PartialEq)]
pub enum Effect {
    Spawn(PreparedRequest, u64),
    ClearScreen,
    ToggleFullscreen,
    Quit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    Info,
    Error,
}

/// All session state. Events are applied one at a time on the main task.
pub struct App {
    draft: RequestDraft,
    focus: FocusMachine,
    response: Option<ResponseCapture>,
    highlighted: Vec<Line<'static>>,
    lines: Vec<Line<'static>>,
    pager: Pager,
    status: String,
    status_kind: StatusKind,
    req_count: u64,
    generation: u64,
    in_flight: bool,
    elapsed: Option<Duration>,
    show_help: bool,
    fullscreen: bool,
    width: u16,
    height: u16,
    theme: String,
    pretty_json: bool,
}

impl App {
    pub fn new(settings: &Settings, width: u16, height: u16) -> Self {
        let mut draft = RequestDraft::default();
        let mut focus = FocusMachine::default();
        settings.seed(&mut focus, &mut draft);

        App {
            draft,
            focus,
            response: None,
            highlighted: Vec::new(),
            lines: Vec::new(),
            pager: Pager::new(settings.page_shift()),
            status: String::new(),
            status_kind: StatusKind::Info,
            req_count: 0,
            generation: 0,
            in_flight: false,
            elapsed: None,
            show_help: false,
            fullscreen: false,
            width,
            height,
            theme: settings.theme().to_string(),
            pretty_json: settings.pretty_json(),
        }
    }

    pub fn draft(&self) -> &RequestDraft {
        &self.draft
    }

    pub fn focus(&self) -> &FocusMachine {
        &self.focus
    }

    pub fn response(&self) -> Option<&ResponseCapture> {
        self.response.as_ref()
    }

    #[allow(dead_code)]
    pub fn lines(&self) -> &[Line<'static>] {
        &self.lines
    }

    #[allow(dead_code)]
    pub fn offset(&self) -> usize {
        self.pager.offset()
    }

    pub fn status(&self) -> (&str, StatusKind) {
        (&self.status, self.status_kind)
    }

    pub fn req_count(&self) -> u64 {
        self.req_count
    }

    pub fn in_flight(&self) -> bool {
        self.in_flight
    }

    pub fn elapsed(&self) -> Option<Duration> {
        self.elapsed
    }

    pub fn show_help(&self) -> bool {
        self.show_help
    }

    pub fn fullscreen(&self) -> bool {
        self.fullscreen
    }

    pub fn handle_key(&mut self, key: &KeyEvent) -> Vec<Effect> {
        match action_for(key) {
            Some(action) => self.handle_action(action),
            None => {
                self.focus.focused_input().handle_key(key);
                Vec::new()
            }
        }
    }

    pub fn handle_action(&mut self, action: Action) -> Vec<Effect> {
        match action {
            Action::Confirm => self.focus.confirm(&mut self.draft),
            Action::Next => self.focus.advance(&mut self.draft),
            Action::Prev => self.focus.retreat(),
            Action::Run => {
                let prepared = self.begin_run();
                return vec![Effect::Spawn(prepared, self.generation)];
            }
            Action::PageDown => {
                let height = self.viewport_height();
                self.pager.page_down(self.lines.len(), height);
            }
            Action::PageUp => self.pager.page_up(),
            Action::ToggleFullscreen => {
                self.fullscreen = !self.fullscreen;
                return vec![Effect::ToggleFullscreen];
            }
            Action::ToggleHelp => self.show_help = !self.show_help,
            Action::Quit => return vec![Effect::Quit],
        }
        Vec::new()
    }

    /// Drops the previous response and snapshots the draft for a new run.
    pub fn begin_run(&mut self) -> PreparedRequest {
        self.clear_response();
        self.req_count += 1;
        self.generation += 1;
        self.in_flight = true;
        self.set_status(StatusKind::Info, "sending...");

        let prepared = PreparedRequest::from_draft(&self.draft);
        info!(generation = self.generation, url = %prepared.url, "run requested");
        prepared
    }

    pub fn on_executed(&mut self, timed: Timed<Outcome>) -> Vec<Effect> {
        if timed.generation != self.generation {
            debug!(
                stale = timed.generation,
                latest = self.generation,
                "discarding stale outcome"
            );
            return Vec::new();
        }

        self.in_flight = false;
        self.elapsed = Some(timed.elapsed);

        match timed.payload {
            Ok(res) => {
                let body = if self.pretty_json {
                    prettify_json(res.body()).unwrap_or_else(|| res.body().to_string())
                } else {
                    res.body().to_string()
                };
                self.highlighted = render(res.content_type(), &body, &self.theme);
                self.rewrap();
                self.set_status(StatusKind::Info, &format!("{} lines", self.highlighted.len()));
                self.response = Some(res);
                Vec::new()
            }
            Err(e) => {
                warn!("request failed: {e}");
                self.clear_response();
                self.set_status(StatusKind::Error, &e);
                vec![Effect::ClearScreen]
            }
        }
    }

    pub fn resize(&mut self, width: u16, height: u16) {
        self.width = width;
        self.height = height;
        self.rewrap();
    }

    /// Columns available to the body, one column of padding on each side.
    pub fn body_width(&self) -> usize {
        usize::from(self.width).saturating_sub(2)
    }

    pub fn request_rows(&self) -> usize {
        let header_lines: usize = self
            .draft
            .effective_headers()
            .values()
            .map(Vec::len)
            .sum();
        let form_rows = if self.draft.body().is_some() { 2 } else { 0 };
        2 + header_lines + form_rows
    }

    /// Blank, status line, headers, blank. The status line is empty before
    /// the first response.
    pub fn response_rows(&self) -> usize {
        3 + self
            .response
            .as_ref()
            .map_or(0, |res| res.headers().values().map(Vec::len).sum::<usize>())
    }

    /// Rows used by everything except the body page and footer. The help
    /// panel sits beside the fields and takes no rows of its own.
    pub fn chrome_rows(&self) -> usize {
        FIELD_ROWS + self.request_rows() + self.response_rows()
    }

    pub fn viewport_height(&self) -> usize {
        usize::from(self.height)
            .saturating_sub(self.chrome_rows())
            .saturating_sub(FOOTER_ROWS)
    }

    pub fn visible_lines(&self) -> &[Line<'static>] {
        self.pager.page(&self.lines, self.viewport_height())
    }

    fn rewrap(&mut self) {
        self.lines = wrap(&self.highlighted, self.body_width());
        self.pager.reset();
    }

    fn clear_response(&mut self) {
        self.response = None;
        self.highlighted.clear();
        self.lines.clear();
        self.pager.reset();
    }

    fn set_status(&mut self, kind: StatusKind, message: &str) {
        self.status_kind = kind;
        self.status = message.to_string();
    }
}

pub fn init_terminal() -> Result<Tui> {
    enable_raw_mode().context("Failed to enable raw mode")?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;
    terminal.clear()?;
    Ok(terminal)
}

pub fn restore_terminal() -> Result<()> {
    disable_raw_mode()?;
    execute!(stdout(), LeaveAlternateScreen, Show)?;
    Ok(())
}

/// Leaves raw mode before the default hook prints the panic message.
pub fn install_panic_hook() {
    let hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = restore_terminal();
        hook(info);
    }));
}

fn set_fullscreen(terminal: &mut Tui, on: bool) -> Result<()> {
    if on {
        execute!(terminal.backend_mut(), EnterAlternateScreen)?;
    } else {
        execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    }
    terminal.clear()?;
    Ok(())
}

/// Draws, waits for a key press, a resize or a finished request, applies it,
/// and repeats until the app asks to quit.
pub async fn run(mut app: App, terminal: &mut Tui) -> Result<()> {
    let client = HttpClient::new()?;
    let (tx, mut rx) = mpsc::unbounded_channel::<Timed<Outcome>>();
    let mut events = EventStream::new();

    loop {
        terminal.draw(|frame| ui::draw(frame, &app))?;

        let effects = tokio::select! {
            event = events.next() => match event {
                Some(Ok(Event::Key(key))) if key.kind == KeyEventKind::Press => app.handle_key(&key),
                Some(Ok(Event::Resize(width, height))) => {
                    app.resize(width, height);
                    Vec::new()
                }
                Some(Ok(_)) => Vec::new(),
                Some(Err(e)) => return Err(e).context("Failed to read terminal event"),
                None => return Ok(()),
            },
            Some(timed) = rx.recv() => app.on_executed(timed),
        };

        for effect in effects {
            match effect {
                Effect::Spawn(prepared, generation) => {
                    client.spawn(prepared, generation, tx.clone())
                }
                Effect::ClearScreen => terminal.clear()?,
                Effect::ToggleFullscreen => set_fullscreen(terminal, app.fullscreen())?,
                Effect::Quit => return Ok(()),
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::args::CommandLineArgs;
    use crate::draft::HeaderSet;
    use crate::field::{HOST, METHOD, PROTO};
    use crossterm::event::{KeyCode, KeyModifiers};

    fn app_with(args: &[&str], width: u16, height: u16) -> App {
        let args = CommandLineArgs::parse_from(args).unwrap();
        App::new(&Settings::resolve(&args, None), width, height)
    }

    fn app() -> App {
        app_with(&["posterm"], 80, 60)
    }

    fn response(body: &str) -> ResponseCapture {
        let mut headers = HeaderSet::new();
        headers.insert("Content-Type".to_string(), vec!["text/plain".to_string()]);
        ResponseCapture::new(200, "HTTP/1.1", headers, body.to_string())
    }

    fn numbered(n: usize) -> String {
        (0..n).map(|i| format!("line {i}\n")).collect()
    }

    fn deliver(app: &mut App, generation: u64, payload: Outcome) -> Vec<Effect> {
        app.on_executed(Timed {
            generation,
            elapsed: Duration::from_millis(12),
            payload,
        })
    }

    fn run_with(app: &mut App, payload: Outcome) -> Vec<Effect> {
        let generation = match app.handle_action(Action::Run).pop() {
            Some(Effect::Spawn(_, generation)) => generation,
            other => panic!("expected spawn, got {other:?}"),
        };
        deliver(app, generation, payload)
    }

    #[test]
    fn typing_edits_the_focused_slot() {
        let mut app = app();
        assert_eq!(app.focus().focused(), HOST);
        app.handle_key(&KeyEvent::new(KeyCode::Char('x'), KeyModifiers::NONE));
        assert_eq!(app.focus().fields().text(HOST), "localhostx");
    }

    #[test]
    fn enter_commits_and_moves_on() {
        let mut app = app();
        app.handle_key(&KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE));
        assert_eq!(app.focus().focused(), PROTO);
        app.handle_key(&KeyEvent::new(KeyCode::Char('u'), KeyModifiers::CONTROL));
        app.handle_key(&KeyEvent::new(KeyCode::Char('0'), KeyModifiers::NONE));
        app.handle_key(&KeyEvent::new(KeyCode::Tab, KeyModifiers::NONE));
        assert_eq!(app.focus().focused(), METHOD);
        assert_eq!(app.draft().protocol(), "HTTP/1.0");
    }

    #[test]
    fn run_bumps_counter_and_generation() {
        let mut app = app();
        let effects = app.handle_action(Action::Run);
        assert_eq!(app.req_count(), 1);
        assert!(app.in_flight());
        match effects.as_slice() {
            [Effect::Spawn(prepared, 1)] => assert_eq!(prepared.url, "http://localhost"),
            other => panic!("unexpected effects {other:?}"),
        }
        assert_eq!(app.handle_action(Action::Run).len(), 1);
        assert_eq!(app.req_count(), 2);
    }

    #[test]
    fn successful_outcome_renders_body() {
        let mut app = app();
        let effects = run_with(&mut app, Ok(response("a\nb\nc\n")));
        assert!(effects.is_empty());
        assert!(!app.in_flight());
        assert_eq!(app.lines().len(), 3);
        assert_eq!(app.response().map(|r| r.status()), Some(200));
        assert_eq!(app.elapsed(), Some(Duration::from_millis(12)));
    }

    #[test]
    fn run_after_response_clears_lines_and_offset() {
        let mut app = app_with(&["posterm"], 80, 30);
        run_with(&mut app, Ok(response(&numbered(100))));
        app.handle_action(Action::PageDown);
        assert!(app.offset() > 0);

        app.handle_action(Action::Run);
        assert!(app.lines().is_empty());
        assert!(app.response().is_none());
        assert_eq!(app.offset(), 0);
    }

    #[test]
    fn stale_outcome_is_ignored() {
        let mut app = app();
        app.handle_action(Action::Run);
        app.handle_action(Action::Run);

        let effects = deliver(&mut app, 1, Ok(response("old\n")));
        assert!(effects.is_empty());
        assert!(app.response().is_none());
        assert!(app.in_flight());

        deliver(&mut app, 2, Ok(response("new\n")));
        assert_eq!(app.response().map(|r| r.body()), Some("new\n"));
    }

    #[test]
    fn failed_outcome_reports_error_and_clears_screen() {
        let mut app = app();
        run_with(&mut app, Ok(response("first\n")));

        let effects = run_with(&mut app, Err("connection refused".to_string()));
        assert_eq!(effects, vec![Effect::ClearScreen]);
        assert_eq!(app.status(), ("connection refused", StatusKind::Error));
        assert!(app.response().is_none());
        assert!(app.lines().is_empty());
    }

    #[test]
    fn viewport_subtracts_chrome() {
        let mut app = app_with(&["posterm"], 80, 40);
        // fields 6, request block 2, empty response block 3, footer 2
        assert_eq!(app.viewport_height(), 40 - 6 - 2 - 3 - 2);

        run_with(&mut app, Ok(response("x\n")));
        assert_eq!(app.viewport_height(), 40 - 6 - 2 - 4 - 2);

        app.handle_action(Action::ToggleHelp);
        assert_eq!(app.viewport_height(), 40 - 6 - 2 - 4 - 2);

        let mut with_form = app_with(&["posterm", "-H", "Accept: */*"], 80, 40);
        with_form.focus.fields_mut().get_mut(crate::field::FORM).set_value("login");
        with_form.focus.seed(crate::field::FORM_VAL, "user", &mut with_form.draft);
        // Accept and Content-Type headers, blank and form line
        assert_eq!(with_form.viewport_height(), 40 - 6 - (2 + 2 + 2) - 3 - 2);

        app.resize(80, 5);
        assert_eq!(app.viewport_height(), 0);
    }

    #[test]
    fn page_keys_scroll_within_bounds() {
        // 6 + 2 + 3 + 1 + 2 chrome rows, leaves a 20 row viewport.
        let mut app = app_with(&["posterm"], 80, 34);
        run_with(&mut app, Ok(response(&numbered(100))));
        assert_eq!(app.viewport_height(), 20);

        app.handle_action(Action::PageDown);
        assert_eq!(app.offset(), 5);
        for _ in 0..30 {
            app.handle_action(Action::PageDown);
        }
        assert_eq!(app.offset(), 80);
        assert_eq!(app.visible_lines().len(), 20);

        app.handle_action(Action::PageUp);
        assert_eq!(app.offset(), 75);
    }

    #[test]
    fn resize_rewraps_and_resets_offset() {
        let mut app = app_with(&["posterm"], 12, 40);
        run_with(&mut app, Ok(response(&format!("{}\n{}", "y".repeat(25), numbered(40)))));
        assert_eq!(app.body_width(), 10);
        assert_eq!(app.lines().len(), 3 + 40);

        app.handle_action(Action::PageDown);
        assert!(app.offset() > 0);
        app.resize(100, 40);
        assert_eq!(app.lines().len(), 1 + 40);
        assert_eq!(app.offset(), 0);
    }

    #[test]
    fn toggles_and_quit() {
        let mut app = app();
        assert_eq!(
            app.handle_action(Action::ToggleFullscreen),
            vec![Effect::ToggleFullscreen]
        );
        assert!(app.fullscreen());
        assert!(app.handle_action(Action::ToggleHelp).is_empty());
        assert!(app.show_help());
        assert_eq!(app.handle_action(Action::Quit), vec![Effect::Quit]);
    }

    #[test]
    fn pretty_json_reindents_before_highlighting() {
        let mut app = app_with(&["posterm", "--pretty"], 80, 60);
        let mut headers = HeaderSet::new();
        headers.insert(
            "Content-Type".to_string(),
            vec!["application/json".to_string()],
        );
        let res = ResponseCapture::new(200, "HTTP/1.1", headers, r#"{"a":1,"b":[2]}"#.to_string());
        run_with(&mut app, Ok(res));
        assert!(app.lines().len() > 1);
    }
}
