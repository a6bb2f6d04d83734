use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Confirm,
    Next,
    Prev,
    Run,
    PageUp,
    PageDown,
    ToggleFullscreen,
    ToggleHelp,
    Quit,
}

/// Key hints shown in the help panel, in display order.
pub const BINDINGS: &[(&str, &str)] = &[
    ("enter", "save field, next"),
    ("tab/↓", "next field"),
    ("shift+tab/↑", "previous field"),
    ("ctrl+r", "send request"),
    ("pgup/pgdn", "scroll response"),
    ("ctrl+e", "accept suggestion"),
    ("ctrl+f", "toggle fullscreen"),
    ("f1", "toggle help"),
    ("esc/ctrl+c", "quit"),
];

pub fn action_for(key: &KeyEvent) -> Option<Action> {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    let action = match key.code {
        KeyCode::Enter => Action::Confirm,
        KeyCode::Tab | KeyCode::Down => Action::Next,
        KeyCode::BackTab | KeyCode::Up => Action::Prev,
        KeyCode::PageUp => Action::PageUp,
        KeyCode::PageDown => Action::PageDown,
        KeyCode::F(1) => Action::ToggleHelp,
        KeyCode::Esc => Action::Quit,
        KeyCode::Char('c') if ctrl => Action::Quit,
        KeyCode::Char('r') if ctrl => Action::Run,
        KeyCode::Char('f') if ctrl => Action::ToggleFullscreen,
        _ => return None,
    };
    Some(action)
}
