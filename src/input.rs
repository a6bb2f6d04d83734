use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// First candidate that `typed` is a case-insensitive prefix of. Empty text
/// matches nothing.
pub fn prefix_match<'a, I>(candidates: I, typed: &str) -> Option<&'a str>
where
    I: IntoIterator<Item = &'a str>,
{
    if typed.is_empty() {
        return None;
    }
    let typed = typed.to_lowercase();
    candidates
        .into_iter()
        .find(|c| c.to_lowercase().starts_with(&typed))
}

/// Single-line editable text with a character cursor and optional completion
/// suggestions.
#[derive(Debug, Clone, Default)]
pub struct TextInput {
    value: Vec<char>,
    cursor: usize,
    char_limit: Option<usize>,
    suggestions: Vec<String>,
}

impl TextInput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_value(mut self, value: &str) -> Self {
        self.set_value(value);
        self
    }

    pub fn with_char_limit(mut self, limit: usize) -> Self {
        self.char_limit = Some(limit);
        let value = self.value();
        self.set_value(&value);
        self
    }

    pub fn with_suggestions<I, S>(mut self, suggestions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.suggestions = suggestions.into_iter().map(Into::into).collect();
        self
    }

    pub fn value(&self) -> String {
        self.value.iter().collect()
    }

    pub fn is_empty(&self) -> bool {
        self.value.is_empty()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Replaces the text and moves the cursor to the end.
    pub fn set_value(&mut self, value: &str) {
        let mut chars: Vec<char> = value.chars().collect();
        if let Some(limit) = self.char_limit {
            chars.truncate(limit);
        }
        self.value = chars;
        self.cursor_end();
    }

    pub fn reset(&mut self) {
        self.value.clear();
        self.cursor = 0;
    }

    pub fn cursor_end(&mut self) {
        self.cursor = self.value.len();
    }

    pub fn cursor_start(&mut self) {
        self.cursor = 0;
    }

    pub fn insert(&mut self, c: char) {
        if self.char_limit.is_some_and(|limit| self.value.len() >= limit) {
            return;
        }
        self.value.insert(self.cursor, c);
        self.cursor += 1;
    }

    pub fn backspace(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
            self.value.remove(self.cursor);
        }
    }

    pub fn delete(&mut self) {
        if self.cursor < self.value.len() {
            self.value.remove(self.cursor);
        }
    }

    pub fn move_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn move_right(&mut self) {
        self.cursor = (self.cursor + 1).min(self.value.len());
    }

    /// First suggestion the current text is a case-insensitive prefix of.
    pub fn current_suggestion(&self) -> Option<&str> {
        prefix_match(self.suggestions.iter().map(String::as_str), &self.value())
    }

    pub fn accept_suggestion(&mut self) {
        if let Some(s) = self.current_suggestion().map(str::to_string) {
            self.set_value(&s);
        }
    }

    /// Applies an editing key. Returns false when the key is not an editing key.
    pub fn handle_key(&mut self, key: &KeyEvent) -> bool {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Char('e') if ctrl => self.accept_suggestion(),
            KeyCode::Char('u') if ctrl => self.reset(),
            KeyCode::Char(c) if !ctrl => self.insert(c),
            KeyCode::Backspace => self.backspace(),
            KeyCode::Delete => self.delete(),
            KeyCode::Left => self.move_left(),
            KeyCode::Right => self.move_right(),
            KeyCode::Home => self.cursor_start(),
            KeyCode::End => self.cursor_end(),
            _ => return false,
        }
        true
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn typing_inserts_at_cursor() {
        let mut input = TextInput::new().with_value("GT");
        input.move_left();
        assert!(input.handle_key(&key(KeyCode::Char('E'))));
        assert_eq!(input.value(), "GET");
        assert_eq!(input.cursor(), 2);
    }

    #[test]
    fn backspace_and_delete() {
        let mut input = TextInput::new().with_value("abc");
        input.backspace();
        assert_eq!(input.value(), "ab");
        input.cursor_start();
        input.delete();
        assert_eq!(input.value(), "b");
        input.cursor_start();
        input.backspace();
        assert_eq!(input.value(), "b");
    }

    #[test]
    fn char_limit_is_enforced() {
        let mut input = TextInput::new().with_char_limit(1).with_value("10");
        assert_eq!(input.value(), "1");
        input.insert('0');
        assert_eq!(input.value(), "1");
    }

    #[test]
    fn suggestion_matches_prefix_case_insensitively() {
        let input = TextInput::new()
            .with_suggestions(["GET", "POST", "PUT"])
            .with_value("pu");
        assert_eq!(input.current_suggestion(), Some("PUT"));

        let empty = TextInput::new().with_suggestions(["GET"]);
        assert_eq!(empty.current_suggestion(), None);
    }

    #[test]
    fn prefix_match_takes_first_candidate_literally() {
        let candidates = ["PUT", "PATCH", "P.*"];
        assert_eq!(prefix_match(candidates, "p"), Some("PUT"));
        assert_eq!(prefix_match(candidates, "pA"), Some("PATCH"));
        assert_eq!(prefix_match(candidates, "p."), Some("P.*"));
        assert_eq!(prefix_match(candidates, ".*"), None);
        assert_eq!(prefix_match(candidates, ""), None);
    }

    #[test]
    fn ctrl_e_accepts_suggestion() {
        let mut input = TextInput::new()
            .with_suggestions(["OPTIONS"])
            .with_value("op");
        input.handle_key(&KeyEvent::new(KeyCode::Char('e'), KeyModifiers::CONTROL));
        assert_eq!(input.value(), "OPTIONS");
        assert_eq!(input.cursor(), 7);
    }

    #[test]
    fn non_editing_keys_are_not_consumed() {
        let mut input = TextInput::new();
        assert!(!input.handle_key(&key(KeyCode::Tab)));
        assert!(!input.handle_key(&key(KeyCode::Enter)));
    }
}
