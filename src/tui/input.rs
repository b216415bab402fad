use crossterm::event::{KeyCode, KeyEvent};

/// Single-line editor. The cursor counts characters, not bytes.
#[derive(Debug, Clone, Default)]
pub struct InputBuffer {
    content: String,
    cursor_position: usize,
}

impl InputBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        match key.code {
            KeyCode::Char(c) => {
                self.insert_char(c);
                true
            }
            KeyCode::Backspace => {
                self.delete_char();
                true
            }
            KeyCode::Delete => {
                self.delete_char_forward();
                true
            }
            KeyCode::Left => {
                self.cursor_position = self.cursor_position.saturating_sub(1);
                true
            }
            KeyCode::Right => {
                self.cursor_position = (self.cursor_position + 1).min(self.len());
                true
            }
            KeyCode::Home => {
                self.cursor_position = 0;
                true
            }
            KeyCode::End => {
                self.cursor_position = self.len();
                true
            }
            _ => false,
        }
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn cursor_position(&self) -> usize {
        self.cursor_position
    }

    /// Replace the content and put the cursor at the end.
    pub fn set_content(&mut self, content: impl Into<String>) {
        self.content = content.into();
        self.cursor_position = self.len();
    }

    /// Take the content, leaving the buffer empty.
    pub fn take(&mut self) -> String {
        self.cursor_position = 0;
        std::mem::take(&mut self.content)
    }

    pub fn clear(&mut self) {
        self.content.clear();
        self.cursor_position = 0;
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    /// Length in characters.
    pub fn len(&self) -> usize {
        self.content.chars().count()
    }

    fn byte_index(&self, char_index: usize) -> usize {
        self.content
            .char_indices()
            .nth(char_index)
            .map_or(self.content.len(), |(i, _)| i)
    }

    fn insert_char(&mut self, c: char) {
        let at = self.byte_index(self.cursor_position);
        self.content.insert(at, c);
        self.cursor_position += 1;
    }

    fn delete_char(&mut self) {
        if self.cursor_position > 0 {
            self.cursor_position -= 1;
            let at = self.byte_index(self.cursor_position);
            self.content.remove(at);
        }
    }

    fn delete_char_forward(&mut self) {
        if self.cursor_position < self.len() {
            let at = self.byte_index(self.cursor_position);
            self.content.remove(at);
        }
    }
}

impl std::fmt::Display for InputBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.content)
    }
}

/// Previously submitted lines, browsed with Up/Down.
#[derive(Debug, Clone, Default)]
pub struct CommandHistory {
    entries: Vec<String>,
    position: Option<usize>,
}

impl CommandHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a submitted line. Repeats of the last line are not stored twice.
    pub fn push(&mut self, line: &str) {
        self.position = None;
        if line.is_empty() || self.entries.last().map(String::as_str) == Some(line) {
            return;
        }
        self.entries.push(line.to_string());
    }

    /// Step back in time.
    pub fn older(&mut self) -> Option<&str> {
        if self.entries.is_empty() {
            return None;
        }
        let index = match self.position {
            Some(0) => 0,
            Some(i) => i - 1,
            None => self.entries.len() - 1,
        };
        self.position = Some(index);
        self.entries.get(index).map(String::as_str)
    }

    /// Step forward; `None` once past the newest entry.
    pub fn newer(&mut self) -> Option<&str> {
        let index = self.position? + 1;
        if index >= self.entries.len() {
            self.position = None;
            return None;
        }
        self.position = Some(index);
        self.entries.get(index).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyModifiers;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_editing_with_cursor() {
        let mut input = InputBuffer::new();
        for c in "ATZ".chars() {
            input.handle_key(key(KeyCode::Char(c)));
        }
        input.handle_key(key(KeyCode::Left));
        input.handle_key(key(KeyCode::Char('+')));
        assert_eq!(input.content(), "AT+Z");

        input.handle_key(key(KeyCode::Home));
        input.handle_key(key(KeyCode::Delete));
        assert_eq!(input.content(), "T+Z");

        input.handle_key(key(KeyCode::End));
        input.handle_key(key(KeyCode::Backspace));
        assert_eq!(input.content(), "T+");
        assert_eq!(input.cursor_position(), 2);
    }

    #[test]
    fn test_non_ascii_editing() {
        let mut input = InputBuffer::new();
        input.set_content("caf\u{e9}");
        input.handle_key(key(KeyCode::Backspace));
        assert_eq!(input.content(), "caf");
        input.handle_key(key(KeyCode::Char('\u{e9}')));
        input.handle_key(key(KeyCode::Char('!')));
        assert_eq!(input.content(), "caf\u{e9}!");
        assert_eq!(input.take(), "caf\u{e9}!");
        assert!(input.is_empty());
    }

    #[test]
    fn test_history_navigation() {
        let mut history = CommandHistory::new();
        history.push("one");
        history.push("two");
        history.push("two");
        history.push("");
        assert_eq!(history.len(), 2);

        assert_eq!(history.older(), Some("two"));
        assert_eq!(history.older(), Some("one"));
        assert_eq!(history.older(), Some("one"));
        assert_eq!(history.newer(), Some("two"));
        assert_eq!(history.newer(), None);
        assert_eq!(history.newer(), None);
    }
}
