use std::collections::VecDeque;

use crate::core::transmit::literal::decode_latin1;

use super::input::{CommandHistory, InputBuffer};

const DEFAULT_SCROLLBACK: usize = 5000;

#[derive(Debug)]
pub struct AppState {
    pub device_name: String,
    pub input: InputBuffer,
    pub history: CommandHistory,
    pub status_message: Option<String>,
    pub show_help: bool,
    pub terminal_size: (u16, u16),
    lines: VecDeque<String>,
    partial: String,
    scroll: usize,
    scrollback: usize,
}

impl AppState {
    pub fn new(device_name: impl Into<String>) -> Self {
        Self {
            device_name: device_name.into(),
            input: InputBuffer::new(),
            history: CommandHistory::new(),
            status_message: Some("Type %help for commands. Ctrl-C quits.".to_string()),
            show_help: false,
            terminal_size: (80, 24),
            lines: VecDeque::new(),
            partial: String::new(),
            scroll: 0,
            scrollback: DEFAULT_SCROLLBACK,
        }
    }

    /// Add received bytes to the display. Bytes are shown as Latin-1;
    /// carriage returns are dropped and `\n` ends a line.
    pub fn push_received(&mut self, data: &[u8]) {
        for c in decode_latin1(data).chars() {
            match c {
                '\r' => {}
                '\n' => {
                    let line = std::mem::take(&mut self.partial);
                    self.lines.push_back(line);
                    if self.scroll > 0 {
                        self.scroll += 1;
                    }
                }
                c => self.partial.push(c),
            }
        }

        while self.lines.len() > self.scrollback {
            self.lines.pop_front();
        }
        self.scroll = self.scroll.min(self.lines.len());
    }

    pub fn clear_display(&mut self) {
        self.lines.clear();
        self.partial.clear();
        self.scroll = 0;
    }

    /// Total lines, counting an unfinished last line.
    pub fn line_count(&self) -> usize {
        self.lines.len() + usize::from(!self.partial.is_empty())
    }

    /// The `height` lines that end `scroll` lines above the bottom.
    pub fn visible_lines(&self, height: usize) -> Vec<&str> {
        let all: Vec<&str> = self
            .lines
            .iter()
            .map(String::as_str)
            .chain((!self.partial.is_empty()).then_some(self.partial.as_str()))
            .collect();

        let end = all.len().saturating_sub(self.scroll);
        let start = end.saturating_sub(height);
        all[start..end].to_vec()
    }

    pub fn scroll(&self) -> usize {
        self.scroll
    }

    pub fn scroll_up(&mut self, lines: usize) {
        self.scroll = (self.scroll + lines).min(self.line_count());
    }

    pub fn scroll_down(&mut self, lines: usize) {
        self.scroll = self.scroll.saturating_sub(lines);
    }

    pub fn set_status_message(&mut self, message: impl Into<String>) {
        self.status_message = Some(message.into());
    }

    pub fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
    }

    #[cfg(test)]
    fn with_scrollback(mut self, scrollback: usize) -> Self {
        self.scrollback = scrollback;
        self
    }
}
