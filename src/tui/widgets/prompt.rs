use ratatui::{
    layout::Rect,
    style::{Color, Style},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::tui::state::AppState;

const PROMPT: &str = "> ";

pub fn render_prompt(f: &mut Frame, area: Rect, state: &AppState) {
    let input = Paragraph::new(format!("{}{}", PROMPT, state.input))
        .style(Style::default().fg(Color::Yellow))
        .block(Block::default().borders(Borders::ALL).title("Send"));

    f.render_widget(input, area);

    if !state.show_help {
        let offset = u16::try_from(PROMPT.len() + state.input.cursor_position()).unwrap_or(u16::MAX);
        let max_x = area.x + area.width.saturating_sub(2);
        f.set_cursor((area.x + 1).saturating_add(offset).min(max_x), area.y + 1);
    }
}
