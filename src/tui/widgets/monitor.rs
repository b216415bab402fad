use ratatui::{
    layout::Rect,
    style::{Color, Style},
    text::Line,
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::tui::state::AppState;

/// Received data, newest at the bottom unless scrolled back.
pub fn render_monitor(f: &mut Frame, area: Rect, state: &AppState) {
    let height = usize::from(area.height.saturating_sub(2));
    let lines: Vec<Line> = state
        .visible_lines(height)
        .into_iter()
        .map(Line::from)
        .collect();

    let title = if state.scroll() > 0 {
        format!("Received (scrolled back {} lines)", state.scroll())
    } else {
        "Received".to_string()
    };

    let monitor = Paragraph::new(lines).style(Style::default().fg(Color::Green)).block(
        Block::default()
            .borders(Borders::ALL)
            .title(title),
    );

    f.render_widget(monitor, area);
}
