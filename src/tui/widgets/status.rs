use ratatui::{
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use crate::tui::state::AppState;

pub fn render_status_bar(f: &mut Frame, area: Rect, state: &AppState) {
    let (status_text, status_style) = match &state.status_message {
        Some(message) => (message.clone(), Style::default().fg(Color::Yellow)),
        None => (
            format!(
                "Lines: {} | History: {} | Help: %help | Quit: Ctrl-C",
                state.line_count(),
                state.history.len()
            ),
            Style::default().fg(Color::Gray),
        ),
    };

    let status = Paragraph::new(Line::from(vec![Span::styled(status_text, status_style)]));

    f.render_widget(status, area);
}
