use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use super::{
    state::AppState,
    widgets::{
        help::render_help_popup, monitor::render_monitor, prompt::render_prompt,
        status::render_status_bar,
    },
};

pub fn draw_ui(f: &mut Frame, state: &mut AppState) {
    let size = f.size();
    state.terminal_size = (size.width, size.height);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Header
            Constraint::Min(0),    // Received data
            Constraint::Length(3), // Input
            Constraint::Length(1), // Status bar
        ])
        .split(size);

    render_header(f, chunks[0], state);
    render_monitor(f, chunks[1], state);
    render_prompt(f, chunks[2], state);
    render_status_bar(f, chunks[3], state);

    if state.show_help {
        render_help_popup(f, size);
    }
}

fn render_header(f: &mut Frame, area: Rect, state: &AppState) {
    let header = Paragraph::new(Line::from(vec![
        Span::styled(
            " Sermon ",
            Style::default()
                .fg(Color::White)
                .bg(Color::Blue)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw(" "),
        Span::styled(state.device_name.as_str(), Style::default().fg(Color::Cyan)),
    ]));
    f.render_widget(header, area);
}

pub fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
