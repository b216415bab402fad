use ratatui::{
    layout::Rect,
    style::{Color, Style},
    text::Line,
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use crate::core::magic::builtins::HELP_TEXT;
use crate::tui::ui::centered_rect;

pub fn render_help_popup(f: &mut Frame, area: Rect) {
    let popup_area = centered_rect(70, 80, area);

    f.render_widget(Clear, popup_area);

    let mut help_content: Vec<Line> = HELP_TEXT.lines().map(Line::from).collect();
    help_content.extend([
        Line::from(""),
        Line::from("Keys:"),
        Line::from("  Up / Down        - Command history"),
        Line::from("  PgUp / PgDn      - Scroll received data"),
        Line::from("  Esc              - Clear input / close help"),
        Line::from("  Ctrl-C           - Quit"),
    ]);

    let help = Paragraph::new(help_content)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Help")
                .border_style(Style::default().fg(Color::Yellow)),
        )
        .wrap(Wrap { trim: false });

    f.render_widget(help, popup_area);
}
