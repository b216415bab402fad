use std::io;
use std::time::Duration;

use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tokio::sync::mpsc::{error::TryRecvError, UnboundedReceiver};
use tracing::{debug, info, warn};

use super::{state::AppState, ui::draw_ui};
use crate::core::{magic::UiAction, transmit::DeviceWriter, Console};
use crate::domain::error::{SermonError, SermonResult};
use crate::infrastructure::serial::SerialSession;

const PAGE: usize = 10;

pub struct App {
    state: AppState,
    terminal: Terminal<CrosstermBackend<io::Stdout>>,
    session: SerialSession,
    rx: UnboundedReceiver<Vec<u8>>,
    console: Console,
    should_quit: bool,
    tick_rate: Duration,
}

impl App {
    /// Take over the terminal. `session` should already be reading into
    /// the sender half of `rx`.
    pub fn new(
        session: SerialSession,
        rx: UnboundedReceiver<Vec<u8>>,
        console: Console,
    ) -> SermonResult<Self> {
        enable_raw_mode().map_err(|e| SermonError::Terminal(e.to_string()))?;
        let mut stdout = io::stdout();
        if let Err(e) = execute!(stdout, EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(SermonError::Terminal(e.to_string()));
        }
        let backend = CrosstermBackend::new(stdout);
        let terminal = match Terminal::new(backend) {
            Ok(terminal) => terminal,
            Err(e) => {
                let _ = disable_raw_mode();
                let _ = execute!(io::stdout(), LeaveAlternateScreen);
                return Err(SermonError::Terminal(e.to_string()));
            }
        };

        let state = AppState::new(session.name());

        Ok(Self {
            state,
            terminal,
            session,
            rx,
            console,
            should_quit: false,
            tick_rate: Duration::from_millis(50),
        })
    }

    /// Run until the operator quits. The session is stopped before
    /// returning, on success or failure.
    pub async fn run(&mut self) -> SermonResult<()> {
        let result = self.event_loop().await;

        if let Err(e) = self.session.stop() {
            warn!("Failed to stop session: {}", e);
        }
        info!("Session closed");
        result
    }

    async fn event_loop(&mut self) -> SermonResult<()> {
        loop {
            self.drain_received();

            self.terminal
                .draw(|f| draw_ui(f, &mut self.state))
                .map_err(|e| SermonError::Terminal(e.to_string()))?;

            if self.should_quit {
                break;
            }

            if event::poll(self.tick_rate).map_err(|e| SermonError::Terminal(e.to_string()))? {
                match event::read().map_err(|e| SermonError::Terminal(e.to_string()))? {
                    Event::Key(key) if key.kind != KeyEventKind::Release => {
                        self.should_quit = handle_key_event(
                            key,
                            &mut self.state,
                            &mut self.console,
                            &mut self.session,
                        );
                    }
                    Event::Resize(width, height) => {
                        self.state.terminal_size = (width, height);
                    }
                    _ => {}
                }
            }

            tokio::task::yield_now().await;
        }

        Ok(())
    }

    fn drain_received(&mut self) {
        loop {
            match self.rx.try_recv() {
                Ok(data) => {
                    if let Some(status) = self.console.receive(&data) {
                        self.state.set_status_message(status);
                    }
                    self.state.push_received(&data);
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    if self.session.is_reading() {
                        self.state.set_status_message("Receive channel closed");
                    }
                    break;
                }
            }
        }
    }
}

impl Drop for App {
    fn drop(&mut self) {
        let _ = self.session.stop();
        let _ = disable_raw_mode();
        let _ = execute!(self.terminal.backend_mut(), LeaveAlternateScreen);
        let _ = self.terminal.show_cursor();
    }
}

/// Apply one key press. Returns `true` when the application should quit.
pub fn handle_key_event<W>(
    key: KeyEvent,
    state: &mut AppState,
    console: &mut Console,
    writer: &mut W,
) -> bool
where
    W: DeviceWriter + ?Sized,
{
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return true;
    }

    if state.show_help {
        if matches!(key.code, KeyCode::Esc | KeyCode::Enter | KeyCode::Char('q')) {
            state.toggle_help();
        }
        return false;
    }

    match key.code {
        KeyCode::Enter => {
            let line = state.input.take();
            state.history.push(&line);
            debug!(line = %line, "Submitting line");

            let submission = console.submit(&line, writer);
            state.status_message = submission.status;
            match submission.action {
                Some(UiAction::Quit) => return true,
                Some(UiAction::ClearDisplay) => state.clear_display(),
                Some(UiAction::ShowHelp) => state.show_help = true,
                None => {}
            }
        }
        KeyCode::Up => {
            if let Some(line) = state.history.older() {
                let line = line.to_string();
                state.input.set_content(line);
            }
        }
        KeyCode::Down => match state.history.newer() {
            Some(line) => {
                let line = line.to_string();
                state.input.set_content(line);
            }
            None => state.input.clear(),
        },
        KeyCode::PageUp => state.scroll_up(PAGE),
        KeyCode::PageDown => state.scroll_down(PAGE),
        KeyCode::Esc => state.input.clear(),
        _ => {
            state.input.handle_key(key);
        }
    }

    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{framing::FrameTemplate, magic::builtin_dispatcher, transmit::Transmitter};
    use crate::domain::config::ByteListPolicy;
    use crate::infrastructure::logging::CaptureLog;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn console() -> Console {
        Console::new(
            FrameTemplate::new("", r"\n").unwrap(),
            Transmitter::new(ByteListPolicy::SkipInvalid),
            builtin_dispatcher(),
            CaptureLog::new(),
        )
    }

    fn type_line(state: &mut AppState, console: &mut Console, out: &mut Vec<u8>, line: &str) -> bool {
        for c in line.chars() {
            handle_key_event(key(KeyCode::Char(c)), state, console, out);
        }
        handle_key_event(key(KeyCode::Enter), state, console, out)
    }

    #[test]
    fn test_enter_sends_framed_line() {
        let mut state = AppState::new("dev");
        let mut console = console();
        let mut out: Vec<u8> = Vec::new();

        assert!(!type_line(&mut state, &mut console, &mut out, "hi$(0x21)"));
        assert_eq!(out, b"hi!\n");
        assert!(state.input.is_empty());
        assert_eq!(state.history.len(), 1);
        assert_eq!(state.status_message, None);
    }

    #[test]
    fn test_history_recall() {
        let mut state = AppState::new("dev");
        let mut console = console();
        let mut out: Vec<u8> = Vec::new();
        type_line(&mut state, &mut console, &mut out, "first");
        type_line(&mut state, &mut console, &mut out, "second");

        handle_key_event(key(KeyCode::Up), &mut state, &mut console, &mut out);
        assert_eq!(state.input.content(), "second");
        handle_key_event(key(KeyCode::Up), &mut state, &mut console, &mut out);
        assert_eq!(state.input.content(), "first");
        handle_key_event(key(KeyCode::Down), &mut state, &mut console, &mut out);
        handle_key_event(key(KeyCode::Down), &mut state, &mut console, &mut out);
        assert!(state.input.is_empty());
    }

    #[test]
    fn test_magic_actions() {
        let mut state = AppState::new("dev");
        let mut console = console();
        let mut out: Vec<u8> = Vec::new();
        state.push_received(b"noise\n");

        type_line(&mut state, &mut console, &mut out, "%clear");
        assert_eq!(state.line_count(), 0);

        type_line(&mut state, &mut console, &mut out, "%help");
        assert!(state.show_help);
        // keys other than the close keys are swallowed while help is shown
        handle_key_event(key(KeyCode::Char('x')), &mut state, &mut console, &mut out);
        assert!(state.input.is_empty());
        handle_key_event(key(KeyCode::Esc), &mut state, &mut console, &mut out);
        assert!(!state.show_help);

        assert!(type_line(&mut state, &mut console, &mut out, "%q"));
        assert!(out.is_empty());
    }

    #[test]
    fn test_unknown_magic_sets_status() {
        let mut state = AppState::new("dev");
        let mut console = console();
        let mut out: Vec<u8> = Vec::new();
        type_line(&mut state, &mut console, &mut out, "%nope");
        assert_eq!(state.status_message.as_deref(), Some("Unknown command: %nope"));
    }

    #[test]
    fn test_ctrl_c_quits() {
        let mut state = AppState::new("dev");
        let mut console = console();
        let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert!(handle_key_event(ctrl_c, &mut state, &mut console, &mut Vec::<u8>::new()));
    }
}
