use tracing::warn;

use crate::core::framing::FrameTemplate;
use crate::core::magic::{MagicContext, MagicDispatcher, UiAction};
use crate::core::transmit::{DeviceWriter, Transmitter};
use crate::infrastructure::logging::CaptureLog;

/// Prefix that routes a line to the magic dispatcher.
pub const MAGIC_PREFIX: char = '%';

/// What the front end should do after a submitted line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Submission {
    pub status: Option<String>,
    pub action: Option<UiAction>,
}

impl Submission {
    fn status(status: impl Into<String>) -> Self {
        Self {
            status: Some(status.into()),
            action: None,
        }
    }
}

/// Operator-side control flow: magic dispatch, framing, transmission and
/// receive capture. Errors never escape; they become status messages.
#[derive(Debug)]
pub struct Console {
    template: FrameTemplate,
    transmitter: Transmitter,
    magic: MagicDispatcher,
    capture: CaptureLog,
}

impl Console {
    pub fn new(
        template: FrameTemplate,
        transmitter: Transmitter,
        magic: MagicDispatcher,
        capture: CaptureLog,
    ) -> Self {
        Self {
            template,
            transmitter,
            magic,
            capture,
        }
    }

    pub fn template(&self) -> &FrameTemplate {
        &self.template
    }

    pub fn capture(&self) -> &CaptureLog {
        &self.capture
    }

    /// Handle one line typed by the operator.
    pub fn submit<W>(&mut self, line: &str, writer: &mut W) -> Submission
    where
        W: DeviceWriter + ?Sized,
    {
        match line.strip_prefix(MAGIC_PREFIX) {
            Some(command) => self.run_magic(command, writer),
            None => self.send(line, writer),
        }
    }

    /// Record bytes received from the device. Returns a status message if
    /// the capture file could not be written.
    pub fn receive(&self, data: &[u8]) -> Option<String> {
        match self.capture.append(data) {
            Ok(_) => None,
            Err(e) => {
                warn!("Capture failed: {}", e);
                Some(e.to_string())
            }
        }
    }

    fn run_magic<W>(&mut self, command: &str, writer: &mut W) -> Submission
    where
        W: DeviceWriter + ?Sized,
    {
        let mut context = MagicContext {
            capture: &mut self.capture,
        };
        let outcome = match self.magic.execute(command, &mut context) {
            Ok(outcome) => outcome,
            Err(e) => return Submission::status(e.to_string()),
        };

        let mut status = outcome.status;
        if let Some(bytes) = outcome.bytes_to_send {
            if let Err(e) = writer.write_bytes(&bytes) {
                status = Some(format!("Write failed: {}", e));
            }
        }
        Submission {
            status,
            action: outcome.action,
        }
    }

    fn send<W>(&mut self, line: &str, writer: &mut W) -> Submission
    where
        W: DeviceWriter + ?Sized,
    {
        let processed = self.template.frame_command(line);
        match self.transmitter.transmit(&processed, writer) {
            Ok(report) => Submission {
                status: report.status(),
                action: None,
            },
            Err(e) => Submission::status(format!("Transmit failed: {}", e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::magic::builtin_dispatcher;
    use crate::domain::config::ByteListPolicy;
    use crate::domain::error::{SermonError, SermonResult};
    use tempfile::TempDir;

    struct ClosedWriter;

    impl DeviceWriter for ClosedWriter {
        fn write_bytes(&mut self, _data: &[u8]) -> SermonResult<()> {
            Err(SermonError::SessionClosed)
        }
    }

    fn console(frame: &str, append: &str) -> Console {
        Console::new(
            FrameTemplate::new(frame, append).unwrap(),
            Transmitter::new(ByteListPolicy::SkipInvalid),
            builtin_dispatcher(),
            CaptureLog::new(),
        )
    }

    #[test]
    fn test_plain_line_is_framed_and_sent() {
        let mut console = console("", r"\r\n");
        let mut out: Vec<u8> = Vec::new();
        let submission = console.submit("AT$(0x2b)", &mut out);
        assert_eq!(out, b"AT+\r\n");
        assert_eq!(submission, Submission::default());
    }

    #[test]
    fn test_empty_line_sends_only_framing() {
        let mut console = console(r"\x02", r"\x03");
        let mut out: Vec<u8> = Vec::new();
        console.submit("", &mut out);
        assert_eq!(out, vec![0x02, 0x03, 0x02]);
    }

    #[test]
    fn test_magic_bytes_bypass_pipeline() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("raw.txt");
        std::fs::write(&path, "$(1)").unwrap();

        let mut console = console("|", "");
        let mut out: Vec<u8> = Vec::new();
        let submission = console.submit(&format!("%send {}", path.display()), &mut out);
        assert_eq!(out, b"$(1)");
        assert!(submission.status.is_some());
    }

    #[test]
    fn test_magic_errors_become_status() {
        let mut console = console("", "");
        let mut out: Vec<u8> = Vec::new();
        let submission = console.submit("%bogus", &mut out);
        assert!(out.is_empty());
        assert_eq!(submission.status.as_deref(), Some("Unknown command: %bogus"));
        assert_eq!(submission.action, None);
    }

    #[test]
    fn test_quit_action() {
        let mut console = console("", "");
        let submission = console.submit("%q", &mut Vec::<u8>::new());
        assert_eq!(submission.action, Some(UiAction::Quit));
    }

    #[test]
    fn test_write_failure_is_reported() {
        let mut console = console("", "");
        let submission = console.submit("hello", &mut ClosedWriter);
        assert_eq!(
            submission.status.as_deref(),
            Some("Transmit failed: Session is closed")
        );
    }

    #[test]
    fn test_rejected_elements_reported() {
        let mut console = console("", "");
        let mut out: Vec<u8> = Vec::new();
        let submission = console.submit("$(1,oops)", &mut out);
        assert_eq!(out, vec![1]);
        assert!(submission.status.unwrap().contains("oops"));
    }

    #[test]
    fn test_receive_captures_when_enabled() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("rx.log");
        let mut console = console("", "");

        assert_eq!(console.receive(b"before"), None);
        console.submit(&format!("%ls {}", path.display()), &mut Vec::<u8>::new());
        assert_eq!(console.receive(b"after"), None);
        assert!(console.capture().is_enabled());
        assert_eq!(std::fs::read(&path).unwrap(), b"after");
    }

    #[test]
    fn test_capture_failure_becomes_status() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("no-such-dir").join("rx.log");
        let mut console = console("", "");
        console.submit(&format!("%ls {}", path.display()), &mut Vec::<u8>::new());

        let status = console.receive(b"data").expect("unwritable capture should report");
        assert!(status.starts_with("Capture log error"));
        assert!(status.contains("rx.log"));
        // the capture stays on so a later retry can succeed
        assert!(console.capture().is_enabled());
    }
}
