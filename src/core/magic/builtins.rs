//! Built-in `%` commands.

use std::fs;

use crate::core::magic::dispatcher::{expect_args, MagicDispatcher, MagicOutcome, UiAction};
use crate::domain::error::SermonError;

pub const HELP_TEXT: &str = "\
Sermon Magic Commands

%help, %h
    Display help.
%about, %a
    Display information about Sermon.
%exit, %quit, %q
    Exit sermon.
%send FILE, %s FILE
    Send the contents of FILE to the connected device, unmodified.
%logstart FILE, %ls FILE
    Start logging all received data to FILE.
%logon, %lo
    Resume logging after %logoff. Requires a prior %logstart.
%logoff, %lf
    Temporarily stop logging.
%clear, %c
    Clear the received data window.
%version, %v
    Display the current version.

Byte literals: $(1, 0x02, 003) or ${...} inside a command sends raw bytes.";

pub fn about_text() -> String {
    format!(
        "Sermon {}: serial device monitor and transmitter",
        env!("CARGO_PKG_VERSION")
    )
}

/// Dispatcher with every built-in command registered.
pub fn builtin_dispatcher() -> MagicDispatcher {
    let mut magic = MagicDispatcher::new();

    magic.register(&["help", "h"], |name, args, _| {
        expect_args(name, args, 0)?;
        Ok(MagicOutcome {
            status: Some("Press Esc to close help".to_string()),
            action: Some(UiAction::ShowHelp),
            ..MagicOutcome::default()
        })
    });

    magic.register(&["about", "a"], |name, args, _| {
        expect_args(name, args, 0)?;
        Ok(MagicOutcome::status(about_text()))
    });

    magic.register(&["exit", "quit", "q"], |name, args, _| {
        expect_args(name, args, 0)?;
        Ok(MagicOutcome::action(UiAction::Quit))
    });

    magic.register(&["send", "s"], |name, args, _| {
        expect_args(name, args, 1)?;
        let path = &args[0];
        let contents = fs::read(path).map_err(|e| SermonError::InvalidArguments {
            command: name.to_string(),
            message: format!("cannot read {}: {}", path, e),
        })?;
        Ok(MagicOutcome {
            status: Some(format!("Sent {} bytes from {}", contents.len(), path)),
            bytes_to_send: Some(contents),
            action: None,
        })
    });

    magic.register(&["logstart", "ls"], |name, args, ctx| {
        expect_args(name, args, 1)?;
        ctx.capture.start(&args[0]);
        Ok(MagicOutcome::status(format!("Logging to {}", args[0])))
    });

    magic.register(&["logon", "lo"], |name, args, ctx| {
        expect_args(name, args, 0)?;
        let path = ctx.capture.resume()?;
        Ok(MagicOutcome::status(format!("Logging resumed to {}", path.display())))
    });

    magic.register(&["logoff", "lf"], |name, args, ctx| {
        expect_args(name, args, 0)?;
        ctx.capture.pause();
        Ok(MagicOutcome::status("Logging paused"))
    });

    magic.register(&["clear", "c"], |name, args, _| {
        expect_args(name, args, 0)?;
        Ok(MagicOutcome::action(UiAction::ClearDisplay))
    });

    magic.register(&["version", "v"], |name, args, _| {
        expect_args(name, args, 0)?;
        Ok(MagicOutcome::status(env!("CARGO_PKG_VERSION")))
    });

    magic
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::magic::dispatcher::MagicContext;
    use crate::infrastructure::logging::CaptureLog;
    use tempfile::TempDir;

    #[test]
    fn test_all_builtins_registered() {
        let magic = builtin_dispatcher();
        for name in [
            "help", "h", "about", "a", "exit", "quit", "q", "send", "s", "logstart", "ls",
            "logon", "lo", "logoff", "lf", "clear", "c", "version", "v",
        ] {
            assert!(magic.is_registered(name), "{} missing", name);
        }
    }

    #[test]
    fn test_send_reads_file_verbatim() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("payload.bin");
        fs::write(&path, b"$(1)\x00raw").unwrap();

        let magic = builtin_dispatcher();
        let mut capture = CaptureLog::new();
        let mut ctx = MagicContext { capture: &mut capture };
        let line = format!("send '{}'", path.display());
        let outcome = magic.execute(&line, &mut ctx).unwrap();

        assert_eq!(outcome.bytes_to_send.as_deref(), Some(&b"$(1)\x00raw"[..]));
        assert!(outcome.status.unwrap().starts_with("Sent 8 bytes"));
    }

    #[test]
    fn test_send_missing_file() {
        let magic = builtin_dispatcher();
        let mut capture = CaptureLog::new();
        let mut ctx = MagicContext { capture: &mut capture };
        assert!(matches!(
            magic.execute("s /definitely/not/here", &mut ctx),
            Err(SermonError::InvalidArguments { .. })
        ));
        assert!(matches!(
            magic.execute("send", &mut ctx),
            Err(SermonError::InvalidArguments { .. })
        ));
    }

    #[test]
    fn test_logging_commands_drive_capture() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("rx.log");
        let magic = builtin_dispatcher();
        let mut capture = CaptureLog::new();

        {
            let mut ctx = MagicContext { capture: &mut capture };
            assert!(magic.execute("lo", &mut ctx).is_err());
            magic
                .execute(&format!("logstart {}", path.display()), &mut ctx)
                .unwrap();
        }
        assert!(capture.is_enabled());

        {
            let mut ctx = MagicContext { capture: &mut capture };
            magic.execute("logoff", &mut ctx).unwrap();
        }
        assert!(!capture.is_enabled());

        {
            let mut ctx = MagicContext { capture: &mut capture };
            magic.execute("logon", &mut ctx).unwrap();
        }
        assert!(capture.is_enabled());
    }

    #[test]
    fn test_ui_actions() {
        let magic = builtin_dispatcher();
        let mut capture = CaptureLog::new();
        let mut ctx = MagicContext { capture: &mut capture };

        assert_eq!(magic.execute("q", &mut ctx).unwrap().action, Some(UiAction::Quit));
        assert_eq!(
            magic.execute("clear", &mut ctx).unwrap().action,
            Some(UiAction::ClearDisplay)
        );
        assert_eq!(magic.execute("h", &mut ctx).unwrap().action, Some(UiAction::ShowHelp));
        assert!(magic.execute("clear now", &mut ctx).is_err());
        assert_eq!(
            magic.execute("version", &mut ctx).unwrap().status.as_deref(),
            Some(env!("CARGO_PKG_VERSION"))
        );
    }
}
