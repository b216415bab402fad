use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use crate::domain::error::{SermonError, SermonResult};
use crate::infrastructure::logging::CaptureLog;

/// UI-side effect requested by a magic command, applied by the front end.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiAction {
    Quit,
    ClearDisplay,
    ShowHelp,
}

/// What a magic command produced.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MagicOutcome {
    /// Shown to the operator.
    pub status: Option<String>,
    /// Written to the device verbatim, bypassing framing and byte literals.
    pub bytes_to_send: Option<Vec<u8>>,
    pub action: Option<UiAction>,
}

impl MagicOutcome {
    pub fn status(status: impl Into<String>) -> Self {
        Self {
            status: Some(status.into()),
            ..Self::default()
        }
    }

    pub fn action(action: UiAction) -> Self {
        Self {
            action: Some(action),
            ..Self::default()
        }
    }
}

/// State a handler may change.
pub struct MagicContext<'a> {
    pub capture: &'a mut CaptureLog,
}

/// A magic command handler: `(command name, arguments, context)`.
pub type MagicHandler =
    Arc<dyn Fn(&str, &[String], &mut MagicContext<'_>) -> SermonResult<MagicOutcome> + Send + Sync>;

/// Routes `%name args...` lines to handlers registered at startup.
#[derive(Clone, Default)]
pub struct MagicDispatcher {
    handlers: HashMap<String, MagicHandler>,
}

impl MagicDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` under every name in `names`.
    pub fn register<F>(&mut self, names: &[&str], handler: F)
    where
        F: Fn(&str, &[String], &mut MagicContext<'_>) -> SermonResult<MagicOutcome>
            + Send
            + Sync
            + 'static,
    {
        let handler: MagicHandler = Arc::new(handler);
        for name in names {
            self.handlers.insert((*name).to_string(), Arc::clone(&handler));
        }
    }

    pub fn is_registered(&self, name: &str) -> bool {
        self.handlers.contains_key(name)
    }

    /// Sorted command names, aliases included.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.handlers.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Run `command_line` (the text after `%`). The line is split with
    /// shell quoting rules into a command name and its arguments.
    pub fn execute(
        &self,
        command_line: &str,
        context: &mut MagicContext<'_>,
    ) -> SermonResult<MagicOutcome> {
        let mut words = shlex::split(command_line).ok_or_else(|| {
            SermonError::InvalidArguments {
                command: command_line.trim().to_string(),
                message: "unbalanced quotes".to_string(),
            }
        })?;
        if words.is_empty() {
            return Err(SermonError::UnknownCommand(String::new()));
        }

        let name = words.remove(0);
        let handler = self
            .handlers
            .get(&name)
            .ok_or_else(|| SermonError::UnknownCommand(name.clone()))?;

        debug!(command = %name, args = ?words, "Running magic command");
        handler(&name, &words, context)
    }
}

impl std::fmt::Debug for MagicDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MagicDispatcher")
            .field("commands", &self.names())
            .finish()
    }
}

/// Fail with `InvalidArguments` unless exactly `count` arguments were given.
pub fn expect_args(command: &str, args: &[String], count: usize) -> SermonResult<()> {
    if args.len() == count {
        return Ok(());
    }
    Err(SermonError::InvalidArguments {
        command: command.to_string(),
        message: format!("expected {} argument(s), got {}", count, args.len()),
    })
}
