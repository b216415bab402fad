// Magic module - `%` command dispatch
pub mod builtins;
pub mod dispatcher;

pub use builtins::builtin_dispatcher;
pub use dispatcher::{MagicContext, MagicDispatcher, MagicOutcome, UiAction};
