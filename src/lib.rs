//! Sermon Library
//!
//! Interactive serial device monitor: escape-decoded command framing,
//! inline `$(...)` byte literals, `%` magic commands and a background
//! receive loop over a `serialport` device.

pub mod cli;
pub mod core;
pub mod domain;
pub mod infrastructure;
pub mod tui;

pub use crate::core::framing::{decode_escapes, FrameTemplate};
pub use crate::core::magic::{builtin_dispatcher, MagicDispatcher, MagicOutcome, UiAction};
pub use crate::core::transmit::{DeviceWriter, TransmitReport, Transmitter};
pub use crate::core::{Console, Submission};
pub use domain::config::{ByteListPolicy, SermonConfig, SessionConfig};
pub use domain::error::{SermonError, SermonResult};
pub use infrastructure::logging::CaptureLog;
pub use infrastructure::serial::{Device, RxSink, SerialSession, SessionState};
