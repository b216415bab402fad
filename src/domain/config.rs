use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::domain::error::{SermonError, SermonResult};

/// Sermon configuration file contents
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SermonConfig {
    /// Global configuration
    #[serde(default)]
    pub global: GlobalConfig,
    /// Serial line defaults
    #[serde(default)]
    pub serial: SerialDefaults,
    /// Command framing
    #[serde(default)]
    pub framing: FramingConfig,
}

/// Global configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GlobalConfig {
    /// Default log level for diagnostics
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Diagnostics file, overrides the cache directory default
    #[serde(default)]
    pub trace_file: Option<PathBuf>,
}

/// Line parameters used when the command line does not override them
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SerialDefaults {
    #[serde(default = "default_baud_rate")]
    pub baud_rate: u32,
    #[serde(default = "default_data_bits")]
    pub data_bits: u8,
    #[serde(default)]
    pub parity: Parity,
    #[serde(default)]
    pub stop_bits: StopBits,
    #[serde(default)]
    pub xonxoff: bool,
    #[serde(default)]
    pub rtscts: bool,
    #[serde(default)]
    pub dsrdtr: bool,
    #[serde(default = "default_read_timeout_ms")]
    pub read_timeout_ms: u64,
}

/// Raw frame/append strings, escape-decoded once at startup
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FramingConfig {
    #[serde(default)]
    pub frame: String,
    #[serde(default)]
    pub append: String,
    #[serde(default)]
    pub byte_list_policy: ByteListPolicy,
}

/// Parity configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Parity {
    #[default]
    None,
    Even,
    Odd,
    Mark,
    Space,
}

/// Stop bit configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum StopBits {
    #[default]
    #[serde(rename = "1")]
    One,
    #[serde(rename = "1.5")]
    OnePointFive,
    #[serde(rename = "2")]
    Two,
}

/// What to do with a byte-list element that is not a valid integer literal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ByteListPolicy {
    /// Drop the malformed element and keep the rest of the list.
    #[default]
    SkipInvalid,
    /// Drop the whole `$(...)` / `${...}` segment.
    RejectSegment,
}

/// Parameters of one serial session. Immutable once the session is opened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    pub device: String,
    pub baud_rate: u32,
    pub data_bits: u8,
    pub parity: Parity,
    pub stop_bits: StopBits,
    pub xonxoff: bool,
    pub rtscts: bool,
    pub dsrdtr: bool,
    pub read_timeout: Duration,
}

impl SessionConfig {
    /// Session for `device` using the line defaults from the configuration file.
    pub fn from_defaults(device: impl Into<String>, defaults: &SerialDefaults) -> Self {
        Self {
            device: device.into(),
            baud_rate: defaults.baud_rate,
            data_bits: defaults.data_bits,
            parity: defaults.parity,
            stop_bits: defaults.stop_bits,
            xonxoff: defaults.xonxoff,
            rtscts: defaults.rtscts,
            dsrdtr: defaults.dsrdtr,
            read_timeout: Duration::from_millis(defaults.read_timeout_ms),
        }
    }

    pub fn validate(&self) -> SermonResult<()> {
        if self.device.is_empty() {
            return Err(SermonError::config("device identifier is empty"));
        }
        if self.baud_rate == 0 {
            return Err(SermonError::config("baud rate must be positive"));
        }
        if !(5..=8).contains(&self.data_bits) {
            return Err(SermonError::config(format!(
                "invalid data bits: {} (expected 5-8)",
                self.data_bits
            )));
        }
        if self.read_timeout.is_zero() {
            return Err(SermonError::config("read timeout must be positive"));
        }
        Ok(())
    }
}

// Default value functions
fn default_log_level() -> String {
    "info".to_string()
}

fn default_baud_rate() -> u32 {
    9600
}

fn default_data_bits() -> u8 {
    8
}

fn default_read_timeout_ms() -> u64 {
    100
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            trace_file: None,
        }
    }
}

impl Default for SerialDefaults {
    fn default() -> Self {
        Self {
            baud_rate: default_baud_rate(),
            data_bits: default_data_bits(),
            parity: Parity::default(),
            stop_bits: StopBits::default(),
            xonxoff: false,
            rtscts: false,
            dsrdtr: false,
            read_timeout_ms: default_read_timeout_ms(),
        }
    }
}

impl std::fmt::Display for Parity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Parity::None => write!(f, "none"),
            Parity::Even => write!(f, "even"),
            Parity::Odd => write!(f, "odd"),
            Parity::Mark => write!(f, "mark"),
            Parity::Space => write!(f, "space"),
        }
    }
}

impl std::fmt::Display for StopBits {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StopBits::One => write!(f, "1"),
            StopBits::OnePointFive => write!(f, "1.5"),
            StopBits::Two => write!(f, "2"),
        }
    }
}
