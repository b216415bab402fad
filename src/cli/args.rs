use clap::{Parser, ValueEnum};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::domain::config::{ByteListPolicy, Parity, StopBits};

/// Command line arguments for Sermon
#[derive(Parser, Debug)]
#[command(
    name = "sermon",
    version = env!("CARGO_PKG_VERSION"),
    about = "Serial device monitor and transmitter",
    long_about = "Monitor a serial device and send commands to it. Commands may embed raw bytes with \
                  $(1, 0x02, 003) or ${...}; lines starting with % are Sermon commands (%help)."
)]
pub struct Args {
    /// Serial device to open; prompts with a list when omitted
    pub device: Option<String>,

    /// Baud rate
    pub baud: Option<u32>,

    /// List available serial devices and exit
    #[arg(short, long)]
    pub list: bool,

    /// Output format for --list
    #[arg(short, long, value_enum, default_value = "text")]
    pub output: OutputFormat,

    /// Append a line feed to every command
    #[arg(short = 'n')]
    pub newline: bool,

    /// Append a carriage return to every command
    #[arg(short = 'r')]
    pub carriage_return: bool,

    /// String sent before and after every command (escape sequences allowed)
    #[arg(long, allow_hyphen_values = true)]
    pub frame: Option<String>,

    /// String sent after every command (escape sequences allowed)
    #[arg(long, allow_hyphen_values = true)]
    pub append: Option<String>,

    /// Data bits (5-8)
    #[arg(long)]
    pub data_bits: Option<u8>,

    /// Parity
    #[arg(long, value_enum)]
    pub parity: Option<ParityArg>,

    /// Stop bits
    #[arg(long, value_enum)]
    pub stop_bits: Option<StopBitsArg>,

    /// Enable software flow control
    #[arg(long)]
    pub xonxoff: bool,

    /// Enable RTS/CTS hardware flow control
    #[arg(long)]
    pub rtscts: bool,

    /// Enable DSR/DTR hardware flow control
    #[arg(long)]
    pub dsrdtr: bool,

    /// Read timeout of the receive loop in milliseconds
    #[arg(long)]
    pub timeout_ms: Option<u64>,

    /// Handling of malformed byte literal elements
    #[arg(long, value_enum)]
    pub byte_list_policy: Option<ByteListPolicyArg>,

    /// Capture received data to FILE from the start
    #[arg(long, value_name = "FILE")]
    pub log: Option<PathBuf>,

    /// Configuration file path
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Diagnostics log file
    #[arg(long, value_name = "FILE")]
    pub trace: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

/// Output format options
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum OutputFormat {
    /// Human-readable text output
    #[default]
    Text,
    /// Table output
    Table,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParityArg {
    None,
    Even,
    Odd,
    Mark,
    Space,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopBitsArg {
    #[value(name = "1")]
    One,
    #[value(name = "1.5")]
    OnePointFive,
    #[value(name = "2")]
    Two,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ByteListPolicyArg {
    /// Drop malformed elements, send the rest
    Skip,
    /// Drop the whole byte literal
    Reject,
}

impl Args {
    /// Line ending requested by `-n`/`-r`, in that order. Already decoded.
    pub fn line_ending(&self) -> &'static str {
        match (self.newline, self.carriage_return) {
            (true, true) => "\n\r",
            (true, false) => "\n",
            (false, true) => "\r",
            (false, false) => "",
        }
    }
}

impl From<ParityArg> for Parity {
    fn from(parity: ParityArg) -> Self {
        match parity {
            ParityArg::None => Self::None,
            ParityArg::Even => Self::Even,
            ParityArg::Odd => Self::Odd,
            ParityArg::Mark => Self::Mark,
            ParityArg::Space => Self::Space,
        }
    }
}

impl From<StopBitsArg> for StopBits {
    fn from(stop_bits: StopBitsArg) -> Self {
        match stop_bits {
            StopBitsArg::One => Self::One,
            StopBitsArg::OnePointFive => Self::OnePointFive,
            StopBitsArg::Two => Self::Two,
        }
    }
}

impl From<ByteListPolicyArg> for ByteListPolicy {
    fn from(policy: ByteListPolicyArg) -> Self {
        match policy {
            ByteListPolicyArg::Skip => Self::SkipInvalid,
            ByteListPolicyArg::Reject => Self::RejectSegment,
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Table => write!(f, "table"),
        }
    }
}
