use thiserror::Error;

/// Sermon unified error type
#[derive(Error, Debug)]
pub enum SermonError {
    #[error("Serial port error: {0}")]
    Serial(#[from] serialport::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Invalid escape sequence at offset {offset}: {message}")]
    Escape { offset: usize, message: String },

    #[error("Could not open device '{device}': {source}")]
    DeviceOpen {
        device: String,
        #[source]
        source: serialport::Error,
    },

    #[error("Character {character:?} at offset {offset} does not fit in a single byte")]
    Encoding { character: char, offset: usize },

    #[error("Short write: {written} of {expected} bytes accepted by the device")]
    ShortWrite { written: usize, expected: usize },

    #[error("Session is closed")]
    SessionClosed,

    #[error("Session error: {message}")]
    Session { message: String },

    #[error("Unknown command: %{0}")]
    UnknownCommand(String),

    #[error("Invalid arguments for %{command}: {message}")]
    InvalidArguments { command: String, message: String },

    #[error("Capture log error: {0}")]
    Capture(String),

    #[error("Terminal error: {0}")]
    Terminal(String),

    #[error("Output error: {0}")]
    Output(String),
}

impl SermonError {
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// True for errors that must stop the program before a device is opened.
    pub fn is_fatal_at_startup(&self) -> bool {
        matches!(
            self,
            Self::Config { .. } | Self::Escape { .. } | Self::DeviceOpen { .. }
        )
    }
}

pub type SermonResult<T> = Result<T, SermonError>;
