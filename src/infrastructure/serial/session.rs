use std::io::{self, Read, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use serialport::{ClearBuffer, SerialPort};
use tracing::{debug, info, trace, warn};

use crate::core::transmit::DeviceWriter;
use crate::domain::config::{Parity, SessionConfig, StopBits};
use crate::domain::error::{SermonError, SermonResult};

const READ_CHUNK: usize = 1024;
const ERROR_BACKOFF: Duration = Duration::from_millis(100);

/// A full-duplex byte device. The reader thread gets its own handle via
/// [`Device::try_clone_device`], so reads and writes never share a buffer.
pub trait Device: Read + Write + Send {
    fn try_clone_device(&self) -> SermonResult<Box<dyn Device>>;

    /// Discard anything received but not yet read.
    fn clear_input(&mut self) -> SermonResult<()>;
}

impl Device for Box<dyn SerialPort> {
    fn try_clone_device(&self) -> SermonResult<Box<dyn Device>> {
        let clone = SerialPort::try_clone(self.as_ref())?;
        Ok(Box::new(clone))
    }

    fn clear_input(&mut self) -> SermonResult<()> {
        SerialPort::clear(self.as_ref(), ClearBuffer::Input)?;
        Ok(())
    }
}

/// Consumer of received bytes, called on the reader thread.
pub trait RxSink: Send + 'static {
    fn forward(&mut self, data: &[u8]);
}

impl RxSink for tokio::sync::mpsc::UnboundedSender<Vec<u8>> {
    fn forward(&mut self, data: &[u8]) {
        if self.send(data.to_vec()).is_err() {
            trace!("Receive channel closed, dropping {} bytes", data.len());
        }
    }
}

impl RxSink for std::sync::mpsc::Sender<Vec<u8>> {
    fn forward(&mut self, data: &[u8]) {
        if self.send(data.to_vec()).is_err() {
            trace!("Receive channel closed, dropping {} bytes", data.len());
        }
    }
}

/// Session lifecycle: `Open -> Closing -> Closed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Open,
    Closing,
    Closed,
}

impl std::fmt::Display for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionState::Open => write!(f, "Open"),
            SessionState::Closing => write!(f, "Closing"),
            SessionState::Closed => write!(f, "Closed"),
        }
    }
}

/// Exclusive owner of one open device and its background reader.
pub struct SerialSession {
    name: String,
    device: Option<Box<dyn Device>>,
    state: SessionState,
    kill: Arc<AtomicBool>,
    reader: Option<JoinHandle<()>>,
}

impl SerialSession {
    /// Open the device described by `config`. Fails immediately if the
    /// device is missing or busy; no reader is started.
    pub fn open(config: &SessionConfig) -> SermonResult<Self> {
        config.validate()?;

        let builder = serialport::new(config.device.as_str(), config.baud_rate)
            .data_bits(data_bits(config.data_bits)?)
            .parity(parity(config.parity)?)
            .stop_bits(stop_bits(config.stop_bits)?)
            .flow_control(flow_control(config)?)
            .timeout(config.read_timeout);

        let mut port = builder.open().map_err(|source| SermonError::DeviceOpen {
            device: config.device.clone(),
            source,
        })?;

        if config.dsrdtr {
            port.write_data_terminal_ready(true)?;
        }

        info!(
            device = %config.device,
            baud = config.baud_rate,
            data_bits = config.data_bits,
            parity = %config.parity,
            stop_bits = %config.stop_bits,
            "Serial port opened successfully"
        );

        Self::from_device(config.device.clone(), Box::new(port))
    }

    /// Wrap an already open device. Stale input is flushed; reading does
    /// not begin until [`SerialSession::start`].
    pub fn from_device(name: impl Into<String>, mut device: Box<dyn Device>) -> SermonResult<Self> {
        device.clear_input()?;

        Ok(Self {
            name: name.into(),
            device: Some(device),
            state: SessionState::Open,
            kill: Arc::new(AtomicBool::new(false)),
            reader: None,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Whether the background reader thread is still running.
    pub fn is_reading(&self) -> bool {
        self.reader
            .as_ref()
            .map_or(false, |handle| !handle.is_finished())
    }

    /// Spawn the background reader, forwarding received bytes to `sink`.
    pub fn start<S: RxSink>(&mut self, sink: S) -> SermonResult<()> {
        let device = match (self.state, self.device.as_ref()) {
            (SessionState::Open, Some(device)) => device,
            _ => return Err(SermonError::SessionClosed),
        };
        if self.reader.is_some() {
            return Err(SermonError::Session {
                message: format!("reader for '{}' already started", self.name),
            });
        }

        let reader = device.try_clone_device()?;
        let kill = Arc::clone(&self.kill);
        let handle = thread::Builder::new()
            .name(format!("sermon-rx:{}", self.name))
            .spawn(move || reader_loop(reader, kill, sink))?;

        debug!(device = %self.name, "Reader thread started");
        self.reader = Some(handle);
        Ok(())
    }

    /// Write all of `data` synchronously. A partial write is an error and
    /// is not retried.
    pub fn write(&mut self, data: &[u8]) -> SermonResult<()> {
        let device = match (self.state, self.device.as_mut()) {
            (SessionState::Open, Some(device)) => device,
            _ => return Err(SermonError::SessionClosed),
        };
        if data.is_empty() {
            return Ok(());
        }

        let written = device.write(data)?;
        if written != data.len() {
            return Err(SermonError::ShortWrite {
                written,
                expected: data.len(),
            });
        }
        device.flush()?;
        Ok(())
    }

    /// Stop the reader, wait for it to exit, then close the device.
    /// Calling it again is a no-op.
    pub fn stop(&mut self) -> SermonResult<()> {
        if self.state == SessionState::Closed {
            return Ok(());
        }

        self.state = SessionState::Closing;
        self.kill.store(true, Ordering::Release);

        let joined = match self.reader.take() {
            Some(handle) => handle.join().map_err(|_| SermonError::Session {
                message: format!("reader for '{}' panicked", self.name),
            }),
            None => Ok(()),
        };

        // the reader's handle is gone by now; drop ours last
        self.device = None;
        self.state = SessionState::Closed;
        info!(device = %self.name, "Serial session closed");

        joined
    }
}

impl DeviceWriter for SerialSession {
    fn write_bytes(&mut self, data: &[u8]) -> SermonResult<()> {
        self.write(data)
    }
}

impl Drop for SerialSession {
    fn drop(&mut self) {
        if self.state != SessionState::Closed {
            if let Err(e) = self.stop() {
                warn!("Failed to stop session '{}' on drop: {}", self.name, e);
            }
        }
    }
}

fn reader_loop<S: RxSink>(mut device: Box<dyn Device>, kill: Arc<AtomicBool>, mut sink: S) {
    let mut buffer = [0u8; READ_CHUNK];

    while !kill.load(Ordering::Acquire) {
        match device.read(&mut buffer) {
            Ok(0) => continue,
            Ok(n) => {
                let data = &buffer[..n];
                if data == b"\r" {
                    trace!("Suppressed lone carriage return");
                    continue;
                }
                sink.forward(data);
            }
            Err(ref e)
                if matches!(
                    e.kind(),
                    io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock | io::ErrorKind::Interrupted
                ) =>
            {
                continue;
            }
            Err(e) => {
                warn!("Failed to read from device: {}", e);
                thread::sleep(ERROR_BACKOFF);
            }
        }
    }

    debug!("Reader thread exiting");
}

fn data_bits(bits: u8) -> SermonResult<serialport::DataBits> {
    match bits {
        5 => Ok(serialport::DataBits::Five),
        6 => Ok(serialport::DataBits::Six),
        7 => Ok(serialport::DataBits::Seven),
        8 => Ok(serialport::DataBits::Eight),
        _ => Err(SermonError::config(format!("Invalid data bits: {}", bits))),
    }
}

fn parity(parity: Parity) -> SermonResult<serialport::Parity> {
    match parity {
        Parity::None => Ok(serialport::Parity::None),
        Parity::Even => Ok(serialport::Parity::Even),
        Parity::Odd => Ok(serialport::Parity::Odd),
        Parity::Mark | Parity::Space => Err(SermonError::config(format!(
            "{} parity is not supported by the serial transport",
            parity
        ))),
    }
}

fn stop_bits(stop_bits: StopBits) -> SermonResult<serialport::StopBits> {
    match stop_bits {
        StopBits::One => Ok(serialport::StopBits::One),
        StopBits::Two => Ok(serialport::StopBits::Two),
        StopBits::OnePointFive => Err(SermonError::config(
            "1.5 stop bits are not supported by the serial transport",
        )),
    }
}

fn flow_control(config: &SessionConfig) -> SermonResult<serialport::FlowControl> {
    match (config.xonxoff, config.rtscts) {
        (false, false) => Ok(serialport::FlowControl::None),
        (true, false) => Ok(serialport::FlowControl::Software),
        (false, true) => Ok(serialport::FlowControl::Hardware),
        (true, true) => Err(SermonError::config(
            "software and RTS/CTS flow control cannot be combined",
        )),
    }
}
