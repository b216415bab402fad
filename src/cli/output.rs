use std::io::{self, Write};

use tabled::{Table, Tabled};

use crate::cli::args::OutputFormat;
use crate::domain::error::SermonError;
use crate::infrastructure::serial::DeviceInfo;

/// Output formatting errors
#[derive(Debug, thiserror::Error)]
pub enum OutputError {
    #[error("IO error: {0}")]
    IoError(#[from] io::Error),
}

impl From<OutputError> for SermonError {
    fn from(err: OutputError) -> Self {
        Self::Output(err.to_string())
    }
}

/// Writes command results to any `Write`, stdout by default.
pub struct ConsoleWriter<W: Write = io::Stdout> {
    format: OutputFormat,
    out: W,
}

impl ConsoleWriter {
    pub fn new(format: OutputFormat) -> Self {
        Self::with_writer(format, io::stdout())
    }
}

impl<W: Write> ConsoleWriter<W> {
    pub fn with_writer(format: OutputFormat, out: W) -> Self {
        Self { format, out }
    }

    /// Device listing for `--list`.
    pub fn write_devices(&mut self, devices: &[DeviceInfo]) -> Result<(), OutputError> {
        if devices.is_empty() {
            writeln!(self.out, "No serial devices found")?;
            return Ok(());
        }

        match self.format {
            OutputFormat::Text => {
                for device in devices {
                    writeln!(self.out, "{}\t{}", device.name, device.kind)?;
                }
            }
            OutputFormat::Table => {
                let rows: Vec<DeviceTableRow> = devices.iter().map(DeviceTableRow::from).collect();
                writeln!(self.out, "{}", Table::new(rows))?;
            }
        }
        Ok(())
    }

    /// Numbered device list used when prompting for a device.
    pub fn write_device_menu(&mut self, devices: &[DeviceInfo]) -> Result<(), OutputError> {
        writeln!(self.out, "Available serial devices:")?;
        for (index, device) in devices.iter().enumerate() {
            writeln!(self.out, "  {}: {} ({})", index + 1, device.name, device.kind)?;
        }
        write!(self.out, "Select device [1-{}]: ", devices.len())?;
        self.out.flush()?;
        Ok(())
    }

    pub fn write_message(&mut self, message: &str) -> Result<(), OutputError> {
        writeln!(self.out, "{}", message)?;
        Ok(())
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

#[derive(Tabled)]
struct DeviceTableRow {
    #[tabled(rename = "Device")]
    name: String,
    #[tabled(rename = "Type")]
    kind: String,
}

impl From<&DeviceInfo> for DeviceTableRow {
    fn from(device: &DeviceInfo) -> Self {
        Self {
            name: device.name.clone(),
            kind: device.kind.clone(),
        }
    }
}
