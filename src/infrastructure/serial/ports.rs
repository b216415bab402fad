use serialport::SerialPortType;
use serde::Serialize;

use crate::domain::error::{SermonError, SermonResult};

/// A serial device the operator can pick.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeviceInfo {
    pub name: String,
    pub kind: String,
}

/// Enumerate the serial devices present on this machine, sorted by name.
pub fn available_devices() -> SermonResult<Vec<DeviceInfo>> {
    let ports = serialport::available_ports().map_err(|e| SermonError::Session {
        message: format!("Failed to list serial devices: {}", e),
    })?;

    let mut devices: Vec<DeviceInfo> = ports
        .into_iter()
        .map(|port| DeviceInfo {
            kind: describe(&port.port_type),
            name: port.port_name,
        })
        .collect();
    devices.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(devices)
}

fn describe(port_type: &SerialPortType) -> String {
    match port_type {
        SerialPortType::UsbPort(usb) => {
            let product = usb.product.as_deref().unwrap_or("USB serial");
            format!("{} ({:04x}:{:04x})", product, usb.vid, usb.pid)
        }
        SerialPortType::BluetoothPort => "Bluetooth".to_string(),
        SerialPortType::PciPort => "PCI".to_string(),
        SerialPortType::Unknown => "Unknown".to_string(),
    }
}
