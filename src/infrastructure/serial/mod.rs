// Serial module - device session and enumeration
pub mod ports;
pub mod session;

pub use ports::{available_devices, DeviceInfo};
pub use session::{Device, RxSink, SerialSession, SessionState};
