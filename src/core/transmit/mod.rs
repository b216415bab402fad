// Transmit module - byte-literal codec and transmission pipeline
pub mod literal;
pub mod pipeline;

pub use literal::{segments, LiteralError, RejectedElement, Segment};
pub use pipeline::{DeviceWriter, TransmitReport, Transmitter};
