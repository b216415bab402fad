// Core module - framing, transmission and magic dispatch
pub mod console;
pub mod framing;
pub mod magic;
pub mod transmit;

pub use console::{Console, Submission};
