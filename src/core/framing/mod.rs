// Framing module - escape decoding and command framing
pub mod escape;
pub mod frame;

pub use escape::decode_escapes;
pub use frame::FrameTemplate;
