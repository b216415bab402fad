pub mod help;
pub mod monitor;
pub mod prompt;
pub mod status;
