// TUI module - terminal front end for a serial session

pub mod app;
pub mod input;
pub mod state;
pub mod ui;
pub mod widgets;

pub use app::App;
