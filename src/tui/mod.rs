//! Interactive terminal UI

mod app;
mod theme;
mod widgets;

pub use app::run;
