//! TUI widgets

pub mod error;
pub mod help;
pub mod hours;
pub mod input;
pub mod overview;
pub mod records;
pub mod spinner;
pub mod tabs;
pub mod users;
