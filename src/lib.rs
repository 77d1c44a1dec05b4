//! vendtrack - vending-machine transaction analyzer
//!
//! Ingests consumption records from workbook exports, pasted tables or the
//! vending API, then reports spending, favorite items and busiest hours.

pub mod cli;
pub mod config;
pub mod logging;
pub mod parsers;
pub mod services;
pub mod tui;
pub mod types;
