//! Type definitions for vendtrack

mod error;
mod record;

pub use error::*;
pub use record::*;
