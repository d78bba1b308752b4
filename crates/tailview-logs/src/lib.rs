//! Log processing for tailview
//!
//! This crate parses structured log lines, decides which levels to show,
//! flags recent entries and selects the tail of a log file.

mod error;
mod filter;
mod parser;
mod selector;
pub mod timestamp;

pub use error::{Result, SelectError};
pub use filter::LevelFilter;
pub use parser::LineParser;
pub use selector::{LogSelector, select};

// Re-export types used in our public API
pub use tailview_types::{FilterConfig, LogLevel, LogRecord};
