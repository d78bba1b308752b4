use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors surfaced by tail selection
#[derive(Debug, Error)]
pub enum SelectError {
    /// The log file could not be opened or read
    #[error("failed to read log file {}", .path.display())]
    FileAccess {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

pub type Result<T, E = SelectError> = std::result::Result<T, E>;
