//! Shared error types for the application

use crate::patch::PatchError;
use std::path::PathBuf;
use thiserror::Error;

/// Main error type for typehinter operations
#[derive(Debug, Error)]
pub enum Error {
    /// Source could not be parsed; the file is skipped
    #[error("Parse error in {}: {message}", path.display())]
    Parse { path: PathBuf, message: String },

    /// File system related errors
    #[error("File system error for {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Overlapping or misplaced edits
    #[error(transparent)]
    Patch(#[from] PatchError),

    /// A signature without the closing parenthesis the parser promised
    #[error("No closing ')' after byte {offset} in {}", path.display())]
    MissingDelimiter { path: PathBuf, offset: usize },
}

impl Error {
    /// Create a parse error for a file
    pub fn parse(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Parse {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create an I/O error with path context
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Parse failures are recoverable per file, everything else aborts the run
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::Parse { .. })
    }
}

/// Result type alias using our error type
pub type Result<T> = std::result::Result<T, Error>;
