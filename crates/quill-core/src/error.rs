//! # Error Types
//!
//! Errors raised while building sinks and reading configuration.
//!
//! Logging calls themselves never return errors: a sink that fails while
//! writing is isolated by the transport manager. Everything that can fail
//! *before* a line is written (opening a file, creating a directory, parsing
//! the environment) surfaces here.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Main error type for Quill setup operations
#[derive(Error, Debug)]
pub enum QuillError
{
    /// A sink's backing file could not be opened for appending
    #[error("Failed to open log file {}: {source}", path.display())]
    OpenSink
    {
        /// The file that failed to open
        path: PathBuf,
        /// The underlying error
        source: io::Error,
    },

    /// A log directory could not be created
    #[error("Failed to create log directory {}: {source}", path.display())]
    CreateDirectory
    {
        /// The directory that failed to be created
        path: PathBuf,
        /// The underlying error
        source: io::Error,
    },

    /// A configuration value was rejected
    ///
    /// Level names are never rejected (unknown names become custom levels),
    /// so this only covers values with a closed set of options such as the
    /// console target.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// I/O error not tied to a specific path
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

impl QuillError
{
    /// Collapse into a plain I/O error, keeping the underlying cause
    #[must_use]
    pub fn into_io(self) -> io::Error
    {
        match self {
            QuillError::OpenSink { source, .. } | QuillError::CreateDirectory { source, .. } | QuillError::Io(source) => {
                source
            }
            QuillError::InvalidConfig(message) => io::Error::new(io::ErrorKind::InvalidInput, message),
        }
    }
}

/// Convenience type alias for `Result<T, QuillError>`
///
/// ```rust
/// use quill_core::error::QuillResult;
/// fn foo() -> QuillResult<()>
/// {
///     Ok(())
/// }
/// ```
pub type QuillResult<T> = std::result::Result<T, QuillError>;
